mod defaults;
mod file;
mod models;

pub use defaults::DefaultsConfig;
pub use models::AppConfig;

use crate::cli::DetectArgs;
use crate::error::{CliError, Result};
use file::FileStep;
use mdcontacts::core::models::contact::TimeParameters;
use mdcontacts::engine::config::DetectionConfigBuilder;
use mdcontacts::workflows::pipeline::Pipeline;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialDetectionConfig {
    selection_1: Option<String>,
    selection_2: Option<String>,
    cutoff: Option<f64>,
    hbond_cutoff: Option<f64>,
    hbond_angle: Option<f64>,
    workers: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialTimeConfig {
    ns_per_frame: Option<f64>,
    threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialInputConfig {
    guess_bonds: Option<bool>,
    hydrogen_attach_distance: Option<f64>,
}

/// Contents of a TOML configuration file; every section is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    detection: Option<PartialDetectionConfig>,
    time: Option<PartialTimeConfig>,
    input: Option<PartialInputConfig>,
    #[serde(default)]
    pipeline: Vec<FileStep>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Merges file values with command-line arguments and defaults.
    ///
    /// Precedence, highest first: dedicated CLI flags, `--set` values, the file, defaults.
    pub fn merge_with_cli(
        mut self,
        args: &DetectArgs,
        threads: Option<usize>,
        defaults: &DefaultsConfig,
    ) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let detection_config = self.detection.take().unwrap_or_default();
        let time_config = self.time.take().unwrap_or_default();
        let input_config = self.input.take().unwrap_or_default();

        let required = |cli: &Option<String>, file: Option<String>, key: &str, flag: &str| {
            cli.clone().or(file).ok_or_else(|| {
                CliError::Config(format!(
                    "A value for '{}' is required either in the config file or via {}.",
                    key, flag
                ))
            })
        };
        let selection_1 = required(
            &args.selection_1,
            detection_config.selection_1,
            "detection.selection-1",
            "--sel1",
        )?;
        let selection_2 = required(
            &args.selection_2,
            detection_config.selection_2,
            "detection.selection-2",
            "--sel2",
        )?;

        let detection = DetectionConfigBuilder::new()
            .selection_1(selection_1)
            .selection_2(selection_2)
            .cutoff(
                args.cutoff
                    .or(detection_config.cutoff)
                    .unwrap_or(defaults.cutoff),
            )
            .hbond_cutoff(
                args.hbond_cutoff
                    .or(detection_config.hbond_cutoff)
                    .unwrap_or(defaults.hbond_cutoff),
            )
            .hbond_angle(
                args.hbond_angle
                    .or(detection_config.hbond_angle)
                    .unwrap_or(defaults.hbond_angle),
            )
            .workers(
                threads
                    .or(detection_config.workers)
                    .unwrap_or(defaults.workers),
            )
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let time = Self::merge_time(
            args.ns_per_frame.or(time_config.ns_per_frame),
            args.threshold.or(time_config.threshold),
        )?;

        let pipeline = self
            .pipeline
            .into_iter()
            .map(|step| step.into_step(time))
            .collect::<Result<Pipeline>>()?;

        let hydrogen_attach_distance = if args.guess_bonds || input_config.guess_bonds == Some(true)
        {
            Some(
                input_config
                    .hydrogen_attach_distance
                    .unwrap_or(defaults.hydrogen_attach_distance),
            )
        } else {
            None
        };

        Ok(AppConfig {
            detection,
            time,
            pipeline,
            hydrogen_attach_distance,
        })
    }

    fn merge_time(ns_per_frame: Option<f64>, threshold: Option<f64>) -> Result<Option<TimeParameters>> {
        match (ns_per_frame, threshold) {
            (None, None) => Ok(None),
            (Some(ns), Some(threshold)) => {
                if !(ns.is_finite() && ns > 0.0) {
                    return Err(CliError::Config(format!(
                        "`time.ns-per-frame` must be positive, got {}",
                        ns
                    )));
                }
                Ok(Some(TimeParameters::new(ns, threshold)))
            }
            (Some(_), None) => Err(CliError::Config(
                "`time.threshold` is required when `time.ns-per-frame` is set.".to_string(),
            )),
            (None, Some(_)) => Err(CliError::Config(
                "`time.ns-per-frame` is required when `time.threshold` is set.".to_string(),
            )),
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            match key {
                "detection.selection-1" => {
                    self.detection.get_or_insert_with(Default::default).selection_1 =
                        Some(value_str.to_string());
                }
                "detection.selection-2" => {
                    self.detection.get_or_insert_with(Default::default).selection_2 =
                        Some(value_str.to_string());
                }
                "detection.cutoff" => {
                    self.detection.get_or_insert_with(Default::default).cutoff =
                        Some(parse_value(key, value_str)?);
                }
                "detection.hbond-cutoff" => {
                    self.detection.get_or_insert_with(Default::default).hbond_cutoff =
                        Some(parse_value(key, value_str)?);
                }
                "detection.hbond-angle" => {
                    self.detection.get_or_insert_with(Default::default).hbond_angle =
                        Some(parse_value(key, value_str)?);
                }
                "detection.workers" => {
                    self.detection.get_or_insert_with(Default::default).workers =
                        Some(parse_value(key, value_str)?);
                }
                "time.ns-per-frame" => {
                    self.time.get_or_insert_with(Default::default).ns_per_frame =
                        Some(parse_value(key, value_str)?);
                }
                "time.threshold" => {
                    self.time.get_or_insert_with(Default::default).threshold =
                        Some(parse_value(key, value_str)?);
                }
                "input.hydrogen-attach-distance" => {
                    self.input
                        .get_or_insert_with(Default::default)
                        .hydrogen_attach_distance = Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value_str))
    })
}
