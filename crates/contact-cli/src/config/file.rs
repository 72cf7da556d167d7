use crate::error::{CliError, Result};
use mdcontacts::analysis::error::PipelineError;
use mdcontacts::analysis::filter::{Filter, FrameWindow, ThresholdMetric};
use mdcontacts::analysis::sort::{SortKey, Sorting};
use mdcontacts::analysis::weight::WeightKernel;
use mdcontacts::core::models::contact::TimeParameters;
use mdcontacts::workflows::pipeline::PipelineStep;
use serde::Deserialize;

/// One `[[pipeline]]` table of the configuration file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum FileStep {
    ResidueName {
        a: String,
        b: String,
    },
    ResidueRange {
        a: String,
        b: String,
    },
    Threshold {
        metric: String,
        operator: String,
        value: f64,
    },
    FrameWindow {
        lower: usize,
        upper: usize,
    },
    Sigmoid {
        x0: f64,
        l: f64,
        k: f64,
        y0: f64,
    },
    Rectangular {
        x0: usize,
        x1: usize,
        h: f64,
        y0: f64,
    },
    Linear {
        f0: f64,
        f1: f64,
    },
    Sort {
        key: String,
        #[serde(default)]
        descending: bool,
    },
}

impl FileStep {
    pub fn into_step(self, time: Option<TimeParameters>) -> Result<PipelineStep> {
        let step = match self {
            FileStep::ResidueName { a, b } => PipelineStep::Filter(Filter::residue_names(&a, &b)?),
            FileStep::ResidueRange { a, b } => {
                PipelineStep::Filter(Filter::residue_ranges(&a, &b)?)
            }
            FileStep::Threshold {
                metric,
                operator,
                value,
            } => PipelineStep::Filter(Filter::Threshold {
                metric: ThresholdMetric::from_name(&metric, time)?,
                operator: operator.parse()?,
                value,
            }),
            FileStep::FrameWindow { lower, upper } => {
                PipelineStep::FrameWindow(FrameWindow::new(lower, upper)?)
            }
            FileStep::Sigmoid { x0, l, k, y0 } => {
                PipelineStep::ReweightFrames(WeightKernel::Sigmoid { x0, l, k, y0 })
            }
            FileStep::Rectangular { x0, x1, h, y0 } => {
                PipelineStep::ReweightFrames(WeightKernel::Rectangular { x0, x1, h, y0 })
            }
            FileStep::Linear { f0, f1 } => {
                PipelineStep::ReweightFrames(WeightKernel::Linear { f0, f1 })
            }
            FileStep::Sort { key, descending } => {
                let key: SortKey = key.parse()?;
                let sorting = Sorting::new(key, descending);
                match (key.requires_time_parameters(), time) {
                    (_, Some(params)) => PipelineStep::Sort(sorting.with_time_parameters(params)),
                    (true, None) => {
                        return Err(CliError::Pipeline(PipelineError::MissingTimeParameters {
                            key: key.label(),
                        }));
                    }
                    (false, None) => PipelineStep::Sort(sorting),
                }
            }
        };
        Ok(step)
    }
}
