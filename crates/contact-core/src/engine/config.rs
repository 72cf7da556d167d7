use thiserror::Error;

/// Second-selection value that analyzes the first selection against itself.
pub const SELF_INTERACTION_SENTINEL: &str = "self";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Geometric parameters of the per-frame contact kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    /// Heavy-atom contact cutoff in Å (inclusive).
    pub cutoff: f64,
    /// Hydrogen–acceptor distance cutoff in Å (inclusive).
    pub hbond_cutoff: f64,
    /// Minimum donor–hydrogen–acceptor angle in degrees (inclusive).
    pub hbond_angle: f64,
    /// Both selections are the same atom set.
    pub self_interaction: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    pub selection_1: String,
    pub selection_2: String,
    pub cutoff: f64,
    pub hbond_cutoff: f64,
    pub hbond_angle: f64,
    pub workers: usize,
}

impl DetectionConfig {
    pub fn is_self_interaction(&self) -> bool {
        self.selection_2.trim() == SELF_INTERACTION_SENTINEL
    }

    pub fn kernel_params(&self) -> KernelParams {
        KernelParams {
            cutoff: self.cutoff,
            hbond_cutoff: self.hbond_cutoff,
            hbond_angle: self.hbond_angle,
            self_interaction: self.is_self_interaction(),
        }
    }
}

#[derive(Default)]
pub struct DetectionConfigBuilder {
    selection_1: Option<String>,
    selection_2: Option<String>,
    cutoff: Option<f64>,
    hbond_cutoff: Option<f64>,
    hbond_angle: Option<f64>,
    workers: Option<usize>,
}

impl DetectionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection_1(mut self, expression: impl Into<String>) -> Self {
        self.selection_1 = Some(expression.into());
        self
    }
    pub fn selection_2(mut self, expression: impl Into<String>) -> Self {
        self.selection_2 = Some(expression.into());
        self
    }
    pub fn cutoff(mut self, angstroms: f64) -> Self {
        self.cutoff = Some(angstroms);
        self
    }
    pub fn hbond_cutoff(mut self, angstroms: f64) -> Self {
        self.hbond_cutoff = Some(angstroms);
        self
    }
    pub fn hbond_angle(mut self, degrees: f64) -> Self {
        self.hbond_angle = Some(degrees);
        self
    }
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = Some(n);
        self
    }

    pub fn build(self) -> Result<DetectionConfig, ConfigError> {
        let config = DetectionConfig {
            selection_1: self
                .selection_1
                .ok_or(ConfigError::MissingParameter("selection_1"))?,
            selection_2: self
                .selection_2
                .ok_or(ConfigError::MissingParameter("selection_2"))?,
            cutoff: self.cutoff.ok_or(ConfigError::MissingParameter("cutoff"))?,
            hbond_cutoff: self
                .hbond_cutoff
                .ok_or(ConfigError::MissingParameter("hbond_cutoff"))?,
            hbond_angle: self
                .hbond_angle
                .ok_or(ConfigError::MissingParameter("hbond_angle"))?,
            workers: self.workers.ok_or(ConfigError::MissingParameter("workers"))?,
        };
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &DetectionConfig) -> Result<(), ConfigError> {
    let positive = |name: &'static str, value: f64| {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidParameter {
                name,
                reason: format!("expected a positive distance, got {value}"),
            })
        }
    };
    positive("cutoff", config.cutoff)?;
    positive("hbond_cutoff", config.hbond_cutoff)?;

    if !(0.0..=180.0).contains(&config.hbond_angle) {
        return Err(ConfigError::InvalidParameter {
            name: "hbond_angle",
            reason: format!("expected degrees in [0, 180], got {}", config.hbond_angle),
        });
    }
    if config.workers == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "workers",
            reason: "at least one worker is required".to_string(),
        });
    }
    if config.selection_1.trim().is_empty() {
        return Err(ConfigError::InvalidParameter {
            name: "selection_1",
            reason: "selection expression is empty".to_string(),
        });
    }
    Ok(())
}
