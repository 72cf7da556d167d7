use mdcontacts::core::models::contact::TimeParameters;
use mdcontacts::engine::config::DetectionConfig;
use mdcontacts::workflows::pipeline::Pipeline;

/// The fully merged settings of one `detect` run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub detection: DetectionConfig,
    pub time: Option<TimeParameters>,
    pub pipeline: Pipeline,
    /// Maximum hydrogen attachment distance, when bond guessing is enabled.
    pub hydrogen_attach_distance: Option<f64>,
}
