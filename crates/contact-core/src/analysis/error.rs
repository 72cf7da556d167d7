use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FilterError {
    #[error("Invalid residue range '{0}' (expected 'lo-hi', a single id, or 'all')")]
    InvalidRange(String),
    #[error("Empty entry in list '{0}'")]
    EmptyEntry(String),
    #[error("Unknown comparison operator '{0}'")]
    InvalidOperator(String),
    #[error("Unknown threshold metric '{0}'")]
    InvalidMetric(String),
    #[error("Invalid frame window: lower bound {lower} exceeds upper bound {upper}")]
    InvalidFrameWindow { lower: usize, upper: usize },
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum PipelineError {
    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error("'{key}' requires the per-frame duration and score threshold to be set")]
    MissingTimeParameters { key: &'static str },

    #[error("Weight profile has {found} entries, but the contacts span {expected} frames")]
    ProfileLengthMismatch { expected: usize, found: usize },

    #[error("Unknown sort key '{0}'")]
    InvalidSortKey(String),
}
