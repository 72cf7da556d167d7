use thiserror::Error;

use super::config::ConfigError;
use crate::core::selection::SelectionError;

/// Failures of the per-frame geometry kernel. All of them abort the run.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum KernelError {
    #[error("Frame {frame}: atom index {index} is outside the topology ({len} atoms)")]
    AtomOutOfRange { frame: usize, index: usize, len: usize },

    #[error(
        "Frame {frame}: hydrogen {hydrogen} bonded to atom {heavy} has no position in the selection"
    )]
    UnresolvedHydrogen {
        frame: usize,
        hydrogen: usize,
        heavy: usize,
    },

    #[error("Frame {frame}: {positions} positions do not match {indices} index entries")]
    MalformedFrame {
        frame: usize,
        positions: usize,
        indices: usize,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid selection: {source}")]
    Selection {
        #[from]
        source: SelectionError,
    },

    #[error(
        "Selection {side}{} matched no atoms",
        .expression.as_deref().map(|e| format!(" ('{e}')")).unwrap_or_default()
    )]
    EmptySelection {
        side: usize,
        expression: Option<String>,
    },

    #[error("Trajectory contains no frames")]
    EmptyTrajectory,

    #[error("Trajectory provider failed: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Worker for chunk {chunk} failed: {source}")]
    Worker {
        chunk: usize,
        #[source]
        source: KernelError,
    },

    #[error("Atom index {0} is not part of the topology")]
    UnknownAtom(usize),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
