use crate::core::models::topology::Topology;
use nalgebra::Point3;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TrajectoryError {
    #[error("Frame {frame} is out of range for a trajectory of {len} frames")]
    FrameOutOfRange { frame: usize, len: usize },
    #[error("Frame {frame} holds {found} positions, but the topology has {expected} atoms")]
    AtomCountMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
}

/// Source of per-frame whole-system coordinates for a detection run.
///
/// A provider owns one immutable [`Topology`] and a fixed number of frames. Frame `f`
/// yields one position per topology atom, indexed by global atom index.
pub trait TrajectoryProvider {
    /// The error type for frame access.
    type Error: Error + Send + Sync + 'static;

    /// The shared, immutable topology of the system.
    fn topology(&self) -> Arc<Topology>;

    /// Number of frames in the trajectory.
    fn frame_count(&self) -> usize;

    /// Whole-system positions of `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if `frame` is out of range or its coordinates cannot be produced.
    fn positions(&self, frame: usize) -> Result<&[Point3<f64>], Self::Error>;
}

/// Defines the interface for reading trajectory file formats.
pub trait TrajectoryFile {
    /// The trajectory produced by a successful read.
    type Output: TrajectoryProvider;

    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Reads a complete trajectory from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(&self, reader: &mut impl BufRead) -> Result<Self::Output, Self::Error>;

    /// Reads a complete trajectory from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Self::Output, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        self.read_from(&mut reader)
    }
}
