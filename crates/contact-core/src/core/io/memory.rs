use super::traits::{TrajectoryError, TrajectoryProvider};
use crate::core::models::topology::Topology;
use nalgebra::Point3;
use std::sync::Arc;

/// A trajectory held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryTrajectory {
    topology: Arc<Topology>,
    frames: Vec<Vec<Point3<f64>>>,
}

impl InMemoryTrajectory {
    /// Creates a trajectory after checking that every frame has one position per atom.
    pub fn new(
        topology: impl Into<Arc<Topology>>,
        frames: Vec<Vec<Point3<f64>>>,
    ) -> Result<Self, TrajectoryError> {
        let topology = topology.into();
        if let Some((frame, positions)) = frames
            .iter()
            .enumerate()
            .find(|(_, positions)| positions.len() != topology.len())
        {
            return Err(TrajectoryError::AtomCountMismatch {
                frame,
                expected: topology.len(),
                found: positions.len(),
            });
        }
        Ok(Self { topology, frames })
    }

    pub fn frames(&self) -> &[Vec<Point3<f64>>] {
        &self.frames
    }
}

impl TrajectoryProvider for InMemoryTrajectory {
    type Error = TrajectoryError;

    fn topology(&self) -> Arc<Topology> {
        Arc::clone(&self.topology)
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn positions(&self, frame: usize) -> Result<&[Point3<f64>], Self::Error> {
        self.frames
            .get(frame)
            .map(Vec::as_slice)
            .ok_or(TrajectoryError::FrameOutOfRange {
                frame,
                len: self.frames.len(),
            })
    }
}
