//! Trajectory input and tabular contact output.
//!
//! Trajectories are consumed through the [`traits::TrajectoryProvider`] contract; the
//! module ships an in-memory provider and a multi-model PDB reader producing one.

pub mod memory;
pub mod pdb;
pub mod table;
pub mod traits;
