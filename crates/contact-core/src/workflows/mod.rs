//! # Workflows Module
//!
//! High-level entry points for users of the library.
//!
//! - **Detection** ([`detect`]) - Resolves the two selections on a trajectory, runs the
//!   parallel contact detection and hands back the frame-ordered observations
//! - **Pipeline** ([`pipeline`]) - Filters, frame windows, reweighting and sorting
//!   applied to aggregated contacts, alone or as an ordered list of steps

pub mod detect;
pub mod pipeline;
