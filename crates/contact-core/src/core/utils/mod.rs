//! Pure helper functions shared by the detection engine and the analysis pipeline.
//!
//! - [`geometry`] - Distance matrices, the contact weight kernel and angle evaluation
//! - [`identifiers`] - Static lookup tables for atom and residue classification

pub mod geometry;
pub mod identifiers;
