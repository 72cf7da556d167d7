//! # Core Module
//!
//! The foundation layer: stateless data models, geometry helpers, chemical lookup
//! tables, the atom selection language and trajectory I/O.
//!
//! - **Molecular Representation** ([`models`]) - Topology, frame payloads and contact records
//! - **Selections** ([`selection`]) - Parsing and evaluating atom selection expressions
//! - **File I/O** ([`io`]) - Trajectory providers and the contact summary table
//! - **Utilities** ([`utils`]) - Distance matrices, contact weights and atom classification

pub mod io;
pub mod models;
pub mod selection;
pub mod utils;
