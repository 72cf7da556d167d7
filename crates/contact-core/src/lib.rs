//! # mdcontacts
//!
//! A library for detecting atomic contacts and hydrogen bonds in molecular dynamics
//! trajectories, and for filtering, reweighting and ranking the resulting contacts.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Topology`, `AtomContact`,
//!   `Contact`), geometry helpers, chemical lookup tables, the atom selection language
//!   and trajectory I/O.
//!
//! - **[`engine`]: The Detection Machinery.** The per-frame geometry kernel, the frame
//!   chunker, the worker pool that runs chunks in parallel and the aggregator that merges
//!   per-frame observations into trajectory-wide contacts.
//!
//! - **[`analysis`]: The Downstream Pipeline.** Filters, weight functions and sorting
//!   over aggregated contacts.
//!
//! - **[`workflows`]: The Public API.** Complete procedures tying the layers together:
//!   detection over a trajectory provider and composable post-processing pipelines.
//!
//! Detection results are independent of the number of workers.

pub mod analysis;
pub mod core;
pub mod engine;
pub mod workflows;
