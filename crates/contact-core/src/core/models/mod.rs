//! # Core Models Module
//!
//! Data structures describing the molecular system under analysis and the contacts
//! detected in it.
//!
//! ## Key Components
//!
//! - [`topology`] - Whole-system atom attributes and bond connectivity, shared read-only
//! - [`frame`] - Per-frame selection coordinates with their local-to-global index maps
//! - [`atom_contact`] - Single-frame atom contacts and their hydrogen bonds
//! - [`contact`] - Trajectory-wide contacts with score arrays and derived statistics
//!
//! ## Usage
//!
//! ```ignore
//! use mdcontacts::core::models::topology::{AtomRecord, TopologyBuilder};
//!
//! let mut builder = TopologyBuilder::new();
//! let n = builder.add_atom(AtomRecord::new("N", 1, "SER", "PROA"));
//! let h = builder.add_atom(AtomRecord::new("HN", 1, "SER", "PROA"));
//! builder.add_bond(n, h);
//! let topology = builder.build()?;
//! ```

pub mod atom_contact;
pub mod contact;
pub mod frame;
pub mod topology;
