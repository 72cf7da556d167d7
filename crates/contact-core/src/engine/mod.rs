//! # Engine Module
//!
//! The contact detection machinery: a per-frame geometry kernel, the splitting of a
//! trajectory into per-worker chunks, a fixed-size worker pool and the aggregation of
//! per-frame observations into trajectory-wide contacts.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Detection parameters and their builder
//! - **Geometry Kernel** ([`kernel`]) - Contacts and hydrogen bonds of a single frame
//! - **Chunking** ([`chunker`]) - Even, order-preserving partition of the frames
//! - **Workers** ([`worker`]) - Kernel evaluation over one chunk
//! - **Coordination** ([`coordinator`]) - Worker pool, ordered merge and failure handling
//! - **Aggregation** ([`aggregator`]) - Per-pair score arrays over the whole trajectory
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Kernel and engine error types
//!
//! Workers share the topology read-only and never exchange mutable state; the only
//! synchronization point is the join of the coordinator.

pub mod aggregator;
pub mod chunker;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod kernel;
pub mod progress;
pub mod worker;
