//! # Analysis Module
//!
//! Post-processing of aggregated [`Contact`](crate::core::models::contact::Contact)s.
//!
//! - **Filters** ([`filter`]) - Residue name, residue range and threshold filters plus
//!   frame windowing
//! - **Weight Functions** ([`weight`]) - Sigmoid, rectangular and linear score profiles
//! - **Sorting** ([`sort`]) - Stable ordering by score, classification or time statistics
//! - **Error Handling** ([`error`]) - Filter and pipeline error types
//!
//! Every operation here runs on the calling thread after detection has finished.

pub mod error;
pub mod filter;
pub mod sort;
pub mod weight;
