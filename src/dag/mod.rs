// src/dag/mod.rs

//! Unit graph representation and scheduling.
//!
//! - [`graph`] holds a whole-graph snapshot used for validation and cycle
//!   diagnostics.
//! - [`scan`] contains the fixed-point scan that decides which pending unit
//!   is attempted next. The walker and the dry-run planner both drive it.

pub mod graph;
pub mod scan;

pub use graph::DagGraph;
pub use scan::{Readiness, ScanOutcome, ScanTarget};
