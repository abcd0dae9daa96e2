//! Core path generalization engine and the services around it.
//!
//! `segment` and `path_analyzer` hold the learning tries; `endpoints` and
//! `opens` run the two-pass batch reconciliation on top of them. `state`
//! and `metrics` are used by the HTTP layer only.

pub mod endpoints;
pub mod metrics;
pub mod opens;
pub mod path_analyzer;
pub mod segment;
pub mod state;

pub use endpoints::*;
pub use metrics::*;
pub use opens::*;
pub use path_analyzer::*;
pub use segment::*;
pub use state::*;
