//! Path Generalizer - learns which path segments are dynamic
//!
//! Collectors observe concrete paths (HTTP endpoints, filesystem `open()`
//! calls) and submit them in batches. The engine keeps one segment trie per
//! identifier and promotes a position to a wildcard (`⋯`) once it has seen
//! more distinct literals than the configured threshold. Records whose paths
//! collapse onto the same generalized form are merged.
//!
//! ## Architecture
//!
//! - `services/` - the trie engine, reconciliation passes and shared state
//! - `utils/` - path normalization and metadata merge helpers
//! - `models/` - observed records and API envelopes
//! - `handlers/` - HTTP handlers and the app factory
//! - `config/` - environment-driven configuration
//!
//! ## Quick Start
//!
//! ```
//! use path_generalizer::{PathAnalyzer, analyze_open};
//!
//! let mut analyzer = PathAnalyzer::new(2);
//! for user in ["alice", "bob", "carol"] {
//!     analyze_open(&format!("/home/{user}/.bashrc"), &mut analyzer).unwrap();
//! }
//! assert_eq!(
//!     analyze_open("/home/dave/.bashrc", &mut analyzer).unwrap(),
//!     "/home/\u{22ef}/.bashrc"
//! );
//! ```

// Core modules
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions for convenience
pub use config::{AnalyzerConfig, LogFormat, ServerConfig};
pub use handlers::{
    create_app, create_base_app, create_openapi_spec, get_metrics, health, reconcile_endpoints,
    reconcile_opens, version,
};
pub use models::{
    EndpointReconcileResponse, EndpointRecord, Headers, HealthResponse, OpenReconcileRequest,
    OpenReconcileResponse, OpenRecord, SkippedRecord, VersionResponse,
};
pub use services::{
    AnalyzeError, AnalyzerState, AppMetrics, DYNAMIC_SEGMENT, EndpointAnalysis, OPENS_IDENTIFIER,
    OpenAnalysis, PathAnalyzer, ReconcileError, SegmentNode, analyze_endpoints, analyze_open,
    analyze_opens, analyze_url,
};
pub use utils::{merge_headers, merge_sorted, merge_strings};
