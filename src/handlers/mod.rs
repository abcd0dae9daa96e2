//! HTTP request handlers for the collector-facing API.

pub mod health;
pub mod metrics;
pub mod openapi;
pub mod reconcile;
pub mod version;

pub use health::*;
pub use metrics::*;
pub use openapi::*;
pub use reconcile::*;
pub use version::*;
