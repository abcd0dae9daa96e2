//! Data models shared by the analyzers and the HTTP layer.
//!
//! `records` holds what collectors submit and get back; `api` holds the
//! request and response envelopes of the HTTP surface.

pub mod api;
pub mod records;

pub use api::*;
pub use records::*;
