//! Configuration structures and loading utilities.
//!
//! Every structure loads from environment variables and falls back to
//! defaults for anything unset or unparseable.

pub mod analyzer;
pub mod server;

pub use analyzer::*;
pub use server::*;
