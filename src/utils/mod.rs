//! Utility functions and helper modules.
//!
//! Path normalization shared by the analyzers and the set-union helpers used
//! to merge record metadata.

pub mod merge;
pub mod path;

pub use merge::*;
pub use path::*;
