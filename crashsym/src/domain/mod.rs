//! Domain model for crashsym
//!
//! This module contains the records passed between pipeline stages and the
//! error types that classify failures:
//! - Fatal errors abort a run before any output is produced
//! - Per-address errors are kept as tagged results until the final rewrite

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{AddressRecord, ResolvedRecord};

pub use errors::{CrashsymError, ResolveError};
