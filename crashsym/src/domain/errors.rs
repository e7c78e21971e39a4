//! Structured error types for crashsym
//!
//! Using thiserror for automatic Display implementation and error chaining.
//!
//! Two families exist: [`CrashsymError`] aborts a whole run, while
//! [`ResolveError`] stays attached to a single address and is rendered
//! inline in the symbolicated output.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrashsymError {
    #[error("Failed to read crash file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Crash file not found: {}\n\nPass the .crash (or .txt) report as the positional argument.",
        .0.display()
    )]
    CrashFileNotFound(PathBuf),

    #[error(
        "Not a file: {}\n\nThe crash report must be a text file, not a directory.",
        .0.display()
    )]
    NotAFile(PathBuf),

    #[error("dSYM bundle not found: {}", .0.display())]
    BundleNotFound(PathBuf),

    #[error("Failed to write output to {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Symbolication was interrupted")]
    Interrupted,
}

/// Failure to resolve one address
///
/// Cloneable so a single lookup failure (missing artifact, missing tool,
/// failed batch) can be attributed to every affected record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("DWARF file not found in dSYM {}", .bundle.display())]
    ArtifactNotFound { bundle: PathBuf },

    #[error("atos command not found")]
    ToolNotFound,

    #[error("Invalid address or offset: {address} - {offset:#x}")]
    InvalidAddress { address: String, offset: u64 },

    #[error("Error running atos command for address: {address} ({reason})")]
    ProcessInvocation { address: String, reason: String },

    #[error("atos exited with {status} for address: {address}")]
    ProcessFailed { address: String, status: String },

    #[error("Error parsing address: {address}")]
    OutputDecode { address: String },
}

impl ResolveError {
    /// Stable category name, used in reports
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactNotFound { .. } => "artifact_not_found",
            Self::ToolNotFound => "tool_not_found",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::ProcessInvocation { .. } => "process_invocation",
            Self::ProcessFailed { .. } => "process_failed",
            Self::OutputDecode { .. } => "output_decode",
        }
    }
}
