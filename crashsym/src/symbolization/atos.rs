//! Resolver backends
//!
//! [`SymbolBackend`] is the seam between address arithmetic and the
//! program that actually reads DWARF. [`AtosBackend`] runs `atos`:
//!
//! ```text
//! atos -o App.app.dSYM/Contents/Resources/DWARF/App -l 0x102514000 0x103450b5c
//! ```

use log::{debug, warn};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::domain::ResolveError;

/// Everything a backend needs besides the addresses themselves
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    /// Resolver executable
    pub tool: &'a Path,
    /// DWARF artifact inside the bundle
    pub artifact: &'a Path,
    /// Image load address
    pub load_address: u64,
}

/// Translates addresses into symbol text
pub trait SymbolBackend: Send + Sync {
    /// Resolve a single address token (`0x`-prefixed hex)
    ///
    /// # Errors
    /// Returns a [`ResolveError`] naming `address` if the lookup fails.
    fn lookup(&self, lookup: &Lookup<'_>, address: &str) -> Result<String, ResolveError>;

    /// Resolve several addresses sharing one load address
    ///
    /// The returned vector is parallel to `addresses`.
    ///
    /// # Errors
    /// Any failure applies to the whole batch.
    fn lookup_many(
        &self,
        lookup: &Lookup<'_>,
        addresses: &[&str],
    ) -> Result<Vec<String>, ResolveError> {
        addresses.iter().map(|address| self.lookup(lookup, address)).collect()
    }
}

/// Runs the `atos` executable, one process per call
#[derive(Debug, Clone, Default)]
pub struct AtosBackend {
    arch: Option<String>,
}

impl AtosBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass `-arch <arch>` to every invocation
    #[must_use]
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    fn command(&self, lookup: &Lookup<'_>, addresses: &[&str]) -> Command {
        let mut cmd = Command::new(lookup.tool);
        if let Some(ref arch) = self.arch {
            cmd.arg("-arch").arg(arch);
        }
        cmd.arg("-o")
            .arg(lookup.artifact)
            .arg("-l")
            .arg(format!("{:#x}", lookup.load_address))
            .args(addresses)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn run(&self, lookup: &Lookup<'_>, addresses: &[&str]) -> Result<String, ResolveError> {
        let label = addresses.join(" ");
        let mut cmd = self.command(lookup, addresses);
        debug!("Running {cmd:?}");

        let output = cmd.output().map_err(|e| ResolveError::ProcessInvocation {
            address: label.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("atos failed for {label}: {}", stderr.trim());
            return Err(ResolveError::ProcessFailed {
                address: label,
                status: output.status.to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ResolveError::OutputDecode { address: label })
    }
}

impl SymbolBackend for AtosBackend {
    fn lookup(&self, lookup: &Lookup<'_>, address: &str) -> Result<String, ResolveError> {
        self.run(lookup, &[address]).map(|out| out.trim().to_string())
    }

    fn lookup_many(
        &self,
        lookup: &Lookup<'_>,
        addresses: &[&str],
    ) -> Result<Vec<String>, ResolveError> {
        let out = self.run(lookup, addresses)?;
        let lines: Vec<String> = out
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        // atos prints one line per address; anything else cannot be paired up
        if lines.len() != addresses.len() {
            warn!("atos returned {} lines for {} addresses", lines.len(), addresses.len());
            return Err(ResolveError::OutputDecode { address: addresses.join(" ") });
        }
        Ok(lines)
    }
}
