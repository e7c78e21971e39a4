//! Locating the DWARF artifact inside a dSYM bundle
//!
//! A bundle named `App.app.dSYM` keeps its debug binary at
//! `App.app.dSYM/Contents/Resources/DWARF/App`.

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ResolveError;

/// Directory inside a bundle that holds the DWARF binaries
pub const DWARF_SUBDIR: &str = "Contents/Resources/DWARF";

/// Bundle suffixes stripped to derive the artifact name, tried in order
pub const DEFAULT_BUNDLE_SUFFIXES: &[&str] =
    &[".app.dSYM", ".framework.dSYM", ".appex.dSYM", ".dSYM"];

/// Strategy for finding the debug artifact of a bundle
pub trait ArtifactLocator: Send + Sync {
    /// # Errors
    /// Returns [`ResolveError::ArtifactNotFound`] if no artifact matches.
    fn locate(&self, bundle: &Path) -> Result<PathBuf, ResolveError>;
}

/// Standard dSYM layout lookup
#[derive(Debug, Clone)]
pub struct DsymLocator {
    suffixes: Vec<String>,
}

impl Default for DsymLocator {
    fn default() -> Self {
        Self { suffixes: DEFAULT_BUNDLE_SUFFIXES.iter().map(ToString::to_string).collect() }
    }
}

impl DsymLocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom suffix list instead of [`DEFAULT_BUNDLE_SUFFIXES`]
    #[must_use]
    pub fn with_suffixes<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { suffixes: suffixes.into_iter().map(Into::into).collect() }
    }

    /// Artifact name expected for `bundle`: its last component minus the
    /// first matching suffix
    #[must_use]
    pub fn artifact_name(&self, bundle: &Path) -> Option<String> {
        let name = bundle.file_name()?.to_str()?;
        let base = self
            .suffixes
            .iter()
            .find_map(|suffix| name.strip_suffix(suffix.as_str()))
            .unwrap_or(name);
        Some(base.to_string())
    }
}

impl ArtifactLocator for DsymLocator {
    fn locate(&self, bundle: &Path) -> Result<PathBuf, ResolveError> {
        let not_found = || ResolveError::ArtifactNotFound { bundle: bundle.to_path_buf() };

        let Some(name) = self.artifact_name(bundle) else {
            warn!("Cannot derive artifact name from {}", bundle.display());
            return Err(not_found());
        };

        let dwarf_dir = bundle.join(DWARF_SUBDIR);
        let entries = match fs::read_dir(&dwarf_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to list {}: {e}", dwarf_dir.display());
                return Err(not_found());
            }
        };

        let found =
            entries.flatten().find(|entry| entry.file_name().to_str() == Some(name.as_str()));
        match found {
            Some(entry) => {
                let path = entry.path();
                debug!("Found DWARF artifact {}", path.display());
                Ok(path)
            }
            None => {
                warn!("No DWARF file named '{name}' in {}", dwarf_dir.display());
                Err(not_found())
            }
        }
    }
}
