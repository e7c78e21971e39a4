//! Discovery of the external `atos` executable
//!
//! Only fixed install locations are checked, `PATH` is not searched. An
//! explicit path can be chained in front of them.

use log::debug;
use std::path::PathBuf;

use crate::domain::ResolveError;

/// Well-known `atos` install locations, checked in order
pub const DEFAULT_TOOL_PATHS: &[&str] =
    &["/usr/bin/atos", "/usr/local/bin/atos", "/opt/homebrew/bin/atos"];

/// Strategy for finding the resolver executable
pub trait ToolLocator: Send + Sync {
    /// # Errors
    /// Returns [`ResolveError::ToolNotFound`] if no executable is available.
    fn locate(&self) -> Result<PathBuf, ResolveError>;
}

/// Returns the first existing file from an ordered candidate list
#[derive(Debug, Clone)]
pub struct FixedPathLocator {
    candidates: Vec<PathBuf>,
}

impl Default for FixedPathLocator {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_PATHS.iter().map(PathBuf::from))
    }
}

impl FixedPathLocator {
    pub fn new<I: IntoIterator<Item = PathBuf>>(candidates: I) -> Self {
        Self { candidates: candidates.into_iter().collect() }
    }

    #[must_use]
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}

impl ToolLocator for FixedPathLocator {
    fn locate(&self) -> Result<PathBuf, ResolveError> {
        for path in &self.candidates {
            if path.is_file() {
                debug!("Using resolver tool {}", path.display());
                return Ok(path.clone());
            }
        }
        debug!("No resolver tool in {} candidate locations", self.candidates.len());
        Err(ResolveError::ToolNotFound)
    }
}

/// A user-supplied tool path
#[derive(Debug, Clone)]
pub struct ExplicitToolLocator(PathBuf);

impl ExplicitToolLocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl ToolLocator for ExplicitToolLocator {
    fn locate(&self) -> Result<PathBuf, ResolveError> {
        if self.0.is_file() {
            Ok(self.0.clone())
        } else {
            debug!("Explicit resolver tool {} does not exist", self.0.display());
            Err(ResolveError::ToolNotFound)
        }
    }
}

/// Ordered chain of locators; the first success wins
#[derive(Default)]
pub struct LocatorChain {
    locators: Vec<Box<dyn ToolLocator>>,
}

impl LocatorChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, locator: impl ToolLocator + 'static) -> Self {
        self.locators.push(Box::new(locator));
        self
    }
}

impl ToolLocator for LocatorChain {
    fn locate(&self) -> Result<PathBuf, ResolveError> {
        self.locators
            .iter()
            .find_map(|locator| locator.locate().ok())
            .ok_or(ResolveError::ToolNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_default_candidates_order() {
        let locator = FixedPathLocator::default();
        assert_eq!(locator.candidates()[0], PathBuf::from("/usr/bin/atos"));
        assert_eq!(locator.candidates().len(), 3);
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("second");
        let third = dir.path().join("third");
        File::create(&second).unwrap();
        File::create(&third).unwrap();

        let locator = FixedPathLocator::new([dir.path().join("first"), second.clone(), third]);
        assert_eq!(locator.locate().unwrap(), second);
    }

    #[test]
    fn test_no_candidate_exists() {
        let locator = FixedPathLocator::new([PathBuf::from("/nonexistent/atos")]);
        assert_eq!(locator.locate(), Err(ResolveError::ToolNotFound));
    }

    #[test]
    fn test_directory_is_not_a_tool() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ExplicitToolLocator::new(dir.path());
        assert_eq!(locator.locate(), Err(ResolveError::ToolNotFound));
    }

    #[test]
    fn test_chain_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("atos");
        File::create(&tool).unwrap();

        let chain = LocatorChain::new()
            .with(ExplicitToolLocator::new("/nonexistent/atos"))
            .with(FixedPathLocator::new([tool.clone()]));
        assert_eq!(chain.locate().unwrap(), tool);
        assert_eq!(LocatorChain::new().locate(), Err(ResolveError::ToolNotFound));
    }
}
