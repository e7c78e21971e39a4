//! Pre-flight checks for crashsym
//!
//! Validates inputs before any symbolication work starts.
//! Provides clear, actionable error messages when requirements aren't met.

use anyhow::Result;
use std::path::Path;

use crate::domain::CrashsymError;
use crate::symbolization::ToolLocator;

/// Run all pre-flight checks before symbolication
///
/// # Errors
/// Returns an error if the crash file or the bundle is unusable.
pub fn run_preflight_checks(
    crash_file: &Path,
    bundle: &Path,
    tools: &dyn ToolLocator,
    quiet: bool,
) -> Result<()> {
    check_crash_file(crash_file)?;
    check_bundle(bundle)?;
    if !quiet {
        check_bundle_name(bundle);
        check_tool(tools);
    }
    Ok(())
}

/// Check that the crash file exists and is a regular file
fn check_crash_file(crash_file: &Path) -> Result<(), CrashsymError> {
    if !crash_file.exists() {
        return Err(CrashsymError::CrashFileNotFound(crash_file.to_path_buf()));
    }
    if !crash_file.is_file() {
        return Err(CrashsymError::NotAFile(crash_file.to_path_buf()));
    }
    Ok(())
}

/// Check that the dSYM bundle is a directory
fn check_bundle(bundle: &Path) -> Result<()> {
    if !bundle.is_dir() {
        return Err(CrashsymError::BundleNotFound(bundle.to_path_buf()).into());
    }
    Ok(())
}

fn check_bundle_name(bundle: &Path) {
    let is_dsym =
        bundle.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext == "dSYM");
    if !is_dsym {
        eprintln!("warning: {} is not a .dSYM bundle, DWARF lookup may fail", bundle.display());
    }
}

fn check_tool(tools: &dyn ToolLocator) {
    if tools.locate().is_err() {
        eprintln!(
            "warning: atos not found, every address will be reported as unresolved\n\
             (install the Xcode command line tools or pass --tool)"
        );
    }
}
