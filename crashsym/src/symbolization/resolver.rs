//! Per-address resolution against one dSYM bundle
//!
//! Computes the load address of each record, runs the backend and turns
//! every failure into a tagged [`ResolveError`] outcome.

use log::{debug, trace};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::artifact::{ArtifactLocator, DsymLocator};
use super::atos::{AtosBackend, Lookup, SymbolBackend};
use super::tool::{FixedPathLocator, ToolLocator};
use crate::domain::{AddressRecord, ResolveError, ResolvedRecord};

/// Resolves address records against one dSYM bundle
///
/// Artifact and tool discovery run once, on first use, and the results are
/// shared by every later lookup. The resolver is `Sync`, so worker threads
/// can share a single instance.
pub struct SymbolResolver {
    bundle: PathBuf,
    artifact_locator: Box<dyn ArtifactLocator>,
    tool_locator: Box<dyn ToolLocator>,
    backend: Box<dyn SymbolBackend>,
    artifact: OnceLock<Result<PathBuf, ResolveError>>,
    tool: OnceLock<Result<PathBuf, ResolveError>>,
}

impl SymbolResolver {
    /// Create a resolver using the standard dSYM layout, the fixed `atos`
    /// install locations and the `atos` backend
    pub fn new(bundle: impl Into<PathBuf>) -> Self {
        Self {
            bundle: bundle.into(),
            artifact_locator: Box::new(DsymLocator::new()),
            tool_locator: Box::new(FixedPathLocator::default()),
            backend: Box::new(AtosBackend::new()),
            artifact: OnceLock::new(),
            tool: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_artifact_locator(mut self, locator: impl ArtifactLocator + 'static) -> Self {
        self.artifact_locator = Box::new(locator);
        self
    }

    #[must_use]
    pub fn with_tool_locator(mut self, locator: impl ToolLocator + 'static) -> Self {
        self.tool_locator = Box::new(locator);
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: impl SymbolBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    /// DWARF artifact of the bundle, looked up once
    ///
    /// # Errors
    /// Returns [`ResolveError::ArtifactNotFound`] if the bundle has no
    /// matching artifact.
    pub fn artifact(&self) -> Result<&Path, ResolveError> {
        self.artifact
            .get_or_init(|| self.artifact_locator.locate(&self.bundle))
            .as_deref()
            .map_err(Clone::clone)
    }

    /// Resolver executable, looked up once
    ///
    /// # Errors
    /// Returns [`ResolveError::ToolNotFound`] if no executable is installed.
    pub fn tool(&self) -> Result<&Path, ResolveError> {
        self.tool.get_or_init(|| self.tool_locator.locate()).as_deref().map_err(Clone::clone)
    }

    /// Checks shared by single and batched resolution, in order: artifact,
    /// tool, address arithmetic
    fn prepare(&self, record: &AddressRecord) -> Result<(Lookup<'_>, u64), ResolveError> {
        let artifact = self.artifact()?;
        let tool = self.tool()?;
        let load_address = record.load_address()?;
        Ok((Lookup { tool, artifact, load_address }, load_address))
    }

    /// Resolve one record
    ///
    /// Never fails: every error is carried in the returned record.
    #[must_use]
    pub fn resolve(&self, record: &AddressRecord) -> ResolvedRecord {
        let (lookup, load_address) = match self.prepare(record) {
            Ok(prepared) => prepared,
            Err(e) => {
                debug!("Cannot resolve {}: {e}", record.address_token());
                return ResolvedRecord::failed(record.clone(), e);
            }
        };

        let outcome = self
            .backend
            .lookup(&lookup, record.address_token())
            .map(|symbol| symbol.trim().to_string());
        trace!("{} -> {outcome:?}", record.address_token());

        ResolvedRecord { record: record.clone(), load_address: Some(load_address), outcome }
    }

    /// Resolve several records, one backend call per distinct load address
    ///
    /// The output is parallel to `records`. A failed backend call is
    /// reported on every record of its group.
    #[must_use]
    pub fn resolve_batch(&self, records: &[&AddressRecord]) -> Vec<ResolvedRecord> {
        if let [record] = records {
            return vec![self.resolve(record)];
        }

        let mut results: Vec<Option<ResolvedRecord>> = vec![None; records.len()];
        let mut groups: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
        let mut lookup = None;

        for (idx, record) in records.iter().enumerate() {
            match self.prepare(record) {
                Ok((prepared, load_address)) => {
                    lookup = Some(prepared);
                    groups.entry(load_address).or_default().push(idx);
                }
                Err(e) => results[idx] = Some(ResolvedRecord::failed((*record).clone(), e)),
            }
        }

        if let Some(lookup) = lookup {
            for (load_address, members) in groups {
                let lookup = Lookup { load_address, ..lookup };
                let addresses: Vec<&str> =
                    members.iter().map(|&idx| records[idx].address_token()).collect();
                debug!("Resolving {} addresses at load address {load_address:#x}", members.len());

                match self.backend.lookup_many(&lookup, &addresses) {
                    Ok(symbols) => {
                        for (idx, symbol) in members.into_iter().zip(symbols) {
                            results[idx] = Some(ResolvedRecord {
                                record: records[idx].clone(),
                                load_address: Some(load_address),
                                outcome: Ok(symbol.trim().to_string()),
                            });
                        }
                    }
                    Err(e) => {
                        for idx in members {
                            results[idx] = Some(ResolvedRecord {
                                record: records[idx].clone(),
                                load_address: Some(load_address),
                                outcome: Err(e.clone()),
                            });
                        }
                    }
                }
            }
        }

        results
            .into_iter()
            .zip(records)
            .map(|(result, record)| {
                result.unwrap_or_else(|| {
                    ResolvedRecord::failed(
                        (*record).clone(),
                        ResolveError::OutputDecode { address: record.address_token().to_string() },
                    )
                })
            })
            .collect()
    }
}
