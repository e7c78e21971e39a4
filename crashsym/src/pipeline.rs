//! End-to-end symbolication: read, extract, resolve, rewrite
//!
//! Resolution is the only expensive stage (one subprocess per lookup), so
//! it runs on a bounded pool of scoped worker threads fed through a
//! `crossbeam` channel. Results are tagged with the record index, which
//! keeps the output in extraction order no matter which worker finishes
//! first. The rewrite runs on the calling thread once every worker is done.

use crossbeam_channel::{bounded, unbounded};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::thread;

use crate::domain::{AddressRecord, CrashsymError, ResolvedRecord};
use crate::extract::extract;
use crate::rewrite::rewrite;
use crate::symbolization::SymbolResolver;

/// Tunables for a pipeline run
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    /// Worker threads; 0 means available parallelism
    pub jobs: usize,
    /// Resolve all addresses of one image with a single backend call
    pub batch: bool,
}

impl PipelineConfig {
    /// Number of workers to spawn for `work_items` units of work
    #[must_use]
    pub fn worker_count(&self, work_items: usize) -> usize {
        let jobs = if self.jobs == 0 {
            thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            self.jobs
        };
        jobs.min(work_items).max(1)
    }
}

/// Result of a run: the rewritten text plus every per-address outcome
#[derive(Debug, Clone)]
pub struct Report {
    pub text: String,
    pub records: Vec<ResolvedRecord>,
}

impl Report {
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_resolved()).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.records.len() - self.resolved_count()
    }
}

pub struct Pipeline {
    resolver: SymbolResolver,
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(resolver: SymbolResolver, config: PipelineConfig) -> Self {
        Self { resolver, config }
    }

    /// Pipeline with default discovery and the `atos` backend
    pub fn for_bundle(bundle: impl AsRef<Path>) -> Self {
        Self::new(SymbolResolver::new(bundle.as_ref()), PipelineConfig::default())
    }

    /// Symbolicate a crash file and return the rewritten text
    ///
    /// # Errors
    /// Returns [`CrashsymError::FileRead`] if the crash file cannot be read.
    /// Per-address failures are embedded in the text instead.
    pub fn run(&self, crash_file: &Path) -> Result<String, CrashsymError> {
        self.symbolicate(crash_file).map(|report| report.text)
    }

    /// Like [`Pipeline::run`], keeping the per-address outcomes
    ///
    /// # Errors
    /// Returns [`CrashsymError::FileRead`] if the crash file cannot be read.
    pub fn symbolicate(&self, crash_file: &Path) -> Result<Report, CrashsymError> {
        let text = fs::read_to_string(crash_file).map_err(|source| CrashsymError::FileRead {
            path: crash_file.to_path_buf(),
            source,
        })?;
        info!("Read {} bytes from {}", text.len(), crash_file.display());
        Ok(self.symbolicate_text(&text))
    }

    /// Symbolicate crash text that is already in memory
    #[must_use]
    pub fn symbolicate_text(&self, text: &str) -> Report {
        let records = extract(text);
        let resolved = self.resolve_all(&records);
        let text = rewrite(text, &resolved);
        Report { text, records: resolved }
    }

    /// Work units handed to the pool: singletons, or one group per load
    /// address when batching
    fn work_units(&self, records: &[AddressRecord]) -> Vec<Vec<usize>> {
        if !self.config.batch {
            return (0..records.len()).map(|idx| vec![idx]).collect();
        }

        let mut groups: BTreeMap<Option<u64>, Vec<usize>> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            groups.entry(record.load_address().ok()).or_default().push(idx);
        }
        groups.into_values().collect()
    }

    fn resolve_all(&self, records: &[AddressRecord]) -> Vec<ResolvedRecord> {
        if records.is_empty() {
            return Vec::new();
        }

        let units = self.work_units(records);
        let workers = self.config.worker_count(units.len());
        debug!("Resolving {} records in {} units on {workers} workers", records.len(), units.len());

        let (unit_tx, unit_rx) = bounded::<Vec<usize>>(workers * 2);
        let (result_tx, result_rx) = unbounded::<(usize, ResolvedRecord)>();
        let resolver = &self.resolver;

        thread::scope(|scope| {
            for worker in 0..workers {
                let unit_rx = unit_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for unit in unit_rx {
                        let batch: Vec<&AddressRecord> =
                            unit.iter().map(|&i| &records[i]).collect();
                        let resolved = resolver.resolve_batch(&batch);
                        for (idx, record) in unit.into_iter().zip(resolved) {
                            if result_tx.send((idx, record)).is_err() {
                                return;
                            }
                        }
                    }
                    debug!("Resolver worker {worker} finished");
                });
            }
            drop(unit_rx);
            drop(result_tx);

            for unit in units {
                if unit_tx.send(unit).is_err() {
                    break;
                }
            }
            drop(unit_tx);
        });

        let mut slots: Vec<Option<ResolvedRecord>> = vec![None; records.len()];
        for (idx, record) in result_rx {
            slots[idx] = Some(record);
        }

        // Every worker returned normally, so every unit was resolved
        slots
            .into_iter()
            .map(|slot| slot.expect("every record resolved by a worker"))
            .collect()
    }
}

/// Symbolicate `crash_file` against `bundle` with default settings
///
/// # Errors
/// Returns [`CrashsymError::FileRead`] if the crash file cannot be read.
pub fn run(crash_file: &Path, bundle: &Path) -> Result<String, CrashsymError> {
    Pipeline::for_bundle(bundle).run(crash_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResolveError;
    use crate::symbolization::{FixedPathLocator, Lookup, SymbolBackend};
    use std::path::PathBuf;

    struct UpperBackend;

    impl SymbolBackend for UpperBackend {
        fn lookup(&self, _: &Lookup<'_>, address: &str) -> Result<String, ResolveError> {
            Ok(address.to_uppercase())
        }
    }

    fn pipeline_without_bundle(config: PipelineConfig) -> Pipeline {
        let resolver = SymbolResolver::new("/nonexistent/App.app.dSYM")
            .with_tool_locator(FixedPathLocator::new([PathBuf::from("/nonexistent/atos")]))
            .with_backend(UpperBackend);
        Pipeline::new(resolver, config)
    }

    #[test]
    fn test_worker_count_bounds() {
        let config = PipelineConfig { jobs: 8, batch: false };
        assert_eq!(config.worker_count(3), 3);
        assert_eq!(config.worker_count(0), 1);
        assert!(PipelineConfig::default().worker_count(100) >= 1);
    }

    #[test]
    fn test_empty_text() {
        let report = pipeline_without_bundle(PipelineConfig::default()).symbolicate_text("");
        assert_eq!(report.text, "");
        assert!(report.records.is_empty());
    }

    #[test]
    fn test_order_preserved_with_many_workers() {
        let text: String = (1..=50).map(|i| format!("0x{:x} {i}\n", 0x1000 + i)).collect();
        let config = PipelineConfig { jobs: 4, batch: false };
        let report = pipeline_without_bundle(config).symbolicate_text(&text);

        assert_eq!(report.records.len(), 50);
        for (i, record) in report.records.iter().enumerate() {
            assert_eq!(record.record.offset, i as u64 + 1);
        }
        assert_eq!(report.failed_count(), 50);
    }

    #[test]
    fn test_work_units_group_by_load_address() {
        let pipeline = pipeline_without_bundle(PipelineConfig { jobs: 1, batch: true });
        let records = extract("0x1010 16\n0x1020 32\n0x2010 16\n");
        let units = pipeline.work_units(&records);
        assert_eq!(units, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_missing_crash_file_is_fatal() {
        let pipeline = pipeline_without_bundle(PipelineConfig::default());
        let err = pipeline.run(Path::new("/nonexistent/report.crash")).unwrap_err();
        assert!(matches!(err, CrashsymError::FileRead { .. }));
    }
}
