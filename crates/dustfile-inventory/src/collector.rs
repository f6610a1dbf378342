//! Multi-root inventory collection.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use dustfile_analyze::{DuplicateAnalyzer, DuplicateReport, HeuristicJunk, JunkClassifier};
use dustfile_core::{ErrorPolicy, FileRecord, InventoryConfig, ScanError, ScanWarning};
use dustfile_scan::{CancellationToken, DirectoryWalker, RootScan, ScanProgress};

use crate::summary::InventorySummary;

/// A record together with its junk label.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryEntry {
    pub record: FileRecord,
    pub is_junk: bool,
}

/// Per-root outcome of a successful walk.
#[derive(Debug, Clone, Serialize)]
pub struct RootReport {
    pub root: PathBuf,
    pub files: usize,
    pub hashes_computed: u64,
    pub skipped: u64,
    pub warnings: Vec<ScanWarning>,
    pub interrupted: bool,
    pub duration: Duration,
}

/// A root that could not be walked at all.
#[derive(Debug)]
pub struct RootFailure {
    pub root: PathBuf,
    pub error: ScanError,
}

/// The result of a run: annotated entries in scan order plus bookkeeping.
#[derive(Debug)]
pub struct Inventory {
    /// Entries in scan order, roots in configured order.
    pub entries: Vec<InventoryEntry>,
    pub duplicates: DuplicateReport,
    pub roots: Vec<RootReport>,
    pub failures: Vec<RootFailure>,
    pub summary: InventorySummary,
    /// Cancellation stopped the run before every root was finished.
    pub interrupted: bool,
}

impl Inventory {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its absolute path.
    pub fn get(&self, path: &Path) -> Option<&InventoryEntry> {
        self.entries.iter().find(|e| e.record.path == path)
    }

    /// Iterate over the bare records.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.entries.iter().map(|e| &e.record)
    }
}

/// Walks every configured root, then labels and cross-checks the records.
///
/// Roots are independent: one that fails is reported in
/// [`Inventory::failures`] and the others still run. Duplicate detection
/// happens once, over the records of all roots together.
pub struct InventoryCollector {
    config: InventoryConfig,
    walker: DirectoryWalker,
    analyzer: DuplicateAnalyzer,
    junk: Arc<dyn JunkClassifier>,
}

impl InventoryCollector {
    /// Create a collector. Fails if the configuration is invalid.
    pub fn new(config: InventoryConfig) -> Result<Self, ScanError> {
        config.validate()?;
        let walker = DirectoryWalker::new(&config);
        Ok(Self {
            config,
            walker,
            analyzer: DuplicateAnalyzer::new(),
            junk: Arc::new(HeuristicJunk::default()),
        })
    }

    /// Replace the per-entry error policy of the walker.
    pub fn with_error_policy(mut self, policy: Arc<dyn ErrorPolicy>) -> Self {
        self.walker = self.walker.with_error_policy(policy);
        self
    }

    /// Replace the junk labeler.
    pub fn with_junk_classifier(mut self, classifier: Arc<dyn JunkClassifier>) -> Self {
        self.junk = classifier;
        self
    }

    /// Subscribe to walk progress updates from every root.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.walker.subscribe()
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Run to completion.
    pub fn collect(&self) -> Inventory {
        self.collect_with_cancel(&CancellationToken::new())
    }

    /// Run until done or until `cancel` fires.
    ///
    /// A cancelled run still returns everything gathered so far, fully
    /// annotated, with [`Inventory::interrupted`] set.
    pub fn collect_with_cancel(&self, cancel: &CancellationToken) -> Inventory {
        let start = Instant::now();
        let roots = &self.config.roots;

        info!(roots = roots.len(), parallel = self.config.parallel_roots, "Collecting inventory");

        let results: Vec<Option<Result<RootScan, ScanError>>> = if self.config.parallel_roots {
            roots.par_iter().map(|root| self.walk_root(root, cancel)).collect()
        } else {
            roots.iter().map(|root| self.walk_root(root, cancel)).collect()
        };

        let mut records = Vec::new();
        let mut reports = Vec::new();
        let mut failures = Vec::new();
        let mut seen = HashSet::new();
        let mut repeated_paths = 0u64;
        let mut interrupted = false;

        for (root, result) in roots.iter().zip(results) {
            let scan = match result {
                Some(Ok(scan)) => scan,
                Some(Err(error)) => {
                    warn!(root = %root.display(), "Root failed: {error}");
                    failures.push(RootFailure { root: root.clone(), error });
                    continue;
                }
                None => {
                    interrupted = true;
                    continue;
                }
            };

            interrupted |= scan.interrupted;
            reports.push(RootReport {
                root: scan.root,
                files: scan.records.len(),
                hashes_computed: scan.hashes_computed,
                skipped: scan.skipped,
                warnings: scan.warnings,
                interrupted: scan.interrupted,
                duration: scan.duration,
            });

            // Overlapping roots see the same file twice; the first sighting wins.
            for record in scan.records {
                if seen.insert(record.path.clone()) {
                    records.push(record);
                } else {
                    repeated_paths += 1;
                }
            }
        }

        let duplicates = self.analyzer.annotate_in_place(&mut records);

        let entries: Vec<InventoryEntry> = records
            .into_iter()
            .map(|record| {
                let is_junk = self.junk.is_junk(&record);
                InventoryEntry { record, is_junk }
            })
            .collect();

        let summary = InventorySummary::from_parts(
            &entries,
            &duplicates,
            &reports,
            failures.len(),
            repeated_paths,
            start.elapsed(),
        );

        info!(
            files = summary.total_files,
            duplicates = summary.duplicate_files,
            junk = summary.junk_files,
            failed_roots = summary.failed_roots,
            interrupted,
            "Inventory complete"
        );

        Inventory {
            entries,
            duplicates,
            roots: reports,
            failures,
            summary,
            interrupted,
        }
    }

    /// `None` when cancellation was requested before the root started.
    fn walk_root(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Option<Result<RootScan, ScanError>> {
        if cancel.is_cancelled() {
            return None;
        }
        Some(self.walker.walk(root, cancel))
    }
}
