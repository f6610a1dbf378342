//! JWalk-based directory walker producing file records.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use jwalk::{Parallelism, WalkDir};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use dustfile_core::{
    DefaultErrorPolicy, ErrorAction, ErrorPolicy, ExclusionSet, FileRecord, InventoryConfig,
    ScanError, ScanWarning, WarningKind,
};

use crate::policy::{HashBudget, HashPolicy};
use crate::progress::{ProgressTracker, ScanProgress};
use crate::record::RecordBuilder;

/// Everything one root's walk produced.
#[derive(Debug)]
pub struct RootScan {
    /// Canonical root path.
    pub root: PathBuf,
    /// Records in scan order.
    pub records: Vec<FileRecord>,
    /// Reported (non-suppressed) per-entry problems.
    pub warnings: Vec<ScanWarning>,
    /// Entries skipped because of errors, suppressed ones included.
    pub skipped: u64,
    /// Digests computed in this root.
    pub hashes_computed: u64,
    /// The walk stopped early on a cancellation request.
    pub interrupted: bool,
    /// Wall time of the walk.
    pub duration: Duration,
}

impl RootScan {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            records: Vec::new(),
            warnings: Vec::new(),
            skipped: 0,
            hashes_computed: 0,
            interrupted: false,
            duration: Duration::ZERO,
        }
    }
}

/// Walks one root at a time, depth-first, emitting a record per regular file.
///
/// Directories whose full path matches an exclusion pattern are pruned
/// before they are read. With `sort_entries` set, siblings are visited in
/// file-name order; otherwise in whatever order the filesystem returns them,
/// which then decides which copy of a duplicate counts as the original.
pub struct DirectoryWalker {
    builder: RecordBuilder,
    exclusions: ExclusionSet,
    progress_interval: u64,
    threads: usize,
    sort_entries: bool,
    error_policy: Arc<dyn ErrorPolicy>,
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl DirectoryWalker {
    /// Create a walker for the given configuration.
    pub fn new(config: &InventoryConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        // Roots walked concurrently already occupy the global rayon pool.
        let threads = if config.parallel_roots && config.threads == 0 {
            1
        } else {
            config.threads
        };

        Self {
            builder: RecordBuilder::new(HashPolicy::from_config(config)),
            exclusions: config.exclusions(),
            progress_interval: config.progress_interval.max(1),
            threads,
            sort_entries: config.sort_entries,
            error_policy: Arc::new(DefaultErrorPolicy),
            progress_tx,
        }
    }

    /// Replace the per-entry error policy.
    pub fn with_error_policy(mut self, policy: Arc<dyn ErrorPolicy>) -> Self {
        self.error_policy = policy;
        self
    }

    /// Subscribe to walk progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// The record builder used for every file.
    pub fn builder(&self) -> &RecordBuilder {
        &self.builder
    }

    /// Walk a single root.
    ///
    /// Fails only for problems with the root itself, or when the error
    /// policy asks to abort. Per-entry problems are skipped and counted.
    pub fn walk(&self, root: &Path, cancel: &CancellationToken) -> Result<RootScan, ScanError> {
        let start = Instant::now();
        let root_path = root.canonicalize().map_err(|e| ScanError::io(root, e))?;

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let mut scan = RootScan::new(root_path.clone());

        if self.exclusions.matches(&root_path) {
            info!(root = %root_path.display(), "Root matches an exclusion pattern, skipping");
            return Ok(scan);
        }

        info!(root = %root_path.display(), "Scanning");

        let mut tracker = ProgressTracker::new(root_path.clone());
        let mut budget = HashBudget::new();

        for entry_result in self.walk_dir(&root_path) {
            if cancel.is_cancelled() {
                warn!(root = %root_path.display(), "Scan cancelled");
                scan.interrupted = true;
                break;
            }

            let mut entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root_path.clone());
                    tracker.record_error();
                    self.handle_entry_error(&mut scan, path, err.io_error(), err.to_string(), WarningKind::ReadError)?;
                    continue;
                }
            };

            // jwalk reports a failed directory read on the directory's own entry.
            if let Some(err) = entry.read_children_error.take() {
                let message = err.to_string();
                if entry.depth == 0 {
                    return Err(root_read_error(&root_path, err.into_io_error(), message));
                }
                tracker.record_error();
                let io_error = err.into_io_error();
                self.handle_entry_error(&mut scan, entry.path(), io_error.as_ref(), message, WarningKind::ReadError)?;
            }

            // Symlinks are not followed and produce no record.
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let seen = tracker.record_file_seen();

            match entry.metadata() {
                Ok(metadata) => {
                    let record = self.builder.build(path.clone(), &metadata, &mut budget);
                    tracker.record_file(record.size, record.has_digest());
                    scan.records.push(record);
                }
                Err(err) => {
                    tracker.record_error();
                    self.handle_entry_error(&mut scan, path.clone(), err.io_error(), err.to_string(), WarningKind::MetadataError)?;
                }
            }

            tracker.set_current_path(path);
            if seen % self.progress_interval == 0 {
                debug!(root = %root_path.display(), files = seen, "Processed files");
                // No receivers is fine; progress is advisory.
                let _ = self.progress_tx.send(tracker.snapshot());
            }
        }

        scan.hashes_computed = budget.used();
        scan.duration = start.elapsed();

        info!(
            root = %root_path.display(),
            files = tracker.files_scanned(),
            records = scan.records.len(),
            hashed = scan.hashes_computed,
            skipped = scan.skipped,
            elapsed_ms = scan.duration.as_millis() as u64,
            "Finished scanning"
        );

        Ok(scan)
    }

    /// Configure jwalk for one root, with exclusion pruning.
    fn walk_dir(&self, root_path: &Path) -> WalkDir {
        let parallelism = match self.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            1 => Parallelism::Serial,
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(root_path)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(false)
            .sort(self.sort_entries)
            .min_depth(0);

        if self.exclusions.is_empty() {
            return walker;
        }

        let exclusions = self.exclusions.clone();
        walker.process_read_dir(move |_depth, _path, _state, children| {
            for child in children.iter_mut().flatten() {
                if child.file_type().is_dir() && exclusions.matches(&child.path()) {
                    trace!(path = %child.path().display(), "Pruning excluded directory");
                    child.read_children_path = None;
                }
            }
        })
    }

    /// Classify a per-entry error and record it on the scan.
    fn handle_entry_error(
        &self,
        scan: &mut RootScan,
        path: PathBuf,
        io_error: Option<&io::Error>,
        message: String,
        kind: WarningKind,
    ) -> Result<(), ScanError> {
        let action = io_error.map_or(ErrorAction::Log, |e| self.error_policy.classify(e));
        scan.skipped += 1;

        match action {
            ErrorAction::Suppress => {
                trace!(path = %path.display(), "Skipping inaccessible entry");
            }
            ErrorAction::Log => {
                warn!(path = %path.display(), "{message}");
                let warning = match io_error {
                    Some(e) => ScanWarning::from_io(path, e, kind),
                    None => ScanWarning::new(path, message, kind),
                };
                scan.warnings.push(warning);
            }
            ErrorAction::Abort => {
                warn!(path = %path.display(), "Aborting root walk: {message}");
                return Err(ScanError::Aborted { path, message });
            }
        }
        Ok(())
    }
}

/// The root directory itself could not be read. Never subject to the error
/// policy: the caller must learn that the root produced nothing.
fn root_read_error(root: &Path, io_error: Option<io::Error>, message: String) -> ScanError {
    warn!(root = %root.display(), "Cannot read root: {message}");
    match io_error {
        Some(e) => ScanError::io(root, e),
        None => ScanError::Io {
            path: root.to_path_buf(),
            source: io::Error::other(message),
        },
    }
}
