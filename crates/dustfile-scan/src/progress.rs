//! Walk progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Progress snapshot for the root currently being walked.
///
/// Advisory only: nothing in the walk depends on whether anyone receives it.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Root being walked.
    pub root: PathBuf,
    /// Files seen so far in this root, including ones later skipped.
    pub files_scanned: u64,
    /// Digests computed so far in this root.
    pub hashes_computed: u64,
    /// Total bytes of recorded files so far.
    pub bytes_scanned: u64,
    /// Last path processed.
    pub current_path: PathBuf,
    /// Number of entries skipped because of errors.
    pub errors_count: u64,
    /// Time elapsed since this root's walk started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate scan rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Per-root progress counters with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    root: PathBuf,
    start_time: Instant,
    files_scanned: u64,
    hashes_computed: u64,
    bytes_scanned: u64,
    errors_count: u64,
    current_path: PathBuf,
}

impl ProgressTracker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            start_time: Instant::now(),
            files_scanned: 0,
            hashes_computed: 0,
            bytes_scanned: 0,
            errors_count: 0,
            current_path: PathBuf::new(),
        }
    }

    /// Count a file entry. Returns the new running count.
    pub fn record_file_seen(&mut self) -> u64 {
        self.files_scanned += 1;
        self.files_scanned
    }

    pub fn record_file(&mut self, size: u64, hashed: bool) {
        self.bytes_scanned += size;
        if hashed {
            self.hashes_computed += 1;
        }
    }

    pub fn record_error(&mut self) {
        self.errors_count += 1;
    }

    pub fn set_current_path(&mut self, path: PathBuf) {
        self.current_path = path;
    }

    pub fn files_scanned(&self) -> u64 {
        self.files_scanned
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            root: self.root.clone(),
            files_scanned: self.files_scanned,
            hashes_computed: self.hashes_computed,
            bytes_scanned: self.bytes_scanned,
            current_path: self.current_path.clone(),
            errors_count: self.errors_count,
            elapsed: self.start_time.elapsed(),
        }
    }
}
