//! Duplicate marking from precomputed content digests.
//!
//! Works on the complete, in-memory record set of a run: records are grouped
//! by exact digest in a single hash-map pass, then flagged. File contents are
//! never read here, and records without a digest never take part.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use dustfile_core::{ContentHash, FileRecord};

/// A group of records sharing one digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content hash shared by all files in this group.
    pub hash: ContentHash,

    /// Size of each file in bytes.
    pub size: u64,

    /// Paths in scan order. The first one is the original.
    pub paths: Vec<PathBuf>,

    /// Bytes held by the redundant copies: size * (count - 1).
    pub wasted_bytes: u64,
}

impl DuplicateGroup {
    /// Get the number of duplicate files.
    pub fn count(&self) -> usize {
        self.paths.len()
    }

    /// Check if keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// The first-seen copy. `None` only for a hand-built empty group.
    pub fn original(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    /// Every copy after the first.
    pub fn redundant(&self) -> &[PathBuf] {
        self.paths.get(1..).unwrap_or_default()
    }
}

/// Results from duplicate analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Groups of duplicate files, sorted by wasted space descending.
    pub groups: Vec<DuplicateGroup>,

    /// Number of records that carried a digest.
    pub files_analyzed: u64,

    /// Number of records flagged `is_duplicate`.
    pub files_with_duplicates: u64,

    /// Number of records flagged `is_redundant_copy`.
    pub redundant_copies: u64,

    /// Total wasted space (could be reclaimed).
    pub total_wasted_space: u64,

    /// Number of duplicate groups.
    pub group_count: usize,
}

impl DuplicateReport {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Get total number of duplicate files across all groups.
    pub fn total_duplicate_files(&self) -> usize {
        self.groups.iter().map(|g| g.paths.len()).sum()
    }
}

/// Marks duplicate groups and redundant copies on a record set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateAnalyzer;

impl DuplicateAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Annotate an owned record set and hand it back.
    pub fn annotate(&self, mut records: Vec<FileRecord>) -> Vec<FileRecord> {
        self.annotate_in_place(&mut records);
        records
    }

    /// Set both duplicate flags on every record and report the groups.
    ///
    /// Slice order is scan order: the first record of each digest group is
    /// the original, every later one a redundant copy. Records without a
    /// digest end up with both flags `false`.
    pub fn annotate_in_place(&self, records: &mut [FileRecord]) -> DuplicateReport {
        let mut by_digest: HashMap<ContentHash, Vec<usize>> = HashMap::new();
        let mut files_analyzed = 0u64;

        for (idx, record) in records.iter_mut().enumerate() {
            record.is_duplicate = false;
            record.is_redundant_copy = false;
            if let Some(hash) = record.digest {
                files_analyzed += 1;
                by_digest.entry(hash).or_default().push(idx);
            }
        }

        let mut groups = Vec::new();
        let mut files_with_duplicates = 0u64;
        let mut redundant_copies = 0u64;

        for (hash, indices) in by_digest {
            if indices.len() < 2 {
                continue;
            }

            let mut paths = Vec::with_capacity(indices.len());
            let mut wasted_bytes = 0u64;
            for (pos, &idx) in indices.iter().enumerate() {
                let record = &mut records[idx];
                record.is_duplicate = true;
                record.is_redundant_copy = pos > 0;
                if pos > 0 {
                    wasted_bytes += record.size;
                }
                paths.push(record.path.clone());
            }

            files_with_duplicates += indices.len() as u64;
            redundant_copies += indices.len() as u64 - 1;
            groups.push(DuplicateGroup {
                hash,
                size: records[indices[0]].size,
                paths,
                wasted_bytes,
            });
        }

        // Sort by wasted space descending; path breaks ties so reports are stable.
        groups.sort_by(|a, b| {
            b.wasted_bytes
                .cmp(&a.wasted_bytes)
                .then_with(|| a.paths.first().cmp(&b.paths.first()))
        });

        let total_wasted_space = groups.iter().map(|g| g.wasted_bytes).sum();
        let group_count = groups.len();

        debug!(
            analyzed = files_analyzed,
            groups = group_count,
            redundant = redundant_copies,
            "Duplicate analysis complete"
        );

        DuplicateReport {
            groups,
            files_analyzed,
            files_with_duplicates,
            redundant_copies,
            total_wasted_space,
            group_count,
        }
    }
}
