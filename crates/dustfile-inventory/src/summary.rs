//! Run totals.

use std::fmt;
use std::time::Duration;

use humansize::{BINARY, format_size};
use serde::Serialize;

use dustfile_analyze::DuplicateReport;

use crate::collector::{InventoryEntry, RootReport};

/// Counters describing one inventory run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventorySummary {
    pub total_files: u64,
    pub total_bytes: u64,
    pub junk_files: u64,
    pub duplicate_files: u64,
    pub redundant_copies: u64,
    pub duplicate_groups: u64,
    /// Bytes held by redundant copies.
    pub reclaimable_bytes: u64,
    pub files_without_digest: u64,
    /// Entries skipped because of errors, suppressed ones included.
    pub skipped_entries: u64,
    pub warnings: u64,
    pub roots_scanned: u64,
    pub failed_roots: u64,
    /// Records dropped because an earlier root already produced the path.
    pub repeated_paths: u64,
    pub duration: Duration,
}

impl InventorySummary {
    pub(crate) fn from_parts(
        entries: &[InventoryEntry],
        duplicates: &DuplicateReport,
        roots: &[RootReport],
        failed_roots: usize,
        repeated_paths: u64,
        duration: Duration,
    ) -> Self {
        let mut summary = Self {
            duplicate_files: duplicates.files_with_duplicates,
            redundant_copies: duplicates.redundant_copies,
            duplicate_groups: duplicates.group_count as u64,
            reclaimable_bytes: duplicates.total_wasted_space,
            roots_scanned: roots.len() as u64,
            failed_roots: failed_roots as u64,
            repeated_paths,
            duration,
            ..Self::default()
        };

        for entry in entries {
            summary.total_files += 1;
            summary.total_bytes += entry.record.size;
            summary.junk_files += entry.is_junk as u64;
            summary.files_without_digest += !entry.record.has_digest() as u64;
        }

        for root in roots {
            summary.skipped_entries += root.skipped;
            summary.warnings += root.warnings.len() as u64;
        }

        summary
    }
}

impl fmt::Display for InventorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Files:        {} ({})",
            self.total_files,
            format_size(self.total_bytes, BINARY)
        )?;
        writeln!(f, "Junk:         {}", self.junk_files)?;
        writeln!(
            f,
            "Duplicates:   {} in {} groups, {} redundant ({} reclaimable)",
            self.duplicate_files,
            self.duplicate_groups,
            self.redundant_copies,
            format_size(self.reclaimable_bytes, BINARY)
        )?;
        writeln!(f, "Not hashed:   {}", self.files_without_digest)?;
        writeln!(
            f,
            "Roots:        {} scanned, {} failed",
            self.roots_scanned, self.failed_roots
        )?;
        if self.repeated_paths > 0 {
            writeln!(f, "Overlap:      {} paths seen twice", self.repeated_paths)?;
        }
        writeln!(
            f,
            "Skipped:      {} entries, {} warnings",
            self.skipped_entries, self.warnings
        )?;
        write!(f, "Elapsed:      {:.2?}", self.duration)
    }
}
