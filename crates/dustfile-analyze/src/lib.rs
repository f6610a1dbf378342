//! Analysis passes over dustfile record sets.
//!
//! - **Duplicate marking**: flags duplicate groups and redundant copies
//!   from the digests computed during the walk
//! - **Junk labeling**: a replaceable predicate producing the dataset label
//!
//! # Duplicate marking
//!
//! Only records carrying a digest take part. The first record of each digest
//! group (in scan order) is the original; the rest are redundant copies.
//!
//! ```rust,ignore
//! use dustfile_analyze::DuplicateAnalyzer;
//! use dustfile_scan::{CancellationToken, DirectoryWalker, InventoryConfig};
//!
//! let config = InventoryConfig::new(["/path/to/scan"]);
//! let scan = DirectoryWalker::new(&config)
//!     .walk(&config.roots[0], &CancellationToken::new())
//!     .unwrap();
//!
//! let mut records = scan.records;
//! let report = DuplicateAnalyzer::new().annotate_in_place(&mut records);
//!
//! println!("Found {} duplicate groups", report.group_count);
//! println!("Wasted space: {} bytes", report.total_wasted_space);
//! ```

mod duplicates;
mod junk;

pub use duplicates::{DuplicateAnalyzer, DuplicateGroup, DuplicateReport};
pub use junk::{HeuristicJunk, HeuristicJunkBuilder, JunkClassifier};

// Re-export core types
pub use dustfile_core::{ContentHash, FileRecord};
