//! Directory walking engine for dustfile.
//!
//! This crate walks directory roots with jwalk and turns every regular file
//! into a [`FileRecord`], hashing the ones the [`HashPolicy`] selects.
//!
//! # Overview
//!
//! - **Pruned traversal**: excluded directories are never read
//! - **Bounded hashing**: size bounds plus a per-root digest budget
//! - **Fault tolerance**: per-entry errors are skipped, classified by an
//!   injectable [`ErrorPolicy`]
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use dustfile_scan::{CancellationToken, DirectoryWalker, InventoryConfig};
//!
//! let config = InventoryConfig::new(["/path/to/scan"]);
//! let walker = DirectoryWalker::new(&config);
//! let scan = walker.walk(&config.roots[0], &CancellationToken::new()).unwrap();
//!
//! println!("{} files, {} hashed", scan.records.len(), scan.hashes_computed);
//! ```
//!
//! # Single files
//!
//! [`RecordBuilder::inspect`] evaluates one path without walking a tree.
//! Without the rest of the tree there is nothing to compare against, so the
//! duplicate flags of such a record are always `false`.

mod hasher;
mod policy;
mod progress;
mod record;
mod walker;

pub use hasher::{CHUNK_SIZE, hash_file, hash_reader, try_hash_file};
pub use policy::{HashBudget, HashPolicy};
pub use progress::ScanProgress;
pub use record::RecordBuilder;
pub use walker::{DirectoryWalker, RootScan};

pub use tokio_util::sync::CancellationToken;

// Re-export core types for convenience
pub use dustfile_core::{
    ContentHash, ErrorAction, ErrorPolicy, FileRecord, InventoryConfig, ScanError, ScanWarning,
    Timestamps, WarningKind,
};
