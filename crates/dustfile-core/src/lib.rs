//! Core types for dustfile.
//!
//! This crate provides the data model shared by the scanning, analysis and
//! inventory crates: per-file records, run configuration and the error
//! taxonomy used during a walk.

mod config;
mod error;
mod record;

pub use config::{
    DEFAULT_HASH_LIMIT_PER_ROOT, DEFAULT_MAX_HASH_SIZE, DEFAULT_MIN_HASH_SIZE,
    DEFAULT_PROGRESS_INTERVAL, ExclusionSet, InventoryConfig, InventoryConfigBuilder,
};
pub use error::{DefaultErrorPolicy, ErrorAction, ErrorPolicy, ScanError, ScanWarning, WarningKind};
pub use record::{
    ContentHash, FileRecord, NO_EXTENSION, Timestamps, depth_of, epoch_secs, extension_of,
    format_timestamp,
};
