//! Per-file inventory records.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Sentinel exported in place of a missing extension.
pub const NO_EXTENSION: &str = "<none>";

/// BLAKE3 content hash for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a lower-case hex string (always 64 characters).
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// File metadata timestamps, read once at scan time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Last modification time.
    pub modified: SystemTime,
    /// Last access time. Falls back to `modified` where the platform has none.
    pub accessed: SystemTime,
}

impl Timestamps {
    pub fn new(modified: SystemTime, accessed: SystemTime) -> Self {
        Self { modified, accessed }
    }

    /// Read timestamps from a stat result.
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
        let accessed = metadata.accessed().unwrap_or(modified);
        Self { modified, accessed }
    }

    /// Modification time as seconds since the Unix epoch.
    pub fn modified_secs(&self) -> f64 {
        epoch_secs(self.modified)
    }

    /// Access time as seconds since the Unix epoch.
    pub fn accessed_secs(&self) -> f64 {
        epoch_secs(self.accessed)
    }
}

/// Seconds since the Unix epoch, negative for earlier times.
pub fn epoch_secs(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Human-readable UTC form of a timestamp, e.g. `2025-05-20 20:22:05.123456`.
pub fn format_timestamp(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

/// One inventory entry for a regular file.
///
/// Built once during the walk. Only the duplicate analysis pass touches it
/// afterwards, and only to set `is_duplicate` / `is_redundant_copy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Canonical absolute path.
    pub path: PathBuf,

    /// Size in bytes at scan time.
    pub size: u64,

    /// Modification and access times at scan time.
    pub timestamps: Timestamps,

    /// Lower-cased suffix including the leading dot.
    pub extension: Option<CompactString>,

    /// Number of normal components in `path`.
    pub depth: u32,

    /// Content digest, absent when not computed.
    pub digest: Option<ContentHash>,

    /// Another record in the same run shares this digest.
    pub is_duplicate: bool,

    /// Not the first record (in scan order) carrying this digest.
    pub is_redundant_copy: bool,
}

impl FileRecord {
    /// Create a record with both duplicate flags cleared.
    pub fn new(
        path: PathBuf,
        size: u64,
        timestamps: Timestamps,
        digest: Option<ContentHash>,
    ) -> Self {
        let extension = extension_of(&path);
        let depth = depth_of(&path);
        Self {
            path,
            size,
            timestamps,
            extension,
            depth,
            digest,
            is_duplicate: false,
            is_redundant_copy: false,
        }
    }

    /// Check if a digest was computed for this file.
    pub fn has_digest(&self) -> bool {
        self.digest.is_some()
    }

    /// Extension as exported, with the sentinel for "no extension".
    pub fn extension_label(&self) -> &str {
        self.extension.as_deref().unwrap_or(NO_EXTENSION)
    }

    /// Digest as a hex string, if present.
    pub fn digest_hex(&self) -> Option<String> {
        self.digest.map(|d| d.to_hex())
    }
}

/// Lower-cased last suffix of a path, including the dot.
///
/// Dotfiles without a further suffix and names ending in a bare dot have no
/// extension.
pub fn extension_of(path: &Path) -> Option<CompactString> {
    let ext = path.extension()?.to_string_lossy();
    if ext.is_empty() {
        return None;
    }
    let mut out = CompactString::with_capacity(ext.len() + 1);
    out.push('.');
    out.push_str(&ext.to_lowercase());
    Some(out)
}

/// Count of normal components, ignoring root and prefix components.
pub fn depth_of(path: &Path) -> u32 {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count() as u32
}
