//! Hashing eligibility and per-root hashing budget.

use dustfile_core::{
    DEFAULT_HASH_LIMIT_PER_ROOT, DEFAULT_MAX_HASH_SIZE, DEFAULT_MIN_HASH_SIZE, InventoryConfig,
};

/// Decides whether a file gets a content digest.
///
/// Purely a function of the file size and how many digests the current
/// root has already produced. It never looks at paths or contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashPolicy {
    /// Exclusive lower size bound.
    pub min_size: u64,
    /// Exclusive upper size bound.
    pub max_size: u64,
    /// Digests allowed per root.
    pub limit_per_root: u64,
}

impl HashPolicy {
    pub fn new(min_size: u64, max_size: u64, limit_per_root: u64) -> Self {
        Self {
            min_size,
            max_size,
            limit_per_root,
        }
    }

    pub fn from_config(config: &InventoryConfig) -> Self {
        Self::new(
            config.min_hash_size,
            config.max_hash_size,
            config.hash_limit_per_root,
        )
    }

    /// Check if a file of this size falls strictly inside the size bounds.
    ///
    /// Empty files are never eligible, whatever the bounds.
    pub fn is_size_eligible(&self, size: u64) -> bool {
        size > 0 && self.min_size < size && size < self.max_size
    }

    /// Check if a file should be hashed given the root's running count.
    pub fn should_hash(&self, size: u64, hashes_used: u64) -> bool {
        hashes_used < self.limit_per_root && self.is_size_eligible(size)
    }
}

impl Default for HashPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MIN_HASH_SIZE,
            DEFAULT_MAX_HASH_SIZE,
            DEFAULT_HASH_LIMIT_PER_ROOT,
        )
    }
}

/// Running count of digests produced for one root.
///
/// Only successful digests count; a file that fails to hash leaves the
/// budget untouched. Owned by a single root walk, so no synchronization.
#[derive(Debug, Default)]
pub struct HashBudget {
    used: u64,
}

impl HashBudget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of digests produced so far.
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Record one successful digest.
    pub fn record(&mut self) {
        self.used += 1;
    }
}
