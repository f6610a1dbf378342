//! Inventory configuration.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Files at or below this size are not hashed.
pub const DEFAULT_MIN_HASH_SIZE: u64 = 10_000;
/// Files at or above this size are not hashed (50 MiB).
pub const DEFAULT_MAX_HASH_SIZE: u64 = 50 * 1024 * 1024;
/// Digests computed per root before hashing stops for that root.
pub const DEFAULT_HASH_LIMIT_PER_ROOT: u64 = 10_000;
/// Files between two progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 50;

/// Configuration for an inventory run.
///
/// Passed by value to the collector; nothing here is global.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct InventoryConfig {
    /// Roots to walk, in order.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Case-insensitive substrings; directories whose full path contains
    /// one are not descended into.
    #[builder(default)]
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Exclusive lower size bound for hashing.
    #[builder(default = "DEFAULT_MIN_HASH_SIZE")]
    #[serde(default = "default_min_hash_size")]
    pub min_hash_size: u64,

    /// Exclusive upper size bound for hashing.
    #[builder(default = "DEFAULT_MAX_HASH_SIZE")]
    #[serde(default = "default_max_hash_size")]
    pub max_hash_size: u64,

    /// Maximum digests computed per root.
    #[builder(default = "DEFAULT_HASH_LIMIT_PER_ROOT")]
    #[serde(default = "default_hash_limit")]
    pub hash_limit_per_root: u64,

    /// Emit a progress notification every this many files.
    #[builder(default = "DEFAULT_PROGRESS_INTERVAL")]
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Directory-reading threads per root (0 = auto-detect, 1 = serial).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Visit siblings in file-name order. When off, sibling order (and so
    /// which copy counts as the original) follows the filesystem.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub sort_entries: bool,

    /// Walk roots concurrently. Output order is unaffected.
    #[builder(default = "false")]
    #[serde(default)]
    pub parallel_roots: bool,
}

fn default_true() -> bool {
    true
}

fn default_min_hash_size() -> u64 {
    DEFAULT_MIN_HASH_SIZE
}

fn default_max_hash_size() -> u64 {
    DEFAULT_MAX_HASH_SIZE
}

fn default_hash_limit() -> u64 {
    DEFAULT_HASH_LIMIT_PER_ROOT
}

fn default_progress_interval() -> u64 {
    DEFAULT_PROGRESS_INTERVAL
}

impl InventoryConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.roots {
            Some(ref roots) if !roots.is_empty() => {
                if roots.iter().any(|r| r.as_os_str().is_empty()) {
                    return Err("Root path cannot be empty".to_string());
                }
            }
            _ => return Err("At least one root is required".to_string()),
        }
        check_values(
            self.min_hash_size.unwrap_or(DEFAULT_MIN_HASH_SIZE),
            self.max_hash_size.unwrap_or(DEFAULT_MAX_HASH_SIZE),
            self.progress_interval.unwrap_or(DEFAULT_PROGRESS_INTERVAL),
        )
    }
}

fn check_values(min_hash_size: u64, max_hash_size: u64, progress_interval: u64) -> Result<(), String> {
    if min_hash_size >= max_hash_size {
        return Err(format!(
            "min_hash_size ({min_hash_size}) must be below max_hash_size ({max_hash_size})"
        ));
    }
    if progress_interval == 0 {
        return Err("progress_interval must be at least 1".to_string());
    }
    Ok(())
}

impl InventoryConfig {
    /// Create a new config builder.
    pub fn builder() -> InventoryConfigBuilder {
        InventoryConfigBuilder::default()
    }

    /// Create a config with default settings for the given roots.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            exclude_patterns: Vec::new(),
            min_hash_size: DEFAULT_MIN_HASH_SIZE,
            max_hash_size: DEFAULT_MAX_HASH_SIZE,
            hash_limit_per_root: DEFAULT_HASH_LIMIT_PER_ROOT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            threads: 0,
            sort_entries: true,
            parallel_roots: false,
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ScanError> {
        let config: Self = toml::from_str(s).map_err(|e| ScanError::InvalidConfig {
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ScanError> {
        let text = std::fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Check the settings a run depends on.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.roots.is_empty() {
            return Err(ScanError::InvalidConfig {
                message: "At least one root is required".to_string(),
            });
        }
        check_values(self.min_hash_size, self.max_hash_size, self.progress_interval)
            .map_err(|message| ScanError::InvalidConfig { message })
    }

    /// Matcher for the exclusion patterns.
    pub fn exclusions(&self) -> ExclusionSet {
        ExclusionSet::new(&self.exclude_patterns)
    }

    /// Check if a directory path matches an exclusion pattern.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclusions().matches(path)
    }
}

/// Case-insensitive substring matcher over full paths.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<String>,
}

impl ExclusionSet {
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .filter(|p| !p.is_empty())
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check if any pattern occurs in the path.
    pub fn matches(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let lowered = path.to_string_lossy().to_lowercase();
        self.patterns.iter().any(|p| lowered.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = InventoryConfig::builder()
            .roots(vec![PathBuf::from("/home/user")])
            .hash_limit_per_root(5u64)
            .parallel_roots(true)
            .build()
            .unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("/home/user")]);
        assert_eq!(config.hash_limit_per_root, 5);
        assert_eq!(config.min_hash_size, DEFAULT_MIN_HASH_SIZE);
        assert!(config.parallel_roots);
        assert!(config.sort_entries);
    }

    #[test]
    fn test_builder_requires_root() {
        assert!(InventoryConfig::builder().build().is_err());
        assert!(InventoryConfig::builder().roots(Vec::<PathBuf>::new()).build().is_err());
    }

    #[test]
    fn test_builder_rejects_inverted_bounds() {
        let result = InventoryConfig::builder()
            .roots(vec![PathBuf::from("/x")])
            .min_hash_size(100u64)
            .max_hash_size(100u64)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = InventoryConfig::from_toml_str(
            r#"
            roots = ["/srv/data", "/home/me"]
            exclude_patterns = ["node_modules"]
            hash_limit_per_root = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.roots.len(), 2);
        assert_eq!(config.hash_limit_per_root, 3);
        assert_eq!(config.max_hash_size, DEFAULT_MAX_HASH_SIZE);
        assert!(config.sort_entries);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        let err = InventoryConfig::from_toml_str("roots = 7").unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig { .. }));
    }

    #[test]
    fn test_exclusion_is_case_insensitive_substring() {
        let mut config = InventoryConfig::new(["/x"]);
        config.exclude_patterns = vec!["/Packages".to_string(), "node_modules".to_string()];

        assert!(config.is_excluded(Path::new("/x/AppData/packages/foo")));
        assert!(config.is_excluded(Path::new("/x/web/NODE_MODULES")));
        assert!(!config.is_excluded(Path::new("/x/src")));
    }

    #[test]
    fn test_empty_pattern_matches_nothing() {
        let set = ExclusionSet::new(&[String::new()]);
        assert!(set.is_empty());
        assert!(!set.matches(Path::new("/anything")));
    }
}
