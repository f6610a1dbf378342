//! Building one record from one filesystem entry.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use dustfile_core::{FileRecord, ScanError, Timestamps};

use crate::hasher::hash_file;
use crate::policy::{HashBudget, HashPolicy};

/// Turns a path and its stat result into a [`FileRecord`].
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    policy: HashPolicy,
}

impl RecordBuilder {
    pub fn new(policy: HashPolicy) -> Self {
        Self { policy }
    }

    /// The hashing policy applied by this builder.
    pub fn policy(&self) -> &HashPolicy {
        &self.policy
    }

    /// Build a record from a resolved path and its metadata.
    ///
    /// Hashes the file when the policy allows it under the current budget;
    /// a successful digest is charged to `budget`. A digest that cannot be
    /// computed leaves the record without one.
    pub fn build(&self, path: PathBuf, metadata: &Metadata, budget: &mut HashBudget) -> FileRecord {
        let size = metadata.len();
        let timestamps = Timestamps::from_metadata(metadata);

        let digest = if self.policy.should_hash(size, budget.used()) {
            let digest = hash_file(&path);
            if digest.is_some() {
                budget.record();
            }
            digest
        } else {
            None
        };

        FileRecord::new(path, size, timestamps, digest)
    }

    /// Build a record for a single ad-hoc path, without a tree walk.
    ///
    /// The path is canonicalized and gets a fresh budget. There is no
    /// duplicate context in this mode, so both duplicate flags are always
    /// `false`.
    pub fn inspect(&self, path: &Path) -> Result<FileRecord, ScanError> {
        let resolved = path.canonicalize().map_err(|e| ScanError::io(path, e))?;
        let metadata = std::fs::metadata(&resolved).map_err(|e| ScanError::io(&resolved, e))?;

        if !metadata.is_file() {
            return Err(ScanError::NotAFile { path: resolved });
        }

        let mut budget = HashBudget::new();
        Ok(self.build(resolved, &metadata, &mut budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn small_policy() -> HashPolicy {
        HashPolicy::new(10, 1_000, 100)
    }

    #[test]
    fn test_build_hashes_eligible_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.TXT");
        fs::write(&path, vec![b'a'; 100]).unwrap();

        let builder = RecordBuilder::new(small_policy());
        let mut budget = HashBudget::new();
        let metadata = fs::metadata(&path).unwrap();
        let record = builder.build(path.clone(), &metadata, &mut budget);

        assert_eq!(record.size, 100);
        assert_eq!(record.extension.as_deref(), Some(".txt"));
        assert!(record.digest.is_some());
        assert_eq!(budget.used(), 1);
    }

    #[test]
    fn test_build_skips_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty");
        fs::write(&path, "").unwrap();

        let builder = RecordBuilder::new(HashPolicy::new(0, 1_000, 100));
        let mut budget = HashBudget::new();
        let metadata = fs::metadata(&path).unwrap();
        let record = builder.build(path, &metadata, &mut budget);

        assert!(record.digest.is_none());
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_build_respects_budget() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.bin");
        fs::write(&path, vec![7u8; 100]).unwrap();

        let builder = RecordBuilder::new(HashPolicy::new(10, 1_000, 1));
        let mut budget = HashBudget::new();
        let metadata = fs::metadata(&path).unwrap();

        let first = builder.build(path.clone(), &metadata, &mut budget);
        let second = builder.build(path, &metadata, &mut budget);

        assert!(first.digest.is_some());
        assert!(second.digest.is_none());
        assert_eq!(budget.used(), 1);
    }

    #[test]
    fn test_vanished_file_keeps_record_without_digest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gone.bin");
        fs::write(&path, vec![1u8; 100]).unwrap();
        let metadata = fs::metadata(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let builder = RecordBuilder::new(small_policy());
        let mut budget = HashBudget::new();
        let record = builder.build(path, &metadata, &mut budget);

        assert_eq!(record.size, 100);
        assert!(record.digest.is_none());
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_inspect_resolves_path() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("file.log"), vec![b'x'; 64]).unwrap();

        let builder = RecordBuilder::new(small_policy());
        let record = builder.inspect(&temp.path().join("sub/../file.log")).unwrap();

        assert_eq!(record.path, temp.path().canonicalize().unwrap().join("file.log"));
        assert!(record.digest.is_some());
        assert!(!record.is_duplicate);
        assert!(!record.is_redundant_copy);
    }

    #[test]
    fn test_inspect_rejects_directory() {
        let temp = TempDir::new().unwrap();
        let builder = RecordBuilder::default();
        let err = builder.inspect(temp.path()).unwrap_err();
        assert!(matches!(err, ScanError::NotAFile { .. }));
    }

    #[test]
    fn test_inspect_missing_path() {
        let temp = TempDir::new().unwrap();
        let builder = RecordBuilder::default();
        let err = builder.inspect(&temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }
}
