use dustfile_scan::{
    CancellationToken, DirectoryWalker, ErrorAction, ErrorPolicy, InventoryConfig, RecordBuilder,
    ScanError,
};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const KB: usize = 1024;

fn write_sized(path: &Path, size: usize, fill: u8) {
    fs::write(path, vec![fill; size]).unwrap();
}

fn config_for(root: &Path) -> InventoryConfig {
    InventoryConfig::new([root])
}

fn walk(config: &InventoryConfig, root: &Path) -> dustfile_scan::RootScan {
    DirectoryWalker::new(config)
        .walk(root, &CancellationToken::new())
        .unwrap()
}

#[test]
fn test_zero_byte_and_huge_files_are_not_hashed() {
    let temp = TempDir::new().unwrap();
    File::create(temp.path().join("empty.dat")).unwrap();
    // Sparse, so nothing is actually written.
    let huge = File::create(temp.path().join("huge.iso")).unwrap();
    huge.set_len(200 * 1024 * 1024).unwrap();

    let scan = walk(&config_for(temp.path()), temp.path());

    assert_eq!(scan.records.len(), 2);
    for record in &scan.records {
        assert!(record.digest.is_none(), "{} should not be hashed", record.path.display());
        assert!(!record.is_duplicate);
        assert!(!record.is_redundant_copy);
    }
    assert_eq!(scan.hashes_computed, 0);
}

#[test]
fn test_size_bounds_are_exclusive() {
    let temp = TempDir::new().unwrap();
    write_sized(&temp.path().join("at_min"), 100, 1);
    write_sized(&temp.path().join("inside"), 150, 2);
    write_sized(&temp.path().join("at_max"), 200, 3);

    let mut config = config_for(temp.path());
    config.min_hash_size = 100;
    config.max_hash_size = 200;

    let scan = walk(&config, temp.path());
    let hashed: Vec<_> = scan
        .records
        .iter()
        .filter(|r| r.digest.is_some())
        .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(hashed, vec!["inside".to_string()]);
}

#[test]
fn test_hash_budget_caps_digests_per_root() {
    let temp = TempDir::new().unwrap();
    for i in 0..5 {
        write_sized(&temp.path().join(format!("f{i}.bin")), 12 * KB, 0xaa);
    }

    let mut config = config_for(temp.path());
    config.hash_limit_per_root = 2;

    let scan = walk(&config, temp.path());

    assert_eq!(scan.records.len(), 5);
    assert_eq!(scan.hashes_computed, 2);
    assert_eq!(scan.records.iter().filter(|r| r.digest.is_some()).count(), 2);
    // The budget is spent on the first files in scan order.
    assert!(scan.records[0].digest.is_some());
    assert!(scan.records[1].digest.is_some());
    assert!(scan.records[2..].iter().all(|r| r.digest.is_none()));
}

#[test]
fn test_budget_resets_per_root() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    for i in 0..3 {
        write_sized(&first.path().join(format!("a{i}")), 12 * KB, i as u8);
        write_sized(&second.path().join(format!("b{i}")), 12 * KB, i as u8);
    }

    let mut config = InventoryConfig::new([first.path(), second.path()]);
    config.hash_limit_per_root = 2;
    let walker = DirectoryWalker::new(&config);
    let cancel = CancellationToken::new();

    let scan_a = walker.walk(first.path(), &cancel).unwrap();
    let scan_b = walker.walk(second.path(), &cancel).unwrap();

    assert_eq!(scan_a.hashes_computed, 2);
    assert_eq!(scan_b.hashes_computed, 2);
}

#[test]
fn test_nested_excluded_directories_are_pruned() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src/Package_Cache/inner/deeper")).unwrap();
    fs::create_dir_all(root.join("other/package_cache")).unwrap();

    for i in 0..100 {
        fs::write(root.join(format!("src/Package_Cache/f{i}.txt")), "cached").unwrap();
    }
    fs::write(root.join("src/Package_Cache/inner/deeper/x.txt"), "deep").unwrap();
    fs::write(root.join("other/package_cache/y.txt"), "cached").unwrap();
    fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
    fs::write(root.join("readme.md"), "# hi").unwrap();

    let mut config = config_for(root);
    config.exclude_patterns = vec!["package_cache".to_string()];

    let scan = walk(&config, root);

    assert_eq!(scan.records.len(), 2);
    assert!(scan.warnings.is_empty());
    assert!(
        scan.records
            .iter()
            .all(|r| !r.path.to_string_lossy().to_lowercase().contains("package_cache"))
    );
}

#[test]
fn test_excluded_root_yields_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("node_modules");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("index.js"), "module.exports = 1").unwrap();

    let mut config = config_for(&root);
    config.exclude_patterns = vec!["node_modules".to_string()];

    let scan = walk(&config, &root);
    assert!(scan.records.is_empty());
}

#[test]
fn test_records_carry_metadata() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("Logs")).unwrap();
    write_sized(&temp.path().join("Logs/App.LOG"), 20 * KB, b'l');

    let scan = walk(&config_for(temp.path()), temp.path());
    let record = &scan.records[0];
    let canonical = temp.path().canonicalize().unwrap().join("Logs/App.LOG");

    assert_eq!(record.path, canonical);
    assert_eq!(record.size, 20 * KB as u64);
    assert_eq!(record.extension.as_deref(), Some(".log"));
    assert_eq!(record.depth, dustfile_core::depth_of(&canonical));
    assert!(record.depth >= 1);
    assert_eq!(record.digest.unwrap().to_hex().len(), 64);
    assert!(record.timestamps.modified_secs() > 0.0);
}

#[test]
fn test_walk_matches_single_file_inspection() {
    let temp = TempDir::new().unwrap();
    write_sized(&temp.path().join("one.bin"), 16 * KB, 9);

    let config = config_for(temp.path());
    let walker = DirectoryWalker::new(&config);
    let scan = walker.walk(temp.path(), &CancellationToken::new()).unwrap();
    let inspected = RecordBuilder::default()
        .inspect(&temp.path().join("one.bin"))
        .unwrap();

    assert_eq!(scan.records[0].path, inspected.path);
    assert_eq!(scan.records[0].digest, inspected.digest);
    assert_eq!(scan.records[0].size, inspected.size);
}

#[cfg(unix)]
fn make_unreadable(dir: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o000)).unwrap();
    // Privileged users read through the mode bits.
    fs::read_dir(dir).is_err()
}

#[cfg(unix)]
fn restore(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_permission_denied_is_skipped_silently() {
    let temp = TempDir::new().unwrap();
    let locked = temp.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("secret.txt"), "s").unwrap();
    fs::write(temp.path().join("open.txt"), "o").unwrap();

    if !make_unreadable(&locked) {
        restore(&locked);
        return;
    }

    let scan = walk(&config_for(temp.path()), temp.path());
    restore(&locked);

    assert_eq!(scan.records.len(), 1);
    assert_eq!(scan.skipped, 1);
    assert!(scan.warnings.is_empty());
}

#[cfg(unix)]
#[test]
fn test_unreadable_root_is_an_error() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("sealed");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("inside.txt"), "i").unwrap();

    if !make_unreadable(&root) {
        restore(&root);
        return;
    }

    let result = DirectoryWalker::new(&config_for(&root)).walk(&root, &CancellationToken::new());
    restore(&root);

    assert!(matches!(result, Err(ScanError::PermissionDenied { .. })));
}

struct AbortOnAnything;

impl ErrorPolicy for AbortOnAnything {
    fn classify(&self, _error: &io::Error) -> ErrorAction {
        ErrorAction::Abort
    }
}

#[cfg(unix)]
#[test]
fn test_abort_policy_stops_the_root() {
    let temp = TempDir::new().unwrap();
    let locked = temp.path().join("locked");
    fs::create_dir(&locked).unwrap();

    if !make_unreadable(&locked) {
        restore(&locked);
        return;
    }

    let config = config_for(temp.path());
    let result = DirectoryWalker::new(&config)
        .with_error_policy(Arc::new(AbortOnAnything))
        .walk(temp.path(), &CancellationToken::new());
    restore(&locked);

    assert!(matches!(result, Err(ScanError::Aborted { .. })));
}

#[cfg(unix)]
#[test]
fn test_symlinks_produce_no_records() {
    let temp = TempDir::new().unwrap();
    write_sized(&temp.path().join("real.bin"), 12 * KB, 4);
    std::os::unix::fs::symlink(temp.path().join("real.bin"), temp.path().join("link.bin")).unwrap();

    let scan = walk(&config_for(temp.path()), temp.path());

    assert_eq!(scan.records.len(), 1);
    assert!(scan.records[0].path.ends_with("real.bin"));
}

#[test]
fn test_parallel_setting_keeps_order() {
    let temp = TempDir::new().unwrap();
    for d in ["a", "b", "c"] {
        fs::create_dir(temp.path().join(d)).unwrap();
        for i in 0..4 {
            fs::write(temp.path().join(d).join(format!("{i}.txt")), d).unwrap();
        }
    }

    let mut serial = config_for(temp.path());
    serial.threads = 1;
    let mut threaded = config_for(temp.path());
    threaded.threads = 4;

    let a = walk(&serial, temp.path());
    let b = walk(&threaded, temp.path());

    let paths_a: Vec<_> = a.records.iter().map(|r| r.path.clone()).collect();
    let paths_b: Vec<_> = b.records.iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths_a, paths_b);
}
