use chrono::{Duration, Utc};
use ctcache::cache::index::{self, index_path};
use ctcache::{
    CacheWarning, Digest, Entries, Entry, FsCache, Pruner, RecordingDiagnostics, ENTRIES_FILE,
};
use filetime::FileTime;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn digest(hex: &str) -> Digest {
    Digest::from_hex(hex).unwrap()
}

fn load_index(root: &Path) -> Entries {
    index::load(&index_path(root), &RecordingDiagnostics::new())
}

fn entry_files(root: &Path) -> Vec<String> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name != ENTRIES_FILE)
        .collect()
}

#[test]
fn find_unknown_digest_is_absent() {
    let temp = tempdir().unwrap();
    let cache = FsCache::new(temp.path());
    for hex in ["ab01cd", "000000", "ffffffffffffffff"] {
        assert_eq!(cache.find(&digest(hex)).unwrap(), None);
    }
}

#[test]
fn save_then_find_round_trips() {
    let temp = tempdir().unwrap();
    let cache = FsCache::new(temp.path());

    let content = b"main.cpp:3:1: warning: unused variable 'x'\n".to_vec();
    cache.save(&digest("3f2a9c01"), &content).unwrap();
    assert_eq!(cache.find(&digest("3f2a9c01")).unwrap(), Some(content));
}

#[test]
fn binary_content_survives_migration() {
    let temp = tempdir().unwrap();
    let cache = FsCache::new(temp.path());
    let content = vec![0u8, 159, 146, 150, 255];

    cache.save(&digest("ab01cd"), &content).unwrap();
    Pruner::for_cache(&cache).prune(1).unwrap();

    assert_eq!(cache.find(&digest("ab01cd")).unwrap(), Some(content));
}

#[test]
fn sharded_hit_is_copied_into_index() {
    let temp = tempdir().unwrap();
    let cache = FsCache::new(temp.path());
    cache.save(&digest("ab01cd"), b"hello").unwrap();
    assert!(!index_path(temp.path()).exists());

    assert_eq!(
        cache.find(&digest("ab01cd")).unwrap(),
        Some(b"hello".to_vec())
    );

    let entries = load_index(temp.path());
    assert_eq!(entries["ab01cd"].content, b"hello");
}

#[test]
fn prune_moves_everything_into_index_and_is_idempotent() {
    let temp = tempdir().unwrap();
    let cache = FsCache::new(temp.path());
    for (hex, body) in [("ab01cd", "a"), ("ab01ce", "b"), ("cd0102ff", "c")] {
        cache.save(&digest(hex), body.as_bytes()).unwrap();
    }

    let now = Utc::now();
    let pruner = Pruner::for_cache(&cache);
    let first = pruner.prune_at(1, now).unwrap();
    assert_eq!(first.migrated, 3);
    assert!(entry_files(temp.path()).is_empty());
    assert_eq!(load_index(temp.path()).len(), 3);

    let index_before = fs::read(index_path(temp.path())).unwrap();
    let second = pruner.prune_at(1, now).unwrap();
    assert_eq!(second.migrated, 0);
    assert_eq!(second.removed, 0);
    assert_eq!(second.scanned, 3);
    assert_eq!(fs::read(index_path(temp.path())).unwrap(), index_before);
}

#[test]
fn loose_file_mtime_becomes_last_used() {
    let temp = tempdir().unwrap();
    let cache = FsCache::new(temp.path());
    cache.save(&digest("ab01cd"), b"old").unwrap();
    cache.save(&digest("ab01ce"), b"fresh").unwrap();

    let ten_days_ago = Utc::now() - Duration::days(10);
    let old_file = temp.path().join("ab").join("01").join("cd");
    filetime::set_file_mtime(
        &old_file,
        FileTime::from_unix_time(ten_days_ago.timestamp(), 0),
    )
    .unwrap();

    let report = Pruner::for_cache(&cache).prune(1).unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.removed, 1);

    let entries = load_index(temp.path());
    assert!(!entries.contains_key("ab01cd"));
    assert_eq!(entries["ab01ce"].content, b"fresh");
}

#[test]
fn retention_boundary_is_inclusive() {
    let temp = tempdir().unwrap();
    let now = Utc::now();

    let mut entries = Entries::new();
    entries.insert("aa0001".into(), Entry::new("exact", now - Duration::weeks(3)));
    entries.insert(
        "aa0002".into(),
        Entry::new("older", now - Duration::weeks(3) - Duration::milliseconds(1)),
    );
    index::save(&index_path(temp.path()), &entries).unwrap();

    let report = Pruner::new(temp.path()).prune_at(3, now).unwrap();
    assert_eq!(report.removed, 1);

    let entries = load_index(temp.path());
    assert!(entries.contains_key("aa0001"));
    assert!(!entries.contains_key("aa0002"));
}

#[test]
fn digests_sharing_tail_do_not_collide() {
    let temp = tempdir().unwrap();
    let cache = FsCache::new(temp.path());
    cache.save(&digest("aa0102"), b"first").unwrap();
    cache.save(&digest("bb0102"), b"second").unwrap();

    assert!(temp.path().join("aa/01/02").is_file());
    assert!(temp.path().join("bb/01/02").is_file());
    assert_eq!(cache.find(&digest("aa0102")).unwrap(), Some(b"first".to_vec()));
    assert_eq!(cache.find(&digest("bb0102")).unwrap(), Some(b"second".to_vec()));
}

#[test]
fn stale_entry_is_evicted_with_zero_week_window() {
    let temp = tempdir().unwrap();
    let cache = FsCache::new(temp.path());
    let d = digest("ab01cd");

    cache.save(&d, b"hello").unwrap();
    assert_eq!(cache.find(&d).unwrap(), Some(b"hello".to_vec()));

    // Backdate the entry's last use to ten days ago.
    let path = index_path(temp.path());
    let mut entries = load_index(temp.path());
    entries.get_mut("ab01cd").unwrap().last_used = Utc::now() - Duration::days(10);
    index::save(&path, &entries).unwrap();

    let report = Pruner::for_cache(&cache).prune(0).unwrap();
    assert_eq!(report.removed, 1);
    assert_eq!(cache.find(&d).unwrap(), None);
}

#[test]
fn invalid_index_loads_empty_with_warning() {
    let temp = tempdir().unwrap();
    let path = index_path(temp.path());
    fs::write(&path, r#"{"ab01cd": {"content": 42}}"#).unwrap();

    let sink = RecordingDiagnostics::new();
    let entries = index::load(&path, &sink);
    assert!(entries.is_empty());
    assert!(matches!(
        sink.warnings().as_slice(),
        [CacheWarning::IndexCorrupt { .. }]
    ));
}

#[test]
fn index_written_by_other_tools_is_accepted() {
    let temp = tempdir().unwrap();
    fs::write(
        index_path(temp.path()),
        r#"{
  "ab01cd": {
    "content": "warning: shadowed variable\n",
    "last_used": "2024-02-29T08:15:00.5+01:00"
  },
  "ab01ce": {
    "last_used": "2024-02-29T08:15:00Z"
  }
}"#,
    )
    .unwrap();

    let sink = Arc::new(RecordingDiagnostics::new());
    let cache = FsCache::new(temp.path()).with_diagnostics(sink.clone());
    assert_eq!(
        cache.find(&digest("ab01cd")).unwrap(),
        Some(b"warning: shadowed variable\n".to_vec())
    );
    assert_eq!(cache.find(&digest("ab01ce")).unwrap(), Some(Vec::new()));
    assert!(sink.warnings().is_empty());
}

/// Index mutations are not atomic across operations: a lookup that loaded the
/// index before a prune rewrote it will write back its own stale copy. This
/// replays that interleaving by hand to pin down the accepted behavior.
#[test]
fn concurrent_refresh_can_resurrect_pruned_entries() {
    let temp = tempdir().unwrap();
    let path = index_path(temp.path());
    let now = Utc::now();

    let mut entries = Entries::new();
    entries.insert("aa0001".into(), Entry::new("stale", now - Duration::weeks(10)));
    entries.insert("aa0002".into(), Entry::new("live", now));
    index::save(&path, &entries).unwrap();

    // A reader loads the index...
    let mut reader_view = load_index(temp.path());

    // ...a prune evicts the stale entry...
    Pruner::new(temp.path()).prune_at(1, now).unwrap();
    assert!(!load_index(temp.path()).contains_key("aa0001"));

    // ...and the reader's refresh rewrites the whole index from its old view.
    reader_view.get_mut("aa0002").unwrap().last_used = now;
    index::save(&path, &reader_view).unwrap();

    assert!(load_index(temp.path()).contains_key("aa0001"));
}

#[test]
fn short_digests_are_rejected() {
    let temp = tempdir().unwrap();
    let cache = FsCache::new(temp.path());
    assert!(cache.save(&digest("ab01"), b"x").is_err());
    assert!(cache.find(&digest("ab01")).is_err());
}
