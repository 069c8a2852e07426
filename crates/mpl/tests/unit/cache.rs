//! Tests for the JSON cache of behavioral data.

use std::fs::{self, File};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

use crate::common::behavioral_csv;
use mpl::data::{load_behavioral_csv, DataCache};

fn setup() -> (TempDir, DataCache) {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("bdata.csv");
    fs::write(&source, behavioral_csv(3, 20)).unwrap();
    let cache = DataCache::new(&source, dir.path().join("bdata.json"));
    (dir, cache)
}

#[test]
fn first_load_builds_cache() {
    let (_dir, cache) = setup();
    assert!(!cache.is_fresh());
    let data = cache.load().unwrap();
    assert_eq!(data.len(), 3);
    assert!(cache.cache_path().exists());
    assert!(cache.is_fresh());
}

#[test]
fn cached_load_matches_source() {
    let (_dir, cache) = setup();
    let first = cache.load().unwrap();
    let second = cache.load().unwrap();
    assert_eq!(first, second);
    assert_eq!(second, load_behavioral_csv(cache.source()).unwrap());
}

#[test]
fn fresh_cache_is_used_without_reparsing() {
    let (_dir, cache) = setup();
    cache.load().unwrap();
    // A fresh cache wins even if it no longer mirrors the source.
    fs::write(cache.cache_path(), r#"[{"id":"only","x":[1],"y":[0]}]"#).unwrap();
    let data = cache.load().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data.participants[0].id, "only");
}

#[test]
fn newer_source_rebuilds_cache() {
    let (_dir, cache) = setup();
    cache.load().unwrap();
    fs::write(cache.source(), behavioral_csv(5, 20)).unwrap();
    File::options()
        .write(true)
        .open(cache.source())
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();
    assert!(!cache.is_fresh());
    assert_eq!(cache.load().unwrap().len(), 5);
}

#[test]
fn corrupt_cache_is_rebuilt() {
    let (_dir, cache) = setup();
    cache.load().unwrap();
    fs::write(cache.cache_path(), "not json").unwrap();
    assert_eq!(cache.load().unwrap().len(), 3);
    assert!(fs::read_to_string(cache.cache_path()).unwrap().starts_with('['));
}

#[test]
fn invalidate_removes_cache() {
    let (_dir, cache) = setup();
    cache.load().unwrap();
    cache.invalidate().unwrap();
    assert!(!cache.cache_path().exists());
    // Invalidating twice is fine.
    cache.invalidate().unwrap();
    assert_eq!(cache.load().unwrap().len(), 3);
}

#[test]
fn beside_appends_suffix() {
    let cache = DataCache::beside("/data/bdata.csv");
    assert_eq!(cache.cache_path().to_str(), Some("/data/bdata.csv.cache.json"));
}
