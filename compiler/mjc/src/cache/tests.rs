use std::time::{Duration, SystemTime};

use mj_ir::{SourceInput, SourceRegistry};
use pretty_assertions::assert_eq;

use super::*;

fn stamp(modified: u64, checksum: u64) -> ModuleStamp {
    ModuleStamp {
        path: PathBuf::from("main.mj"),
        modified: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(modified)),
        checksum,
        dependencies: vec![PathBuf::from("util.mj")],
    }
}

#[test]
fn missing_entry_rebuilds() {
    let policy = CachePolicy::default();
    assert!(policy.needs_rebuild(&stamp(10, 1), None));
}

#[test]
fn unchanged_is_reused() {
    for invalidation in [InvalidationPolicy::Timestamp, InvalidationPolicy::Checksum] {
        let policy = CachePolicy::new(invalidation);
        assert!(!policy.needs_rebuild(&stamp(10, 1), Some(&stamp(10, 1))));
    }
}

#[test]
fn newer_source_rebuilds() {
    let policy = CachePolicy::new(InvalidationPolicy::Timestamp);
    assert!(policy.needs_rebuild(&stamp(11, 1), Some(&stamp(10, 1))));
    assert!(!policy.needs_rebuild(&stamp(9, 1), Some(&stamp(10, 1))));
}

#[test]
fn checksum_policy_sees_content_changes() {
    let current = stamp(10, 2);
    let cached = stamp(10, 1);
    assert!(!CachePolicy::new(InvalidationPolicy::Timestamp).needs_rebuild(&current, Some(&cached)));
    assert!(CachePolicy::new(InvalidationPolicy::Checksum).needs_rebuild(&current, Some(&cached)));
}

#[test]
fn dependency_changes_rebuild() {
    let mut current = stamp(10, 1);
    current.dependencies.push(PathBuf::from("extra.mj"));
    assert!(CachePolicy::default().needs_rebuild(&current, Some(&stamp(10, 1))));
}

#[test]
fn unknown_time_rebuilds() {
    let mut current = stamp(10, 1);
    current.modified = None;
    let policy = CachePolicy::new(InvalidationPolicy::Timestamp);
    assert!(policy.needs_rebuild(&current, Some(&stamp(10, 1))));
}

#[test]
fn stamp_of_source() {
    let registry = SourceRegistry::new();
    let when = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
    let id = registry
        .add_source_file(SourceInput::new("a.mj", "func a()").with_modified(when))
        .unwrap_or_else(|e| panic!("{e}"));
    let file = registry.source(id);
    let stamp = ModuleStamp::of(&file, Vec::new());
    assert_eq!(stamp.path, PathBuf::from("a.mj"));
    assert_eq!(stamp.modified, Some(when));
    assert_eq!(stamp.checksum, file.checksum());
}
