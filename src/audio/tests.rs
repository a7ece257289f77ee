use std::fs;

use super::mirror::Mirror;
use super::sink::probe;
use crate::library::TrackId;
use crate::queue::DeviceError;

#[test]
fn mirror_confirms_its_own_load() {
    let mut mirror = Mirror::default();
    let a = TrackId::next();
    mirror.load(a);
    assert!(mirror.confirm_started(a));
    assert_eq!(mirror.now_playing(), Some(a));
}

#[test]
fn mirror_ignores_start_of_superseded_load() {
    let mut mirror = Mirror::default();
    let (a, b) = (TrackId::next(), TrackId::next());
    mirror.load(a);
    mirror.load(b);

    assert!(mirror.confirm_started(a));
    assert!(mirror.confirm_started(b));
}

#[test]
fn mirror_ignores_auto_advance_while_load_is_on_its_way() {
    let mut mirror = Mirror::default();
    let (a, b, c) = (TrackId::next(), TrackId::next(), TrackId::next());
    mirror.load(a);
    mirror.append(b);
    assert!(mirror.confirm_started(a));

    // User jumps to `c` while the device auto-advances into `b`.
    mirror.load(c);
    assert!(mirror.confirm_started(b));
    assert!(mirror.confirm_started(c));
}

#[test]
fn mirror_flags_auto_advance_into_dropped_item() {
    let mut mirror = Mirror::default();
    let (a, b, c) = (TrackId::next(), TrackId::next(), TrackId::next());
    mirror.load(a);
    mirror.append(b);
    assert!(mirror.confirm_started(a));

    // `b` was removed and replaced by `c`, but the device had already
    // moved on to `b`.
    mirror.clear_pending();
    mirror.append(c);
    assert_eq!(mirror.advance(), Some(c));
    assert!(!mirror.confirm_started(b));
}

#[test]
fn mirror_accepts_auto_advance_it_expected() {
    let mut mirror = Mirror::default();
    let (a, b) = (TrackId::next(), TrackId::next());
    mirror.load(a);
    mirror.append(b);
    assert!(mirror.confirm_started(a));

    assert_eq!(mirror.advance(), Some(b));
    assert!(mirror.confirm_started(b));
    assert!(mirror.pending().is_empty());
}

#[test]
fn mirror_forgets_unconfirmed_load_after_advance() {
    let mut mirror = Mirror::default();
    let (a, b) = (TrackId::next(), TrackId::next());
    // The device failed to open `a` and went on to `b`.
    mirror.load(a);
    mirror.append(b);
    assert_eq!(mirror.advance(), Some(b));
    assert!(mirror.confirm_started(b));
}

#[test]
fn mirror_tolerates_starts_after_clear() {
    let mut mirror = Mirror::default();
    let (a, b) = (TrackId::next(), TrackId::next());
    mirror.load(a);
    mirror.append(b);
    assert!(mirror.confirm_started(a));

    mirror.clear();
    assert!(mirror.confirm_started(b));
    assert_eq!(mirror.now_playing(), None);
    assert_eq!(mirror.pending_count(), 0);
}

#[test]
fn probe_rejects_missing_and_garbage_files() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.mp3");
    assert!(matches!(
        probe(&missing),
        Err(DeviceError::Unreadable { .. })
    ));

    let garbage = dir.path().join("garbage.wav");
    fs::write(&garbage, b"definitely not audio").unwrap();
    assert!(matches!(
        probe(&garbage),
        Err(DeviceError::Unreadable { .. })
    ));
}
