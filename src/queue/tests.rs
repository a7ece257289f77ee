use super::*;
use crate::library::{Track, TrackId, TrackMetadata};
use crate::playlist::{Edit, PlaylistStore};

fn t(name: &str) -> Track {
    Track::with_metadata(format!("/music/{name}.mp3"), TrackMetadata::default())
}

fn store(names: &[&str]) -> PlaylistStore {
    PlaylistStore::from_tracks(names.iter().map(|n| t(n)).collect())
}

fn ids(store: &PlaylistStore) -> Vec<TrackId> {
    store.tracks().iter().map(|t| t.id()).collect()
}

fn loaded(rec: &QueueReconciler<MemoryQueue>) -> usize {
    rec.queue()
        .ops()
        .iter()
        .filter(|op| matches!(op, QueueOp::Load { .. }))
        .count()
}

#[test]
fn follow_current_through_removals() {
    let removed_before = Edit::Removed { indices: vec![0] };
    assert_eq!(follow_current(&removed_before, 1, 2), Follow::Kept(0));

    let removed_current = Edit::Removed { indices: vec![1] };
    assert_eq!(follow_current(&removed_current, 1, 2), Follow::Replaced(1));

    let removed_last = Edit::Removed { indices: vec![2] };
    assert_eq!(follow_current(&removed_last, 2, 2), Follow::Lost);

    let removed_after = Edit::Removed { indices: vec![3, 4] };
    assert_eq!(follow_current(&removed_after, 1, 3), Follow::Kept(1));

    let removed_around = Edit::Removed {
        indices: vec![0, 2, 3],
    };
    assert_eq!(follow_current(&removed_around, 2, 2), Follow::Replaced(1));
}

#[test]
fn follow_current_through_inserts_and_appends() {
    let at_current = Edit::Inserted { at: 1, count: 2 };
    assert_eq!(follow_current(&at_current, 1, 5), Follow::Kept(3));

    let after_current = Edit::Inserted { at: 2, count: 2 };
    assert_eq!(follow_current(&after_current, 1, 5), Follow::Kept(1));

    let appended = Edit::Appended { at: 3, count: 1 };
    assert_eq!(follow_current(&appended, 0, 4), Follow::Kept(0));

    assert_eq!(follow_current(&Edit::Cleared { count: 3 }, 0, 0), Follow::Lost);
}

#[test]
fn follow_current_through_moves() {
    // [a,b,c] -> [b,c,a]
    let a_to_end = Edit::Moved {
        from: 0,
        to: 2,
        count: 1,
    };
    assert_eq!(follow_current(&a_to_end, 0, 3), Follow::Kept(2));
    assert_eq!(follow_current(&a_to_end, 1, 3), Follow::Kept(0));
    assert_eq!(follow_current(&a_to_end, 2, 3), Follow::Kept(1));

    // [a,b,c,d] -> [c,d,a,b]
    let block_to_front = Edit::Moved {
        from: 2,
        to: 0,
        count: 2,
    };
    assert_eq!(follow_current(&block_to_front, 0, 4), Follow::Kept(2));
    assert_eq!(follow_current(&block_to_front, 3, 4), Follow::Kept(1));
}

#[test]
fn first_reconcile_loads_current_and_queues_suffix() {
    let playlist = store(&["a", "b", "c"]);
    let mut rec = QueueReconciler::new(MemoryQueue::new());

    let r = rec.reconcile(&playlist, Some(0), Start::Paused).unwrap();
    assert_eq!(r.now_playing, SlotChange::Replaced);
    assert_eq!(r.pending, PendingChange::Extended(2));

    let all = ids(&playlist);
    assert_eq!(rec.now_playing(), Some(all[0]));
    assert_eq!(rec.pending(), vec![all[1], all[2]]);
    assert!(rec.queue().is_paused());
}

#[test]
fn unchanged_identity_keeps_now_playing_slot() {
    let mut playlist = store(&["a", "b", "c"]);
    let mut rec = QueueReconciler::new(MemoryQueue::new());
    rec.reconcile(&playlist, Some(1), Start::Playing).unwrap();
    assert_eq!(loaded(&rec), 1);

    // Remove `a`: `b` stays playing, now at index 0.
    let edit = playlist.remove(0).unwrap();
    let Follow::Kept(current) = follow_current(&edit, 1, playlist.len()) else {
        panic!("current entry should survive");
    };
    let r = rec.reconcile(&playlist, Some(current), Start::Playing).unwrap();

    assert_eq!(r.now_playing, SlotChange::Kept);
    assert_eq!(r.pending, PendingChange::Unchanged);
    assert_eq!(loaded(&rec), 1);
    assert_eq!(rec.pending(), playlist.ids_after(0));
}

#[test]
fn appends_only_extend_pending_items() {
    let mut playlist = store(&["a", "b"]);
    let mut rec = QueueReconciler::new(MemoryQueue::new());
    rec.reconcile(&playlist, Some(0), Start::Playing).unwrap();

    playlist.append(vec![t("c"), t("d")]).unwrap();
    let r = rec.reconcile(&playlist, Some(0), Start::Playing).unwrap();

    assert_eq!(r.pending, PendingChange::Extended(2));
    assert!(!rec.queue().ops().contains(&QueueOp::ClearPending));
    assert_eq!(rec.pending(), playlist.ids_after(0));
}

#[test]
fn reorder_rebuilds_pending_items() {
    let mut playlist = store(&["a", "b", "c", "d"]);
    let mut rec = QueueReconciler::new(MemoryQueue::new());
    rec.reconcile(&playlist, Some(0), Start::Playing).unwrap();

    playlist.move_items(3, 1, 1).unwrap();
    let r = rec.reconcile(&playlist, Some(0), Start::Playing).unwrap();

    assert_eq!(r.now_playing, SlotChange::Kept);
    assert_eq!(r.pending, PendingChange::Rebuilt(3));
    assert_eq!(rec.pending(), playlist.ids_after(0));
}

#[test]
fn no_current_clears_device() {
    let playlist = store(&["a", "b"]);
    let mut rec = QueueReconciler::new(MemoryQueue::new());
    rec.reconcile(&playlist, Some(0), Start::Playing).unwrap();

    let r = rec.reconcile(&playlist, None, Start::Paused).unwrap();
    assert_eq!(r.now_playing, SlotChange::Cleared);
    assert_eq!(rec.now_playing(), None);
    assert!(rec.pending().is_empty());
}

#[test]
fn refused_pending_item_is_skipped_but_remembered() {
    let playlist = store(&["a", "b", "c"]);
    let mut queue = MemoryQueue::new();
    queue.reject("/music/b.mp3");
    let mut rec = QueueReconciler::new(queue);

    let r = rec.reconcile(&playlist, Some(0), Start::Playing).unwrap();
    let all = ids(&playlist);
    assert_eq!(r.skipped, vec![all[1]]);
    assert_eq!(rec.pending(), vec![all[2]]);
    assert!(rec.is_rejected(all[1]));

    // The next pass treats the refused entry as absent instead of rebuilding.
    let r = rec.reconcile(&playlist, Some(0), Start::Playing).unwrap();
    assert_eq!(r.pending, PendingChange::Unchanged);
}

#[test]
fn refused_current_item_is_reported() {
    let playlist = store(&["a", "b"]);
    let mut queue = MemoryQueue::new();
    queue.reject("/music/a.mp3");
    let mut rec = QueueReconciler::new(queue);

    let err = rec.reconcile(&playlist, Some(0), Start::Playing).unwrap_err();
    assert_eq!(err.index, 0);
    assert_eq!(err.track, playlist.tracks()[0].id());
    assert!(matches!(err.error, DeviceError::Unreadable { .. }));
}

#[test]
fn advance_drains_front() {
    let playlist = store(&["a", "b", "c"]);
    let mut rec = QueueReconciler::new(MemoryQueue::new());
    rec.reconcile(&playlist, Some(0), Start::Playing).unwrap();

    let all = ids(&playlist);
    assert_eq!(rec.advance(), Some(all[1]));
    assert_eq!(rec.now_playing(), Some(all[1]));
    assert_eq!(rec.pending(), vec![all[2]]);

    // Already in sync after the drain: nothing to do.
    let r = rec.reconcile(&playlist, Some(1), Start::Playing).unwrap();
    assert_eq!(r.now_playing, SlotChange::Kept);
    assert_eq!(r.pending, PendingChange::Unchanged);
}

/// Small xorshift generator so the sequence below is reproducible.
struct Xorshift(u64);

impl Xorshift {
    fn below(&mut self, n: usize) -> usize {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 % n.max(1) as u64) as usize
    }
}

#[test]
fn queue_suffix_holds_across_random_edit_sequences() {
    let mut rng = Xorshift(0x9E37_79B9_7F4A_7C15);
    let mut playlist = store(&["a", "b", "c", "d", "e"]);
    let mut rec = QueueReconciler::new(MemoryQueue::new());
    let mut current = Some(2);
    rec.reconcile(&playlist, current, Start::Playing).unwrap();
    let mut serial = 0;

    for _ in 0..500 {
        let len = playlist.len();
        let edit = match rng.below(5) {
            0 => {
                serial += 1;
                playlist.append(vec![t(&format!("n{serial}"))])
            }
            1 => {
                serial += 1;
                playlist.insert(vec![t(&format!("i{serial}"))], rng.below(len + 1))
            }
            2 => playlist.remove(rng.below(len)),
            3 => {
                let from = rng.below(len);
                let count = 1 + rng.below(len - from.min(len));
                playlist.move_items(from, rng.below(len + 1), count)
            }
            _ => playlist.remove_many(&[rng.below(len), rng.below(len)]),
        };

        if let (Some(edit), Some(c)) = (edit, current) {
            current = match follow_current(&edit, c, playlist.len()) {
                Follow::Kept(i) | Follow::Replaced(i) => Some(i),
                Follow::Lost => None,
            };
        }
        if current.is_none() && !playlist.is_empty() {
            current = Some(rng.below(playlist.len()));
        }

        rec.reconcile(&playlist, current, Start::Playing).unwrap();

        match current {
            Some(c) => {
                assert!(c < playlist.len());
                assert_eq!(rec.now_playing(), Some(playlist.tracks()[c].id()));
                assert_eq!(rec.pending(), playlist.ids_after(c));
            }
            None => {
                assert_eq!(rec.now_playing(), None);
                assert!(rec.pending().is_empty());
            }
        }

        if playlist.len() < 3 {
            serial += 1;
            playlist.append(vec![t(&format!("r{serial}")), t(&format!("s{serial}"))]);
        }
    }
}
