use std::collections::HashSet;

use tracing::{debug, warn};

use crate::library::{Track, TrackId};
use crate::playlist::{Edit, PlaylistStore};

use super::adapter::{DeviceError, MediaQueue, Transport};

/// Where the current entry ended up after a playlist edit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Follow {
    /// Same entry, now at this index.
    Kept(usize),
    /// The current entry was removed; the entry that slid into its slot is
    /// at this index.
    Replaced(usize),
    /// The current entry was removed and nothing took its place.
    Lost,
}

/// Follow the current entry (at `current` before the edit) through `edit`.
/// `new_len` is the playlist length after the edit.
pub fn follow_current(edit: &Edit, current: usize, new_len: usize) -> Follow {
    match *edit {
        Edit::Appended { .. } => Follow::Kept(current),
        Edit::Inserted { at, count } => {
            if at <= current {
                Follow::Kept(current + count)
            } else {
                Follow::Kept(current)
            }
        }
        Edit::Removed { ref indices } => {
            let before = indices.iter().take_while(|&&i| i < current).count();
            let index = current - before;
            if indices.binary_search(&current).is_err() {
                Follow::Kept(index)
            } else if index < new_len {
                Follow::Replaced(index)
            } else {
                Follow::Lost
            }
        }
        Edit::Moved { from, to, count } => {
            if (from..from + count).contains(&current) {
                return Follow::Kept(to + (current - from));
            }
            let without_block = if current >= from + count {
                current - count
            } else {
                current
            };
            if without_block >= to {
                Follow::Kept(without_block + count)
            } else {
                Follow::Kept(without_block)
            }
        }
        Edit::Cleared { .. } => Follow::Lost,
    }
}

/// How the now-playing item should start when it has to be (re)loaded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Start {
    Paused,
    Playing,
}

/// What happened to the device's now-playing slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SlotChange {
    /// Untouched: the same entry keeps playing without interruption.
    Kept,
    /// A different entry was loaded.
    Replaced,
    /// Nothing is current; the device was emptied.
    Cleared,
}

/// What happened to the device's pending items.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PendingChange {
    Unchanged,
    /// Only new items were appended.
    Extended(usize),
    /// Pending items were dropped and re-appended from scratch.
    Rebuilt(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub now_playing: SlotChange,
    pub pending: PendingChange,
    /// Entries the device refused during this pass. They stay listed.
    pub skipped: Vec<TrackId>,
}

impl Reconciliation {
    fn cleared() -> Self {
        Self {
            now_playing: SlotChange::Cleared,
            pending: PendingChange::Unchanged,
            skipped: Vec::new(),
        }
    }
}

/// The device refused the entry that should become now-playing.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRejected {
    pub index: usize,
    pub track: TrackId,
    pub error: DeviceError,
}

/// Sole owner of the device queue.
///
/// Brings the queue back in line with the playlist after every change: the
/// now-playing slot mirrors the current entry and the pending items mirror
/// the entries strictly after it, in order, minus entries the device has
/// refused before.
pub struct QueueReconciler<Q> {
    queue: Q,
    rejected: HashSet<TrackId>,
}

impl<Q: MediaQueue> QueueReconciler<Q> {
    pub fn new(queue: Q) -> Self {
        Self {
            queue,
            rejected: HashSet::new(),
        }
    }

    /// Read-only view of the device queue.
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn now_playing(&self) -> Option<TrackId> {
        self.queue.now_playing()
    }

    pub fn pending(&self) -> Vec<TrackId> {
        self.queue.pending()
    }

    pub fn is_rejected(&self, id: TrackId) -> bool {
        self.rejected.contains(&id)
    }

    /// Bring the device in line with `playlist` around `current`.
    ///
    /// The now-playing slot is only replaced when its entry differs from the
    /// current entry; otherwise only the pending part is touched.
    pub fn reconcile(
        &mut self,
        playlist: &PlaylistStore,
        current: Option<usize>,
        start: Start,
    ) -> Result<Reconciliation, LoadRejected> {
        self.rejected.retain(|id| playlist.position_of(*id).is_some());

        let Some((index, target)) = current.and_then(|i| playlist.get(i).map(|t| (i, t))) else {
            self.clear();
            return Ok(Reconciliation::cleared());
        };

        let now_playing = if self.queue.now_playing() == Some(target.id()) {
            SlotChange::Kept
        } else {
            debug!(track = %target.id(), index, "replacing now-playing item");
            if let Err(error) = self.queue.load(target, start == Start::Playing) {
                warn!(%error, index, "device refused current item");
                self.rejected.insert(target.id());
                return Err(LoadRejected {
                    index,
                    track: target.id(),
                    error,
                });
            }
            SlotChange::Replaced
        };

        let (pending, skipped) = self.sync_pending(&playlist.tracks()[index + 1..]);

        Ok(Reconciliation {
            now_playing,
            pending,
            skipped,
        })
    }

    fn sync_pending(&mut self, upcoming: &[Track]) -> (PendingChange, Vec<TrackId>) {
        let desired: Vec<&Track> = upcoming
            .iter()
            .filter(|t| !self.rejected.contains(&t.id()))
            .collect();
        let existing = self.queue.pending();

        let matches_prefix = existing.len() <= desired.len()
            && existing
                .iter()
                .zip(desired.iter())
                .all(|(have, want)| *have == want.id());

        if matches_prefix && existing.len() == desired.len() {
            return (PendingChange::Unchanged, Vec::new());
        }

        let to_append = if matches_prefix {
            &desired[existing.len()..]
        } else {
            self.queue.clear_pending();
            &desired[..]
        };

        let mut appended = 0;
        let mut skipped = Vec::new();
        for track in to_append {
            match self.queue.append(track) {
                Ok(()) => appended += 1,
                Err(error) => {
                    warn!(%error, track = %track.id(), "skipping unplayable item");
                    skipped.push(track.id());
                }
            }
        }
        self.rejected.extend(skipped.iter().copied());

        let change = if matches_prefix {
            PendingChange::Extended(appended)
        } else {
            PendingChange::Rebuilt(appended)
        };
        (change, skipped)
    }

    /// Natural completion: the device drained its front item.
    pub fn advance(&mut self) -> Option<TrackId> {
        self.queue.advance()
    }

    /// Throw away the device queue and rebuild it from scratch.
    pub fn resync(
        &mut self,
        playlist: &PlaylistStore,
        current: Option<usize>,
        start: Start,
    ) -> Result<Reconciliation, LoadRejected> {
        debug!("device diverged from playlist, rebuilding queue");
        self.queue.clear();
        self.reconcile(playlist, current, start)
    }

    /// Whether a `TrackStarted` report matches the queue.
    pub fn confirm_started(&mut self, started: TrackId) -> bool {
        self.queue.confirm_started(started)
    }

    /// Drop everything the device holds.
    pub fn clear(&mut self) {
        if self.queue.now_playing().is_some() || self.queue.pending_count() > 0 {
            self.queue.clear();
        }
    }
}

impl<Q: MediaQueue + Transport> QueueReconciler<Q> {
    /// Output controls. Queue contents stay under the reconciler's control.
    pub fn transport(&mut self) -> &mut dyn Transport {
        &mut self.queue
    }

    pub fn position(&self) -> f64 {
        self.queue.position()
    }

    pub fn duration(&self) -> f64 {
        self.queue.duration()
    }
}
