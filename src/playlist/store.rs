use crate::library::{Track, TrackId};

/// What a successful playlist mutation changed.
///
/// The reconciler uses this to follow the current entry through the edit.
/// Indices are expressed against the playlist as it was before the edit,
/// except `Moved::to`, which is the insertion point in the shortened list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Appended { at: usize, count: usize },
    Inserted { at: usize, count: usize },
    /// Removed indices, ascending and deduplicated.
    Removed { indices: Vec<usize> },
    Moved { from: usize, to: usize, count: usize },
    Cleared { count: usize },
}

/// Ordered playlist. Insertion order is playback order.
#[derive(Debug, Clone, Default)]
pub struct PlaylistStore {
    tracks: Vec<Track>,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn position_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id() == id)
    }

    /// Entry ids strictly after `index`, in playback order.
    pub fn ids_after(&self, index: usize) -> Vec<TrackId> {
        self.tracks
            .iter()
            .skip(index.saturating_add(1))
            .map(Track::id)
            .collect()
    }

    pub fn locators(&self) -> Vec<String> {
        self.tracks.iter().map(Track::locator).collect()
    }

    pub fn append(&mut self, tracks: Vec<Track>) -> Option<Edit> {
        if tracks.is_empty() {
            return None;
        }
        let at = self.tracks.len();
        let count = tracks.len();
        self.tracks.extend(tracks);
        Some(Edit::Appended { at, count })
    }

    /// Insert a contiguous block; `at` is clamped to `[0, len]`.
    pub fn insert(&mut self, tracks: Vec<Track>, at: usize) -> Option<Edit> {
        if tracks.is_empty() {
            return None;
        }
        let at = at.min(self.tracks.len());
        let count = tracks.len();
        self.tracks.splice(at..at, tracks);
        Some(Edit::Inserted { at, count })
    }

    pub fn remove(&mut self, index: usize) -> Option<Edit> {
        self.remove_many(&[index])
    }

    /// Remove every valid index in `indices`. Out-of-range indices and
    /// duplicates are ignored.
    pub fn remove_many(&mut self, indices: &[usize]) -> Option<Edit> {
        let mut targets: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.tracks.len())
            .collect();
        targets.sort_unstable();
        targets.dedup();
        if targets.is_empty() {
            return None;
        }

        // Each earlier removal shifts the later targets left by one.
        for (removed, &i) in targets.iter().enumerate() {
            self.tracks.remove(i - removed);
        }

        Some(Edit::Removed { indices: targets })
    }

    /// Relocate `count` entries starting at `from`.
    ///
    /// The block is taken out first; `to` then indexes the shortened list and
    /// is clamped to its length, so anything past the end appends.
    pub fn move_items(&mut self, from: usize, to: usize, count: usize) -> Option<Edit> {
        let end = from.checked_add(count)?;
        if count == 0 || end > self.tracks.len() {
            return None;
        }

        let block: Vec<Track> = self.tracks.drain(from..end).collect();
        let to = to.min(self.tracks.len());
        self.tracks.splice(to..to, block);

        if to == from {
            return None;
        }
        Some(Edit::Moved { from, to, count })
    }

    pub fn clear(&mut self) -> Option<Edit> {
        if self.tracks.is_empty() {
            return None;
        }
        let count = self.tracks.len();
        self.tracks.clear();
        Some(Edit::Cleared { count })
    }
}
