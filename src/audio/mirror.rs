use std::collections::VecDeque;

use crate::library::TrackId;

/// Control-side copy of the device queue.
///
/// Commands reach the device asynchronously, so the mirror also remembers
/// which loads the device has not confirmed yet. That is what lets it tell
/// a late report about superseded work apart from a device that went its
/// own way (e.g. auto-advanced into an item that was just removed).
#[derive(Debug, Default)]
pub(super) struct Mirror {
    now_playing: Option<TrackId>,
    pending: VecDeque<TrackId>,
    in_flight: VecDeque<TrackId>,
}

impl Mirror {
    pub fn now_playing(&self) -> Option<TrackId> {
        self.now_playing
    }

    pub fn pending(&self) -> Vec<TrackId> {
        self.pending.iter().copied().collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn load(&mut self, id: TrackId) {
        self.now_playing = Some(id);
        self.in_flight.push_back(id);
    }

    pub fn append(&mut self, id: TrackId) {
        self.pending.push_back(id);
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    pub fn clear(&mut self) {
        self.now_playing = None;
        self.pending.clear();
    }

    pub fn advance(&mut self) -> Option<TrackId> {
        let finished = self.now_playing;
        // A load of the finished item will never be confirmed now.
        self.in_flight.retain(|id| Some(*id) != finished);
        self.now_playing = self.pending.pop_front();
        self.now_playing
    }

    /// `false` when the device reports output the mirror cannot account for.
    pub fn confirm_started(&mut self, started: TrackId) -> bool {
        if let Some(at) = self.in_flight.iter().position(|id| *id == started) {
            self.in_flight.drain(..=at);
            // A newer load is still on its way, or the slot was cleared since.
            if !self.in_flight.is_empty() || self.now_playing.is_none() {
                return true;
            }
            return self.now_playing == Some(started);
        }

        if self.now_playing == Some(started) || !self.in_flight.is_empty() {
            return true;
        }
        // Auto-advance into something we did not queue. After a clear the
        // controller is idle and drops these on its own.
        self.now_playing.is_none()
    }
}
