use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::{LibrarySettings, RemoveCurrentPolicy, Settings};
use crate::library::{Track, TrackId, expand_paths, resolve_locator};
use crate::playlist::{Edit, PlaylistStore};
use crate::queue::{
    DeviceEvent, Follow, LoadRejected, MediaQueue, QueueReconciler, Reconciliation, SlotChange,
    Start, Transport, follow_current,
};
use crate::storage::{Session, SessionStore};

use super::error::PlayerError;
use super::events::{EventBus, PlayerEvent};
use super::guard::Reentrancy;
use super::state::{PlaybackState, PlaybackStateMachine};
use super::tracker::{NowPlaying, Origin, PositionTracker};

/// Player knobs taken from [`Settings`].
#[derive(Debug, Clone)]
pub struct PlayerOptions {
    pub on_remove_current: RemoveCurrentPolicy,
    pub previous_restart_secs: f64,
    pub position_poll: Duration,
    pub volume: f32,
    pub library: LibrarySettings,
}

impl PlayerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            on_remove_current: settings.playback.on_remove_current,
            previous_restart_secs: settings.playback.previous_restart_secs,
            position_poll: Duration::from_millis(settings.playback.position_poll_ms.max(1)),
            volume: settings.audio.volume,
            library: settings.library.clone(),
        }
    }
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// How `add`/`insert` treat an empty selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddOptions {
    /// Select the first entry when nothing is current.
    pub update_index_if_new: bool,
    /// Start playing right away instead of loading paused.
    pub should_play: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            update_index_if_new: true,
            should_play: false,
        }
    }
}

/// Playback controller.
///
/// Owns the playlist, the current index and (through the reconciler) the
/// device queue. Every public operation leaves the current index either
/// `None` or inside the playlist, and the device's pending items equal the
/// entries after it.
pub struct Player<Q> {
    playlist: PlaylistStore,
    current: Option<usize>,
    reconciler: QueueReconciler<Q>,
    machine: PlaybackStateMachine,
    tracker: PositionTracker,
    bus: EventBus,
    session: Box<dyn SessionStore>,
    saved: Option<Session>,
    internal: Reentrancy,
    options: PlayerOptions,
    volume: f32,
    muted: bool,
}

impl<Q: MediaQueue + Transport> Player<Q> {
    pub fn new(queue: Q, session: Box<dyn SessionStore>, options: PlayerOptions) -> Self {
        let volume = options.volume.clamp(0.0, 1.0);
        let mut reconciler = QueueReconciler::new(queue);
        reconciler.transport().set_volume(volume);

        Self {
            playlist: PlaylistStore::new(),
            current: None,
            reconciler,
            machine: PlaybackStateMachine::new(options.position_poll),
            tracker: PositionTracker::default(),
            bus: EventBus::default(),
            session,
            saved: None,
            internal: Reentrancy::default(),
            options,
            volume,
            muted: false,
        }
    }

    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        self.bus.subscribe()
    }

    pub fn playlist(&self) -> &PlaylistStore {
        &self.playlist
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.playlist.get(i))
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.state()
    }

    pub fn position(&self) -> f64 {
        self.tracker.position()
    }

    pub fn duration(&self) -> f64 {
        self.tracker.duration()
    }

    pub fn now_playing(&self) -> &NowPlaying {
        self.tracker.now_playing()
    }

    /// Output volume, remembered while muted.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn queue(&self) -> &Q {
        self.reconciler.queue()
    }

    /// When the position should next be sampled, if playing.
    pub fn next_poll(&self) -> Option<Instant> {
        self.machine.timer().deadline()
    }

    /// Rebuild the playlist from the session store.
    ///
    /// Locators that no longer resolve are dropped and the saved index is
    /// remapped as if they had been removed. The restored entry is loaded
    /// paused. Returns how many entries were restored.
    pub fn restore(&mut self) -> usize {
        let session = match self.session.load() {
            Ok(Some(session)) => session,
            Ok(None) => return 0,
            Err(error) => {
                warn!(%error, "ignoring unreadable session");
                return 0;
            }
        };

        let mut tracks = Vec::new();
        let mut dropped = Vec::new();
        for (i, locator) in session.tracks.iter().enumerate() {
            match resolve_locator(locator, &self.options.library) {
                Some(path) => tracks.push(Track::new(path)),
                None => {
                    debug!(locator = %locator, "skipping unresolvable session entry");
                    dropped.push(i);
                }
            }
        }

        let restored = tracks.len();
        let index = session
            .index
            .filter(|&i| i < session.tracks.len())
            .and_then(|i| {
                let removal = Edit::Removed {
                    indices: dropped.clone(),
                };
                match follow_current(&removal, i, restored) {
                    Follow::Kept(i) | Follow::Replaced(i) => Some(i),
                    Follow::Lost => None,
                }
            });

        let offset = self.playlist.len();
        if self.playlist.append(tracks).is_some() {
            self.bus.emit(PlayerEvent::PlaylistChanged);
        }
        if dropped.is_empty() && offset == 0 {
            self.saved = Some(session);
        }

        match index {
            Some(i) if self.current.is_none() => self.select(offset + i, Start::Paused),
            _ => self.sync_device(self.resume_start()),
        }
        self.commit();

        info!(restored, dropped = dropped.len(), "session restored");
        restored
    }

    /// Expand `paths` (directories recursively) and append the playable
    /// files. Returns how many entries were added.
    pub fn add(&mut self, paths: &[PathBuf], options: AddOptions) -> usize {
        let tracks = self.probe(paths);
        self.add_tracks(tracks, options)
    }

    pub fn add_tracks(&mut self, tracks: Vec<Track>, options: AddOptions) -> usize {
        let count = tracks.len();
        if self.playlist.append(tracks).is_none() {
            return 0;
        }
        self.after_add(options);
        count
    }

    /// Like [`add`](Self::add) but places the entries at `at` (clamped).
    pub fn insert(&mut self, paths: &[PathBuf], at: usize, options: AddOptions) -> usize {
        let tracks = self.probe(paths);
        self.insert_tracks(tracks, at, options)
    }

    pub fn insert_tracks(&mut self, tracks: Vec<Track>, at: usize, options: AddOptions) -> usize {
        let count = tracks.len();
        let Some(edit) = self.playlist.insert(tracks, at) else {
            return 0;
        };
        if let Some(current) = self.current {
            if let Follow::Kept(i) = follow_current(&edit, current, self.playlist.len()) {
                self.current = Some(i);
            }
        }
        self.after_add(options);
        count
    }

    fn probe(&self, paths: &[PathBuf]) -> Vec<Track> {
        expand_paths(paths, &self.options.library)
            .into_iter()
            .map(Track::new)
            .collect()
    }

    fn after_add(&mut self, options: AddOptions) {
        self.bus.emit(PlayerEvent::PlaylistChanged);

        if self.current.is_none() && options.update_index_if_new {
            let start = if options.should_play {
                Start::Playing
            } else {
                Start::Paused
            };
            self.select(0, start);
        } else {
            self.sync_device(self.resume_start());
            if options.should_play && self.current.is_some() {
                let _ = self.play();
            }
        }
        self.commit();
    }

    /// Remove the entry at `index`.
    pub fn remove(&mut self, index: usize) -> Result<(), PlayerError> {
        let len = self.playlist.len();
        if index >= len {
            return Err(PlayerError::InvalidIndex { index, len });
        }
        self.remove_many(&[index]);
        Ok(())
    }

    /// Remove several entries at once. Out-of-range and duplicate indices
    /// are ignored. Returns how many entries were removed.
    pub fn remove_many(&mut self, indices: &[usize]) -> usize {
        let Some(edit) = self.playlist.remove_many(indices) else {
            return 0;
        };
        let removed = match &edit {
            Edit::Removed { indices } => indices.len(),
            _ => 0,
        };
        self.bus.emit(PlayerEvent::PlaylistChanged);
        self.apply_edit(&edit);
        self.commit();
        removed
    }

    /// Relocate `count` entries starting at `from` to `to` (see
    /// [`PlaylistStore::move_items`]). The current entry is followed.
    pub fn move_items(&mut self, from: usize, to: usize, count: usize) -> Result<(), PlayerError> {
        let len = self.playlist.len();
        match self.playlist.move_items(from, to, count) {
            Some(edit) => {
                self.bus.emit(PlayerEvent::PlaylistChanged);
                self.apply_edit(&edit);
                self.commit();
                Ok(())
            }
            None if count > 0 && from.checked_add(count).is_some_and(|end| end <= len) => Ok(()),
            None => Err(PlayerError::InvalidIndex { index: from, len }),
        }
    }

    pub fn clear(&mut self) {
        if self.playlist.clear().is_some() {
            self.bus.emit(PlayerEvent::PlaylistChanged);
        }
        self.finish();
        self.commit();
    }

    fn apply_edit(&mut self, edit: &Edit) {
        let Some(current) = self.current else {
            self.sync_device(self.resume_start());
            return;
        };

        let follow = follow_current(edit, current, self.playlist.len());
        let state = self.machine.state();

        if state == PlaybackState::Idle {
            // Nothing is loaded; only the index has to follow the edit.
            self.current = match follow {
                Follow::Kept(i) | Follow::Replaced(i) => Some(i),
                Follow::Lost => None,
            };
            return;
        }

        match follow {
            Follow::Kept(i) => {
                self.current = Some(i);
                self.sync_device(self.resume_start());
            }
            Follow::Replaced(i) => {
                let was_playing = state == PlaybackState::Playing;
                let start = match self.options.on_remove_current {
                    RemoveCurrentPolicy::KeepPlaying if was_playing => Start::Playing,
                    _ => Start::Paused,
                };
                debug!(index = i, ?start, "current entry removed, selecting successor");
                self.current = Some(i);
                self.sync_device(start);
                if self.current.is_some() && was_playing && start == Start::Paused {
                    self.enter(PlaybackState::Paused);
                }
            }
            Follow::Lost => self.finish(),
        }
    }

    /// Start or resume playback. Selects the first entry when nothing is
    /// current. A no-op while already playing.
    pub fn play(&mut self) -> Result<(), PlayerError> {
        if self.playlist.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }
        if self.machine.state() == PlaybackState::Playing {
            return Ok(());
        }

        let index = self.current.unwrap_or(0);
        if self.is_loaded(index) {
            self.current = Some(index);
            self.reconciler.transport().resume();
            self.enter(PlaybackState::Playing);
        } else {
            self.select(index, Start::Playing);
        }
        self.commit();
        Ok(())
    }

    /// Play the entry at `index`.
    pub fn play_at(&mut self, index: usize) -> Result<(), PlayerError> {
        let len = self.playlist.len();
        if len == 0 {
            return Err(PlayerError::EmptyPlaylist);
        }
        if index >= len {
            return Err(PlayerError::InvalidIndex { index, len });
        }
        if self.current == Some(index) && self.is_loaded(index) {
            return self.play();
        }
        self.select(index, Start::Playing);
        self.commit();
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.machine.state() == PlaybackState::Playing {
            self.reconciler.transport().pause();
            self.enter(PlaybackState::Paused);
        }
    }

    pub fn play_pause(&mut self) -> Result<(), PlayerError> {
        if self.machine.state() == PlaybackState::Playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Stop output and unload the media. The current index is kept so a
    /// later `play` starts the same entry from the beginning.
    pub fn stop(&mut self) {
        if self.machine.state() == PlaybackState::Idle {
            return;
        }
        self.reconciler.clear();
        self.tracker.reset();
        self.announce_media();
        self.enter(PlaybackState::Idle);
    }

    /// Go to the next entry, keeping the playing/paused state.
    pub fn next(&mut self) -> Result<(), PlayerError> {
        let current = self.require_current()?;
        let len = self.playlist.len();
        let target = current + 1;
        if target >= len {
            return Err(PlayerError::InvalidIndex { index: target, len });
        }
        self.step_to(target);
        Ok(())
    }

    /// Restart the current entry once it is past the restart threshold,
    /// otherwise go back one entry.
    pub fn previous(&mut self) -> Result<(), PlayerError> {
        let current = self.require_current()?;
        let loaded = self.reconciler.now_playing().is_some();
        let position = self.reconciler.position();

        if current == 0 || (loaded && position > self.options.previous_restart_secs) {
            if loaded {
                self.seek(0.0)?;
            }
            return Ok(());
        }
        self.step_to(current - 1);
        Ok(())
    }

    /// Seek within the now-playing entry; the target is clamped to
    /// `[0, duration]`.
    pub fn seek(&mut self, seconds: f64) -> Result<(), PlayerError> {
        if self.reconciler.now_playing().is_none() {
            return Err(PlayerError::NoMedia);
        }
        self.tracker.set_duration(self.reconciler.duration());
        if let Some(target) = self.tracker.write_position(seconds, Origin::UserSeek) {
            self.reconciler.transport().seek(target);
            self.bus.emit(PlayerEvent::PositionSet(target));
        }
        Ok(())
    }

    /// Set the output volume (`0.0..=1.0`). Unmutes.
    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
        self.muted = false;
        self.reconciler.transport().set_volume(self.volume);
    }

    pub fn mute(&mut self) {
        if !self.muted {
            self.muted = true;
            self.reconciler.transport().set_volume(0.0);
        }
    }

    pub fn unmute(&mut self) {
        if self.muted {
            self.muted = false;
            self.reconciler.transport().set_volume(self.volume);
        }
    }

    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.unmute();
        } else {
            self.mute();
        }
    }

    /// Sample the device clock if the position timer is due.
    pub fn poll_position(&mut self, now: Instant) {
        if !self.machine.timer_mut().fire(now) {
            return;
        }
        let position = self.reconciler.position();
        let duration = self.reconciler.duration();
        if self.tracker.sample(position, duration) {
            debug!(position, duration, "track boundary");
            self.announce_media();
        }
    }

    /// Apply an event posted by the output device.
    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::TrackStarted(id) => {
                if !self.reconciler.confirm_started(id) {
                    // Idle means the device was cleared; whatever it started
                    // before that is about to be dropped.
                    if self.machine.state() != PlaybackState::Idle {
                        warn!(track = %id, "device started an unexpected item");
                        self.resync(self.resume_start());
                    }
                } else if self.reconciler.now_playing() == Some(id) {
                    self.tracker.set_duration(self.reconciler.duration());
                }
            }
            DeviceEvent::TrackFinished(id) => self.complete(id),
            DeviceEvent::Error {
                track: Some(id),
                message,
            } => {
                warn!(track = %id, %message, "playback failed");
                self.complete(id);
            }
            DeviceEvent::Error {
                track: None,
                message,
            } => warn!(%message, "device error"),
            DeviceEvent::RateChanged(rate) => {
                self.bus.emit(PlayerEvent::RateChanged(rate));
                if rate == 0.0
                    && self.machine.state() == PlaybackState::Playing
                    && self.reconciler.now_playing().is_some()
                {
                    self.enter(PlaybackState::Paused);
                }
            }
        }
    }

    /// Natural completion (or failure) of the now-playing entry.
    fn complete(&mut self, finished: TrackId) {
        if self.reconciler.now_playing() != Some(finished) {
            debug!(track = %finished, "ignoring stale completion");
            return;
        }
        let Some(current) = self.current else {
            self.reconciler.clear();
            return;
        };
        if current + 1 >= self.playlist.len() {
            self.finish();
            self.commit();
            return;
        }

        let drained = {
            let _guard = self.internal.enter();
            let drained = self.reconciler.advance();
            let next = drained
                .and_then(|id| self.playlist.position_of(id))
                .filter(|&i| i > current)
                .unwrap_or(current + 1);
            self.select(next, Start::Playing);
            drained
        };

        let expected = self.current_track().map(Track::id);
        if drained.is_some() && drained == expected {
            self.tracker.reset();
            self.tracker.set_duration(self.reconciler.duration());
            self.announce_media();
            self.sync_device(Start::Playing);
        } else {
            self.resync(Start::Playing);
        }
        self.commit();
    }

    fn require_current(&self) -> Result<usize, PlayerError> {
        match self.current {
            Some(index) => Ok(index),
            None if self.playlist.is_empty() => Err(PlayerError::EmptyPlaylist),
            None => Err(PlayerError::NoMedia),
        }
    }

    fn is_loaded(&self, index: usize) -> bool {
        let id = self.playlist.get(index).map(Track::id);
        id.is_some() && self.reconciler.now_playing() == id
    }

    fn resume_start(&self) -> Start {
        if self.machine.state() == PlaybackState::Playing {
            Start::Playing
        } else {
            Start::Paused
        }
    }

    fn step_to(&mut self, index: usize) {
        if self.machine.state() == PlaybackState::Idle {
            self.current = Some(index);
        } else {
            self.select(index, self.resume_start());
        }
        self.commit();
    }

    /// Make `index` current.
    ///
    /// Inside an internal scope the device already moved there by itself,
    /// so only the index is recorded.
    fn select(&mut self, index: usize, start: Start) {
        self.current = Some(index);
        if self.internal.is_active() {
            return;
        }
        self.reconcile(start, false);
        if self.current.is_some() {
            self.enter(match start {
                Start::Playing => PlaybackState::Playing,
                Start::Paused => PlaybackState::Paused,
            });
        }
    }

    /// Keep the device in step after an edit. Idle means nothing is
    /// loaded, and an edit alone does not load anything.
    fn sync_device(&mut self, start: Start) {
        if self.machine.state() == PlaybackState::Idle && self.reconciler.now_playing().is_none() {
            return;
        }
        self.reconcile(start, false);
    }

    fn resync(&mut self, start: Start) {
        self.reconcile(start, true);
    }

    fn reconcile(&mut self, start: Start, rebuild: bool) {
        let mut rebuild = rebuild;
        loop {
            let outcome = if rebuild {
                self.reconciler.resync(&self.playlist, self.current, start)
            } else {
                self.reconciler.reconcile(&self.playlist, self.current, start)
            };
            rebuild = false;
            match outcome {
                Ok(outcome) => {
                    self.after_reconcile(&outcome);
                    return;
                }
                Err(rejected) => {
                    if !self.skip_rejected(rejected) {
                        return;
                    }
                }
            }
        }
    }

    /// Move past a current entry the device refused. Returns `false` once
    /// there is nothing left to try.
    fn skip_rejected(&mut self, rejected: LoadRejected) -> bool {
        warn!(error = %rejected.error, index = rejected.index, "skipping unplayable entry");
        let next = rejected.index + 1;
        if next < self.playlist.len() {
            self.current = Some(next);
            true
        } else {
            self.finish();
            false
        }
    }

    fn after_reconcile(&mut self, outcome: &Reconciliation) {
        if !outcome.skipped.is_empty() {
            debug!(skipped = outcome.skipped.len(), "device refused pending entries");
        }
        match outcome.now_playing {
            SlotChange::Kept => {}
            SlotChange::Replaced | SlotChange::Cleared => {
                self.tracker.reset();
                self.tracker.set_duration(self.reconciler.duration());
                self.announce_media();
            }
        }
    }

    /// Emit `MediaChanged` if what is loaded differs from what was last
    /// announced.
    fn announce_media(&mut self) {
        let loaded = self.reconciler.now_playing();
        let track = self
            .current
            .and_then(|i| self.playlist.get(i))
            .filter(|t| Some(t.id()) == loaded);
        if self.tracker.set_media(track) {
            self.bus.emit(PlayerEvent::MediaChanged);
        }
    }

    /// Nothing left to play: empty the device and go idle.
    fn finish(&mut self) {
        self.reconciler.clear();
        self.current = None;
        self.tracker.reset();
        self.announce_media();
        self.enter(PlaybackState::Idle);
    }

    fn enter(&mut self, state: PlaybackState) {
        if let Some(event) = self.machine.transition(state, Instant::now()) {
            self.bus.emit(event);
        }
    }

    /// Save the session if the playlist or index changed since last time.
    fn commit(&mut self) {
        let snapshot = Session {
            tracks: self.playlist.locators(),
            index: self.current,
        };
        if self.saved.as_ref() == Some(&snapshot) {
            return;
        }
        match self.session.save(&snapshot) {
            Ok(()) => self.saved = Some(snapshot),
            Err(error) => warn!(%error, "failed to save session"),
        }
    }
}
