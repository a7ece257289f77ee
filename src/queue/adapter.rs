use std::path::PathBuf;

use thiserror::Error;

use crate::library::{Track, TrackId};

/// Failures reported by a media queue implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    #[error("cannot play {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[error("audio device thread is not running")]
    Disconnected,
}

/// Asynchronous notifications from the output device.
///
/// These are produced on the device thread and handled on the control
/// thread; they never touch player state directly.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// The device began outputting this entry (after a load or an auto-advance).
    TrackStarted(TrackId),
    /// This entry played to the end; the device has moved on to its next
    /// pending item, if any.
    TrackFinished(TrackId),
    /// Output rate changed; `0.0` means output stopped.
    RateChanged(f32),
    /// Decoding/output failed. When `track` is set the device treats it like
    /// a completion of that entry.
    Error {
        track: Option<TrackId>,
        message: String,
    },
}

/// Append/drain-only playback queue.
///
/// Only [`QueueReconciler`](super::QueueReconciler) drives this trait.
pub trait MediaQueue {
    /// Replace the now-playing slot with `track`, leaving pending items alone.
    fn load(&mut self, track: &Track, autoplay: bool) -> Result<(), DeviceError>;
    /// Add `track` to the end of the pending items.
    fn append(&mut self, track: &Track) -> Result<(), DeviceError>;
    /// Drop every pending item; the now-playing slot keeps playing.
    fn clear_pending(&mut self);
    /// Stop output and drop everything.
    fn clear(&mut self);
    /// Move the first pending item into the now-playing slot (natural
    /// completion) and return it.
    fn advance(&mut self) -> Option<TrackId>;
    fn now_playing(&self) -> Option<TrackId>;
    fn pending(&self) -> Vec<TrackId>;

    fn pending_count(&self) -> usize {
        self.pending().len()
    }

    /// Check a `TrackStarted` report against the queue's own view.
    ///
    /// Returns `false` only when the device is outputting something the
    /// queue does not expect and has no newer load on the way, i.e. the
    /// device and the queue have diverged.
    fn confirm_started(&mut self, started: TrackId) -> bool {
        self.now_playing() == Some(started)
    }
}

/// Output controls that do not change what is queued.
pub trait Transport {
    fn pause(&mut self);
    fn resume(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f32);
    /// Offset into the now-playing item, in seconds.
    fn position(&self) -> f64;
    /// Length of the now-playing item, `0.0` when unknown or nothing loaded.
    fn duration(&self) -> f64;
}
