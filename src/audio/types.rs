//! Commands, shared clock and callback types of the device thread.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::library::TrackId;
use crate::queue::DeviceEvent;

/// An entry handed to the device: identity plus the file to decode.
#[derive(Debug, Clone)]
pub(super) struct QueuedTrack {
    pub id: TrackId,
    pub path: PathBuf,
}

#[derive(Debug)]
pub(super) enum DeviceCmd {
    /// Replace the now-playing item; pending items are kept.
    Load { track: QueuedTrack, autoplay: bool },
    Append(QueuedTrack),
    ClearPending,
    /// Stop output and drop everything.
    Clear,
    Pause,
    Resume,
    /// Seek the now-playing item to this offset in seconds.
    Seek(f64),
    SetVolume(f32),
    /// Quit the device thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Position and duration of what the device is outputting.
#[derive(Debug, Clone, Default)]
pub struct DeviceClock {
    pub track: Option<TrackId>,
    pub position: f64,
    pub duration: f64,
}

pub type ClockHandle = Arc<Mutex<DeviceClock>>;

/// Where the device thread posts its events. Called on the device thread.
pub type EventSink = Box<dyn Fn(DeviceEvent) + Send + 'static>;
