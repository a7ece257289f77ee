use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use crate::library::{Track, TrackId};

use super::adapter::{DeviceError, MediaQueue, Transport};

/// One call made against a [`MemoryQueue`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueueOp {
    Load { track: TrackId, autoplay: bool },
    Append(TrackId),
    ClearPending,
    Clear,
    Advance,
    Pause,
    Resume,
    Seek(f64),
    Volume(f32),
}

/// Queue with no audio output.
///
/// Used for headless session editing and as the device stand-in in tests.
/// Every call is recorded so callers can check whether the now-playing slot
/// was torn down.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    now_playing: Option<TrackId>,
    pending: VecDeque<TrackId>,
    paused: bool,
    position: f64,
    duration: f64,
    volume: f32,
    durations: HashMap<TrackId, f64>,
    unreadable: HashSet<PathBuf>,
    ops: Vec<QueueOp>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            paused: true,
            ..Self::default()
        }
    }

    /// Make every later `load`/`append` of `path` fail.
    pub fn reject(&mut self, path: impl Into<PathBuf>) {
        self.unreadable.insert(path.into());
    }

    pub fn ops(&self) -> &[QueueOp] {
        &self.ops
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn check(&self, track: &Track) -> Result<(), DeviceError> {
        if self.unreadable.contains(track.path()) {
            return Err(DeviceError::Unreadable {
                path: track.path().to_path_buf(),
                reason: "rejected".to_string(),
            });
        }
        Ok(())
    }

    fn duration_of(track: &Track) -> f64 {
        track
            .metadata()
            .duration
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    fn enter(&mut self, id: Option<TrackId>) {
        self.now_playing = id;
        self.position = 0.0;
        self.duration = id
            .and_then(|id| self.durations.get(&id).copied())
            .unwrap_or(0.0);
    }
}

impl MediaQueue for MemoryQueue {
    fn load(&mut self, track: &Track, autoplay: bool) -> Result<(), DeviceError> {
        self.check(track)?;
        self.ops.push(QueueOp::Load {
            track: track.id(),
            autoplay,
        });
        self.durations.insert(track.id(), Self::duration_of(track));
        self.enter(Some(track.id()));
        self.paused = !autoplay;
        Ok(())
    }

    fn append(&mut self, track: &Track) -> Result<(), DeviceError> {
        self.check(track)?;
        self.ops.push(QueueOp::Append(track.id()));
        self.durations.insert(track.id(), Self::duration_of(track));
        self.pending.push_back(track.id());
        Ok(())
    }

    fn clear_pending(&mut self) {
        self.ops.push(QueueOp::ClearPending);
        self.pending.clear();
    }

    fn clear(&mut self) {
        self.ops.push(QueueOp::Clear);
        self.pending.clear();
        self.enter(None);
        self.paused = true;
    }

    fn advance(&mut self) -> Option<TrackId> {
        self.ops.push(QueueOp::Advance);
        let next = self.pending.pop_front();
        self.enter(next);
        if next.is_none() {
            self.paused = true;
        }
        next
    }

    fn now_playing(&self) -> Option<TrackId> {
        self.now_playing
    }

    fn pending(&self) -> Vec<TrackId> {
        self.pending.iter().copied().collect()
    }
}

impl Transport for MemoryQueue {
    fn pause(&mut self) {
        self.ops.push(QueueOp::Pause);
        self.paused = true;
    }

    fn resume(&mut self) {
        self.ops.push(QueueOp::Resume);
        if self.now_playing.is_some() {
            self.paused = false;
        }
    }

    fn seek(&mut self, seconds: f64) {
        self.ops.push(QueueOp::Seek(seconds));
        self.position = seconds;
    }

    fn set_volume(&mut self, volume: f32) {
        self.ops.push(QueueOp::Volume(volume));
        self.volume = volume;
    }

    fn position(&self) -> f64 {
        if self.now_playing.is_some() {
            self.position
        } else {
            0.0
        }
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}
