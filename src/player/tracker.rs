use crate::library::{Track, TrackId, TrackMetadata};

/// Who wrote a position value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Periodic sampling of the device clock.
    Internal,
    /// An explicit seek request; must be forwarded to the device.
    UserSeek,
}

/// What the now-playing slot holds, compared by value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NowPlaying {
    #[default]
    Nothing,
    Loaded {
        track: TrackId,
        metadata: TrackMetadata,
    },
}

impl NowPlaying {
    pub fn metadata(&self) -> Option<&TrackMetadata> {
        match self {
            Self::Nothing => None,
            Self::Loaded { metadata, .. } => Some(metadata),
        }
    }
}

/// Tracks position and duration of the now-playing item and the metadata
/// last announced for it.
#[derive(Debug, Default, Clone)]
pub struct PositionTracker {
    position: f64,
    duration: f64,
    now_playing: NowPlaying,
}

impl PositionTracker {
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn now_playing(&self) -> &NowPlaying {
        &self.now_playing
    }

    /// Store a new position. Returns the clamped offset the device must seek
    /// to, which only happens for [`Origin::UserSeek`].
    pub fn write_position(&mut self, seconds: f64, origin: Origin) -> Option<f64> {
        let mut clamped = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        if self.duration > 0.0 {
            clamped = clamped.min(self.duration);
        }
        self.position = clamped;
        match origin {
            Origin::Internal => None,
            Origin::UserSeek => Some(clamped),
        }
    }

    /// Take a periodic sample of the device clock.
    ///
    /// Returns `true` when the previous sample sat within a second of the end
    /// of its item and the clock has since wrapped or the duration changed:
    /// the device moved to the next item.
    pub fn sample(&mut self, position: f64, duration: f64) -> bool {
        let was_at_end = self.duration > 0.0 && self.position + 1.0 >= self.duration;
        let moved_on = position + 1.0 < self.position || duration != self.duration;
        self.duration = if duration.is_finite() { duration } else { 0.0 };
        self.write_position(position, Origin::Internal);
        was_at_end && moved_on
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = if duration.is_finite() { duration } else { 0.0 };
    }

    /// Record what is now playing. Returns `true` if that differs from what
    /// was last recorded, so re-entering the same entry with unchanged
    /// metadata is not announced twice.
    pub fn set_media(&mut self, track: Option<&Track>) -> bool {
        let next = match track {
            Some(track) => NowPlaying::Loaded {
                track: track.id(),
                metadata: track.metadata().clone(),
            },
            None => NowPlaying::Nothing,
        };
        if next == self.now_playing {
            return false;
        }
        self.now_playing = next;
        true
    }

    pub fn reset(&mut self) {
        self.position = 0.0;
        self.duration = 0.0;
    }
}
