use std::sync::mpsc::{self, Receiver, Sender};

use tracing::trace;

/// Notifications emitted by the player. Consumers never reply.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    PlaylistChanged,
    MediaChanged,
    PlaybackStarted,
    PlaybackPaused,
    PlaybackStopped,
    /// A user seek moved playback to this offset (seconds).
    PositionSet(f64),
    RateChanged(f32),
}

impl PlayerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlaylistChanged => "playlistChanged",
            Self::MediaChanged => "mediaChanged",
            Self::PlaybackStarted => "playbackStarted",
            Self::PlaybackPaused => "playbackPaused",
            Self::PlaybackStopped => "playbackStopped",
            Self::PositionSet(_) => "positionSet",
            Self::RateChanged(_) => "rateChanged",
        }
    }
}

/// Fan-out of [`PlayerEvent`]s to any number of channel subscribers.
///
/// Subscribers whose receiver was dropped are pruned on the next emit.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<PlayerEvent>>,
}

impl EventBus {
    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: PlayerEvent) {
        trace!(event = event.name(), "emit");
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
