use std::time::{Duration, Instant};

use super::events::PlayerEvent;

/// Externally visible playback state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing loaded or playback stopped.
    #[default]
    Idle,
    Playing,
    /// Media loaded, output suspended.
    Paused,
}

impl PlaybackState {
    fn event(self) -> PlayerEvent {
        match self {
            Self::Idle => PlayerEvent::PlaybackStopped,
            Self::Playing => PlayerEvent::PlaybackStarted,
            Self::Paused => PlayerEvent::PlaybackPaused,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Periodic deadline for position sampling. Runs only while playing.
#[derive(Debug, Clone)]
pub struct PositionTimer {
    interval: Duration,
    due: Option<Instant>,
}

impl PositionTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            due: None,
        }
    }

    /// Start ticking. A running timer is left alone.
    pub fn start(&mut self, now: Instant) {
        if self.due.is_none() {
            self.due = Some(now + self.interval);
        }
    }

    pub fn stop(&mut self) {
        self.due = None;
    }

    pub fn is_running(&self) -> bool {
        self.due.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.due
    }

    /// `true` if a tick is due at `now`; the next one is then scheduled.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

/// Playback state plus the position timer tied to it.
#[derive(Debug, Clone)]
pub struct PlaybackStateMachine {
    state: PlaybackState,
    timer: PositionTimer,
}

impl PlaybackStateMachine {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            state: PlaybackState::Idle,
            timer: PositionTimer::new(poll_interval),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn timer(&self) -> &PositionTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut PositionTimer {
        &mut self.timer
    }

    /// Move to `to`. Returns the event to emit, or `None` when already there.
    pub fn transition(&mut self, to: PlaybackState, now: Instant) -> Option<PlayerEvent> {
        if self.state == to {
            return None;
        }
        self.state = to;
        if to == PlaybackState::Playing {
            self.timer.start(now);
        } else {
            self.timer.stop();
        }
        Some(to.event())
    }
}
