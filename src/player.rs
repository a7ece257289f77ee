//! Playback controller and the pieces it is built from: the playback state
//! machine, the position/metadata tracker and the event bus.

mod controller;
mod error;
mod events;
mod guard;
mod state;
mod tracker;

pub use controller::{AddOptions, Player, PlayerOptions};
pub use error::PlayerError;
pub use events::{EventBus, PlayerEvent};
pub use guard::{Reentrancy, ReentrancyGuard};
pub use state::{PlaybackState, PlaybackStateMachine, PositionTimer};
pub use tracker::{NowPlaying, Origin, PositionTracker};
