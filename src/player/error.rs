use thiserror::Error;

/// Why a player operation did nothing.
///
/// None of these leave state half-changed; callers may ignore them. The CLI
/// maps them to a non-zero exit code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("index {index} is out of range (playlist has {len} items)")]
    InvalidIndex { index: usize, len: usize },
    #[error("the playlist is empty")]
    EmptyPlaylist,
    #[error("no media is loaded")]
    NoMedia,
}
