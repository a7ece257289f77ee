use std::path::PathBuf;

use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/nmp/config.toml` or `~/.config/nmp/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `NMP__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub session: SessionSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial output volume, `0.0..=1.0`.
    pub volume: f32,
    /// Crossfade duration when the now-playing item is replaced while audible
    /// (milliseconds). Set to 0 to cut immediately.
    pub crossfade_ms: u64,
    /// Number of steps used to fade volumes (higher = smoother, more CPU).
    pub crossfade_steps: u64,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            crossfade_ms: 0,
            crossfade_steps: 10,
            quit_fade_out_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions accepted into the playlist (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks when expanding directories.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["wav".into(), "mp2".into(), "mp3".into(), "m4a".into()],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// What happens when the playing entry is removed from the playlist.
    pub on_remove_current: RemoveCurrentPolicy,
    /// `previous` restarts the current track once playback is past this point (seconds).
    pub previous_restart_secs: f64,
    /// Position polling cadence while playing (milliseconds).
    pub position_poll_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            on_remove_current: RemoveCurrentPolicy::KeepPlaying,
            previous_restart_secs: 1.0,
            position_poll_ms: 1000,
        }
    }
}

/// Policy for removing the entry that is currently loaded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoveCurrentPolicy {
    /// Cut to the entry that slides into the removed slot and keep the
    /// playing/paused state.
    #[default]
    #[serde(alias = "keep_playing", alias = "continue")]
    KeepPlaying,
    /// Load the entry that slides into place but leave playback paused.
    #[serde(alias = "paused")]
    Pause,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Explicit session file; defaults to `$XDG_STATE_HOME/nmp/session.toml`.
    pub path: Option<PathBuf>,
    /// Save the playlist and current index after every change.
    pub persist: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            path: None,
            persist: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}
