use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::display::playlist_label;
use super::metadata::read_metadata;

static NEXT_TRACK_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one playlist entry.
///
/// Two entries pointing at the same file still get distinct ids, so the
/// reconciler can follow the exact entry that is loaded in the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(u64);

impl TrackId {
    pub fn next() -> Self {
        Self(NEXT_TRACK_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cover art attached to a track, either embedded in the tags or found next
/// to the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artwork {
    Embedded { mime: Option<String>, data: Vec<u8> },
    File(PathBuf),
}

/// Metadata read from embedded tags. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub artwork: Option<Artwork>,
}

/// A playlist entry: an immutable locator plus lazily cached metadata.
#[derive(Debug, Clone)]
pub struct Track {
    id: TrackId,
    path: PathBuf,
    metadata: OnceLock<TrackMetadata>,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: TrackId::next(),
            path: path.into(),
            metadata: OnceLock::new(),
        }
    }

    /// Build a track whose metadata is already known (skips tag reading).
    pub fn with_metadata(path: impl Into<PathBuf>, metadata: TrackMetadata) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(metadata);
        Self {
            id: TrackId::next(),
            path: path.into(),
            metadata: cell,
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The string stored in the session file for this entry.
    pub fn locator(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Cached metadata, read from the file on first access.
    pub fn metadata(&self) -> &TrackMetadata {
        self.metadata.get_or_init(|| read_metadata(&self.path))
    }

    /// `"<n>. <artist> - <title>"` for the entry at 0-based `index`.
    pub fn label(&self, index: usize) -> String {
        playlist_label(index, &self.path, self.metadata())
    }
}
