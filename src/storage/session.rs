use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::StorageError;

/// What is persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Playlist entries in order, as file paths.
    #[serde(default)]
    pub tracks: Vec<String>,
    /// Current index into `tracks`, absent when nothing was selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

pub trait SessionStore {
    /// `Ok(None)` when nothing was saved yet.
    fn load(&self) -> Result<Option<Session>, StorageError>;
    fn save(&mut self, session: &Session) -> Result<(), StorageError>;
}

/// Session kept in a TOML file.
#[derive(Debug, Clone)]
pub struct TomlSessionStore {
    path: PathBuf,
}

impl TomlSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for TomlSessionStore {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(toml::from_str(&text)?))
    }

    fn save(&mut self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string(session)?;
        fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), tracks = session.tracks.len(), "session saved");
        Ok(())
    }
}

/// In-memory session. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(session))),
        }
    }

    /// Last saved session.
    pub fn saved(&self) -> Option<Session> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        Ok(self.saved())
    }

    fn save(&mut self, session: &Session) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }
}

/// Used when persistence is turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSessionStore;

impl SessionStore for NullSessionStore {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        Ok(None)
    }

    fn save(&mut self, _session: &Session) -> Result<(), StorageError> {
        Ok(())
    }
}
