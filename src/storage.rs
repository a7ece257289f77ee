//! Session persistence: the playlist locators and the current index.

mod session;

pub use session::{MemorySessionStore, NullSessionStore, Session, SessionStore, TomlSessionStore};

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("session file is malformed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("session could not be encoded: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests;
