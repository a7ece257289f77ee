//! Playlist and playback-queue core for a local-file music player.
//!
//! The [`player::Player`] owns an editable playlist and keeps an
//! append/drain-only device queue ([`queue::MediaQueue`]) in step with it.
//! [`audio::RodioQueue`] is the rodio-backed device; [`queue::MemoryQueue`]
//! records operations for headless use and tests.

pub mod audio;
pub mod cli;
pub mod config;
pub mod library;
pub mod player;
pub mod playlist;
pub mod queue;
pub mod runtime;
pub mod storage;
