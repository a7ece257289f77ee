//! Process wiring: settings, logging, the session store and the two ways of
//! driving the player (one-shot commands and the interactive shell).

use std::error::Error;
use std::process::ExitCode;

use tracing::warn;

use crate::cli::{Cli, Command};
use crate::config::{Settings, default_config_path};
use crate::storage::{NullSessionStore, SessionStore, TomlSessionStore};

mod commands;
mod event_loop;
mod headless;
mod logging;
mod settings;

pub use commands::{CommandError, Outcome, apply, list, status};

pub fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let (mut settings, warning) = settings::load_settings(cli.config.or_else(default_config_path));
    logging::init(&settings.log);
    if let Some(warning) = warning {
        warn!("{warning}");
    }
    if let Some(path) = cli.session {
        settings.session.path = Some(path);
    }

    match cli.command {
        Command::Shell => event_loop::run_shell(&settings, None),
        Command::Play { index } => event_loop::run_shell(&settings, Some(index)),
        command => headless::run_once(&settings, command),
    }
}

/// The session store described by `settings`.
pub fn session_store(settings: &Settings) -> Box<dyn SessionStore> {
    match settings.session_path() {
        Some(path) if settings.session.persist => Box::new(TomlSessionStore::new(path)),
        _ => {
            if settings.session.persist {
                warn!("no session path available; the playlist will not be saved");
            }
            Box::new(NullSessionStore)
        }
    }
}
