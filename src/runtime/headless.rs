use std::io::{self, Write};
use std::process::ExitCode;

use tracing::debug;

use crate::cli::{Command, ShellCommand};
use crate::config::Settings;
use crate::player::{Player, PlayerOptions};
use crate::queue::MemoryQueue;

use super::commands::{self, CommandError};

/// Run a single playlist command without opening the audio device. The
/// playlist and current index are read from and written back to the session.
pub fn run_once(settings: &Settings, command: Command) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let session = super::session_store(settings);
    let mut player = Player::new(MemoryQueue::new(), session, PlayerOptions::from_settings(settings));
    let restored = player.restore();
    debug!(restored, "session restored");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match commands::apply(&mut player, ShellCommand::Playlist(command), &mut out) {
        Ok(_) => {
            out.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(CommandError::Player(err)) => {
            writeln!(io::stderr(), "nmp: {err}")?;
            Ok(ExitCode::from(2))
        }
        Err(CommandError::Io(err)) => Err(err.into()),
    }
}
