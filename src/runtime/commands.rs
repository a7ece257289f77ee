use std::io::{self, Write};

use thiserror::Error;

use crate::cli::{Command, ShellCommand};
use crate::library::{Track, details_line, to_hhmmss};
use crate::player::{AddOptions, NowPlaying, Player, PlayerError};
use crate::queue::{MediaQueue, Transport};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error("cannot write output: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Convert a 1-based position from the command line.
fn position(n: usize, len: usize) -> Result<usize, PlayerError> {
    n.checked_sub(1)
        .ok_or(PlayerError::InvalidIndex { index: n, len })
}

/// Run one command against `player`, writing any report to `out`.
pub fn apply<Q, W>(player: &mut Player<Q>, command: ShellCommand, out: &mut W) -> Result<Outcome, CommandError>
where
    Q: MediaQueue + Transport,
    W: Write,
{
    let len = player.playlist().len();

    match command {
        ShellCommand::Playlist(command) => match command {
            Command::Add { paths, play } => {
                let options = AddOptions {
                    update_index_if_new: true,
                    should_play: play,
                };
                let added = player.add(&paths, options);
                writeln!(out, "added {added} tracks")?;
            }
            Command::Insert { paths, at } => {
                // Insert positions need no existing entry; the store clamps them.
                let added = player.insert(&paths, at.saturating_sub(1), AddOptions::default());
                writeln!(out, "inserted {added} tracks")?;
            }
            Command::Remove { indices } => {
                let mut targets = Vec::with_capacity(indices.len());
                for n in indices {
                    let index = position(n, len)?;
                    if index >= len {
                        return Err(PlayerError::InvalidIndex { index: n, len }.into());
                    }
                    targets.push(index);
                }
                let removed = player.remove_many(&targets);
                writeln!(out, "removed {removed} tracks")?;
            }
            Command::Move { from, to, count } => {
                player.move_items(position(from, len)?, position(to, len)?, count)?;
            }
            Command::Play { index: Some(n) } => player.play_at(position(n, len)?)?,
            Command::Play { index: None } => player.play()?,
            Command::Pause => player.pause(),
            Command::Next => player.next()?,
            Command::Previous => player.previous()?,
            Command::Clear => player.clear(),
            Command::List => list(player, out)?,
            // Refused by `parse_line`; one-shot runs dispatch it before here.
            Command::Shell => {}
        },
        ShellCommand::Stop => player.stop(),
        ShellCommand::Toggle => player.play_pause()?,
        ShellCommand::Seek { seconds } => player.seek(seconds)?,
        ShellCommand::Volume { level } => player.set_volume(level),
        ShellCommand::Mute => player.toggle_mute(),
        ShellCommand::Status => status(player, out)?,
        ShellCommand::Quit => return Ok(Outcome::Quit),
    }
    Ok(Outcome::Continue)
}

pub fn list<Q: MediaQueue + Transport, W: Write>(player: &Player<Q>, out: &mut W) -> io::Result<()> {
    if player.playlist().is_empty() {
        return writeln!(out, "playlist is empty");
    }
    for (i, track) in player.playlist().tracks().iter().enumerate() {
        let marker = if player.current_index() == Some(i) { ">" } else { " " };
        writeln!(out, "{marker} {}", track.label(i))?;
    }
    Ok(())
}

/// Playlist label plus the artist/album line when the tags have one.
pub(super) fn describe(track: &Track, index: usize) -> String {
    let details = details_line(track.metadata());
    if details.is_empty() {
        track.label(index)
    } else {
        format!("{} ({details})", track.label(index))
    }
}

pub fn status<Q: MediaQueue + Transport, W: Write>(player: &Player<Q>, out: &mut W) -> io::Result<()> {
    let title = match (player.now_playing(), player.current_index()) {
        (NowPlaying::Loaded { .. }, Some(i)) => player
            .current_track()
            .map(|t| describe(t, i))
            .unwrap_or_default(),
        _ => "nothing loaded".to_string(),
    };
    let volume = if player.is_muted() {
        "muted".to_string()
    } else {
        format!("{:.0}%", player.volume() * 100.0)
    };
    writeln!(
        out,
        "[{}] {title} {} / {} vol {volume}",
        player.state().label(),
        to_hhmmss(player.position()),
        to_hhmmss(player.duration()),
    )
}
