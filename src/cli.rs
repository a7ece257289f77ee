//! Command-line surface.
//!
//! The same command set is used for one-shot invocations and for lines read
//! by the interactive shell. Positions are 1-based, matching `list` output.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "nmp", version, about = "Local-file music player with a persistent playlist")]
pub struct Cli {
    /// Configuration file. Defaults to $XDG_CONFIG_HOME/nmp/config.toml.
    #[arg(long, global = true, env = "NMP_CONFIG_PATH", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Session file holding the playlist between runs.
    #[arg(long, global = true, value_name = "PATH")]
    pub session: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Append files or directories to the playlist.
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Start playing when the playlist was empty.
        #[arg(long)]
        play: bool,
    },
    /// Insert files or directories before a position.
    Insert {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        at: usize,
    },
    /// Remove entries by position.
    Remove {
        #[arg(required = true)]
        indices: Vec<usize>,
    },
    /// Move `count` entries starting at `from` so they start at `to`.
    Move {
        from: usize,
        to: usize,
        #[arg(default_value_t = 1)]
        count: usize,
    },
    /// Start playback, optionally at a position.
    Play { index: Option<usize> },
    Pause,
    Next,
    Previous,
    /// Empty the playlist.
    Clear,
    /// Print the playlist.
    List,
    /// Open the audio device and read commands from stdin.
    Shell,
}

/// Commands accepted by the interactive shell.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum ShellCommand {
    #[command(flatten)]
    Playlist(Command),
    /// Stop output; `play` restarts the current entry.
    Stop,
    /// Pause when playing, play otherwise.
    Toggle,
    /// Jump to an offset in seconds.
    Seek { seconds: f64 },
    /// Set the output volume (0.0 to 1.0).
    Volume { level: f32 },
    /// Toggle mute.
    Mute,
    /// Print what is playing.
    Status,
    Quit,
}

#[derive(Debug, Parser)]
#[command(name = "nmp", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: ShellCommand,
}

/// Parse one shell line. Blank lines and `#` comments yield `Ok(None)`;
/// `shell` is refused since the caller is already reading commands.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let words = split_words(line);
    if words.is_empty() {
        return Ok(None);
    }
    match Line::try_parse_from(words)?.command {
        ShellCommand::Playlist(Command::Shell) => Err(clap::Error::raw(
            ErrorKind::InvalidSubcommand,
            "already in the shell\n",
        )),
        command => Ok(Some(command)),
    }
}

/// Split on whitespace, honoring single/double quotes and backslash escapes.
pub fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.trim().chars();

    if line.trim_start().starts_with('#') {
        return words;
    }

    while let Some(c) = chars.next() {
        match (quote, c) {
            (None, '\\') | (Some('"'), '\\') => {
                if let Some(next) = chars.next() {
                    word.push(next);
                }
                in_word = true;
            }
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (Some(q), c) if c == q => quote = None,
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (_, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(word);
    }
    words
}
