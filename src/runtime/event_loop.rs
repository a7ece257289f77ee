use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::RodioQueue;
use crate::cli::{Command, ShellCommand, parse_line};
use crate::config::Settings;
use crate::library::to_hhmmss;
use crate::player::{PlaybackState, Player, PlayerError, PlayerEvent, PlayerOptions};
use crate::queue::{DeviceEvent, MediaQueue, Transport};

use super::commands::{self, CommandError, Outcome};

/// How long the loop sleeps when the position timer is not running.
const IDLE_WAIT: Duration = Duration::from_millis(500);

/// Everything the control thread reacts to.
enum ControlMsg {
    Command(ShellCommand),
    Device(DeviceEvent),
    InputClosed,
}

/// Open the audio device and drive the player from stdin until `quit`, or
/// until input ends and nothing is playing.
///
/// `initial_play` is the `play` subcommand's optional 1-based position.
pub fn run_shell(
    settings: &Settings,
    initial_play: Option<Option<usize>>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel::<ControlMsg>();

    let device_tx = tx.clone();
    let queue = RodioQueue::open(
        &settings.audio,
        Box::new(move |event| {
            let _ = device_tx.send(ControlMsg::Device(event));
        }),
    )?;

    let session = super::session_store(settings);
    let mut player = Player::new(queue, session, PlayerOptions::from_settings(settings));
    let events = player.subscribe();
    let restored = player.restore();
    info!(restored, "shell ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(index) = initial_play {
        let started = commands::apply(
            &mut player,
            ShellCommand::Playlist(Command::Play { index }),
            &mut out,
        );
        match started {
            Ok(_) => {}
            Err(CommandError::Player(err)) => {
                writeln!(io::stderr(), "nmp: {err}")?;
                return Ok(ExitCode::from(2));
            }
            Err(CommandError::Io(err)) => return Err(err.into()),
        }
    }

    spawn_input_reader(tx);
    let code = control_loop(&mut player, &rx, &events, &mut out)?;
    out.flush()?;
    Ok(code)
}

fn spawn_input_reader(tx: Sender<ControlMsg>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(error = %err, "stdin read failed");
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Some(command)) => {
                    if tx.send(ControlMsg::Command(command)).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    let _ = err.print();
                }
            }
        }
        let _ = tx.send(ControlMsg::InputClosed);
    });
}

fn control_loop<Q, W>(
    player: &mut Player<Q>,
    rx: &Receiver<ControlMsg>,
    events: &Receiver<PlayerEvent>,
    out: &mut W,
) -> Result<ExitCode, Box<dyn std::error::Error>>
where
    Q: MediaQueue + Transport,
    W: Write,
{
    let mut input_closed = false;

    loop {
        let wait = player
            .next_poll()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_WAIT);

        match rx.recv_timeout(wait) {
            Ok(ControlMsg::Command(command)) => match commands::apply(player, command, out) {
                Ok(Outcome::Continue) => {}
                Ok(Outcome::Quit) => break,
                Err(CommandError::Player(err)) => report(out, &err)?,
                Err(CommandError::Io(err)) => return Err(err.into()),
            },
            Ok(ControlMsg::Device(event)) => player.handle_device_event(event),
            Ok(ControlMsg::InputClosed) => {
                debug!("input closed");
                input_closed = true;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        player.poll_position(Instant::now());
        for event in events.try_iter() {
            announce(player, &event, out)?;
        }
        out.flush()?;

        if input_closed && player.state() != PlaybackState::Playing {
            break;
        }
    }

    // Dropping the queue fades out whatever is still audible.
    Ok(ExitCode::SUCCESS)
}

fn report<W: Write>(out: &mut W, err: &PlayerError) -> io::Result<()> {
    writeln!(out, "error: {err}")
}

fn announce<Q, W>(player: &Player<Q>, event: &PlayerEvent, out: &mut W) -> io::Result<()>
where
    Q: MediaQueue + Transport,
    W: Write,
{
    match event {
        PlayerEvent::MediaChanged => match (player.current_index(), player.current_track()) {
            (Some(i), Some(track)) => {
                writeln!(out, "now playing: {}", commands::describe(track, i))
            }
            _ => writeln!(out, "now playing: nothing"),
        },
        PlayerEvent::PlaybackStarted => writeln!(out, "playing"),
        PlayerEvent::PlaybackPaused => writeln!(out, "paused"),
        PlayerEvent::PlaybackStopped => writeln!(out, "stopped"),
        PlayerEvent::PositionSet(seconds) => {
            writeln!(out, "position: {}", to_hhmmss(*seconds))
        }
        PlayerEvent::PlaylistChanged | PlayerEvent::RateChanged(_) => Ok(()),
    }
}
