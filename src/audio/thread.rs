use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::config::AudioSettings;
use crate::library::TrackId;
use crate::queue::{DeviceError, DeviceEvent};

use super::sink::create_sink_at;
use super::types::{ClockHandle, DeviceCmd, EventSink, QueuedTrack};

/// How often the device checks for a drained sink and refreshes the clock.
const TICK: Duration = Duration::from_millis(200);

/// Spawn the device thread. The outcome of opening the output stream is
/// reported once on `ready`.
pub(super) fn spawn_device_thread(
    rx: Receiver<DeviceCmd>,
    clock: ClockHandle,
    events: EventSink,
    settings: AudioSettings,
    ready: SyncSender<Result<(), DeviceError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(err) => {
                let _ = ready.send(Err(DeviceError::Output(err.to_string())));
                return;
            }
        };
        // rodio logs to stderr when the stream is dropped; that would land in
        // the middle of the shell output.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut device = Device::new(stream, settings, clock, events);
        loop {
            match rx.recv_timeout(TICK) {
                Ok(DeviceCmd::Quit { fade_out_ms }) => {
                    device.quit(fade_out_ms);
                    break;
                }
                Ok(cmd) => device.handle(cmd),
                Err(RecvTimeoutError::Timeout) => device.tick(),
                Err(RecvTimeoutError::Disconnected) => {
                    device.quit(0);
                    break;
                }
            }
            device.publish_clock();
        }
        debug!("device thread finished");
    })
}

struct Playing {
    track: QueuedTrack,
    sink: Sink,
    duration: f64,
}

struct Device {
    stream: OutputStream,
    settings: AudioSettings,
    clock: ClockHandle,
    events: EventSink,
    current: Option<Playing>,
    pending: VecDeque<QueuedTrack>,
    /// Output suspended on request.
    paused: bool,
    /// Ran out of items on its own; an append starts output again.
    drained: bool,
    volume: f32,
}

impl Device {
    fn new(stream: OutputStream, settings: AudioSettings, clock: ClockHandle, events: EventSink) -> Self {
        let volume = settings.volume;
        Self {
            stream,
            settings,
            clock,
            events,
            current: None,
            pending: VecDeque::new(),
            paused: true,
            drained: false,
            volume,
        }
    }

    fn emit(&self, event: DeviceEvent) {
        (self.events)(event);
    }

    fn handle(&mut self, cmd: DeviceCmd) {
        match cmd {
            DeviceCmd::Load { track, autoplay } => {
                self.drained = false;
                if !self.start(track, autoplay) {
                    self.start_next(autoplay);
                }
            }
            DeviceCmd::Append(track) => {
                self.pending.push_back(track);
                if self.drained && self.current.is_none() && self.start_next(true) {
                    self.emit(DeviceEvent::RateChanged(1.0));
                }
            }
            DeviceCmd::ClearPending => self.pending.clear(),
            DeviceCmd::Clear => {
                if let Some(playing) = self.current.take() {
                    playing.sink.stop();
                }
                self.pending.clear();
                self.paused = true;
                self.drained = false;
            }
            DeviceCmd::Pause => {
                if let Some(playing) = &self.current {
                    playing.sink.pause();
                }
                self.paused = true;
            }
            DeviceCmd::Resume => {
                if let Some(playing) = &self.current {
                    playing.sink.play();
                }
                self.paused = false;
            }
            DeviceCmd::Seek(seconds) => self.seek(seconds),
            DeviceCmd::SetVolume(volume) => {
                self.volume = volume;
                if let Some(playing) = &self.current {
                    playing.sink.set_volume(volume);
                }
            }
            // Handled by the thread loop.
            DeviceCmd::Quit { .. } => {}
        }
    }

    /// Replace the now-playing item with `track`. Returns `false` (after
    /// reporting an error) when the file cannot be played.
    fn start(&mut self, track: QueuedTrack, autoplay: bool) -> bool {
        let (new_sink, duration) = match create_sink_at(&self.stream, &track.path, Duration::ZERO) {
            Ok(created) => created,
            Err(err) => {
                warn!(track = %track.id, error = %err, "device cannot play item");
                if let Some(old) = self.current.take() {
                    old.sink.stop();
                }
                self.emit(DeviceEvent::Error {
                    track: Some(track.id),
                    message: err.to_string(),
                });
                return false;
            }
        };
        new_sink.set_volume(self.volume);

        if let Some(old) = self.current.take() {
            let crossfade = autoplay && !self.paused && self.settings.crossfade_ms > 0;
            if crossfade {
                self.crossfade(&old.sink, &new_sink);
            }
            old.sink.stop();
        }

        if autoplay {
            new_sink.play();
        }
        self.paused = !autoplay;
        let id = track.id;
        self.current = Some(Playing {
            track,
            sink: new_sink,
            duration,
        });
        self.emit(DeviceEvent::TrackStarted(id));
        true
    }

    /// Fade `old` out while `new` fades in. Blocks for the crossfade length;
    /// audio keeps running in rodio's mixer thread.
    fn crossfade(&self, old: &Sink, new: &Sink) {
        let steps = self.settings.crossfade_steps.max(1);
        let step_ms = (self.settings.crossfade_ms / steps).max(1);

        new.set_volume(0.0);
        new.play();
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            old.set_volume(self.volume * (1.0 - t));
            new.set_volume(self.volume * t);
            thread::sleep(Duration::from_millis(step_ms));
        }
    }

    /// Start the first playable pending item. Returns whether one started.
    fn start_next(&mut self, autoplay: bool) -> bool {
        while let Some(track) = self.pending.pop_front() {
            if self.start(track, autoplay) {
                return true;
            }
        }
        false
    }

    fn seek(&mut self, seconds: f64) {
        let Some(playing) = &self.current else {
            return;
        };
        let target = Duration::from_secs_f64(seconds.max(0.0));
        if playing.sink.try_seek(target).is_ok() {
            return;
        }

        // Not every decoder seeks; rebuild the sink and skip into the file.
        debug!(track = %playing.track.id, "seek unsupported, rebuilding sink");
        match create_sink_at(&self.stream, &playing.track.path, target) {
            Ok((sink, _)) => {
                sink.set_volume(self.volume);
                if !self.paused {
                    sink.play();
                }
                if let Some(playing) = self.current.as_mut() {
                    playing.sink.stop();
                    playing.sink = sink;
                }
            }
            Err(err) => warn!(error = %err, "seek failed"),
        }
    }

    /// Periodic check for natural completion.
    fn tick(&mut self) {
        let finished: Option<TrackId> = match &self.current {
            Some(playing) if !self.paused && playing.sink.empty() => Some(playing.track.id),
            _ => None,
        };
        let Some(id) = finished else {
            return;
        };

        self.current = None;
        self.emit(DeviceEvent::TrackFinished(id));
        if !self.start_next(true) {
            self.drained = true;
            self.emit(DeviceEvent::RateChanged(0.0));
        }
    }

    fn publish_clock(&self) {
        if let Ok(mut clock) = self.clock.lock() {
            match &self.current {
                Some(playing) => {
                    clock.track = Some(playing.track.id);
                    clock.position = playing.sink.get_pos().as_secs_f64();
                    clock.duration = playing.duration;
                }
                None => {
                    clock.track = None;
                    clock.position = 0.0;
                    clock.duration = 0.0;
                }
            }
        }
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(playing) = self.current.take() {
            if !self.paused {
                fade_out_sink(&playing.sink, self.volume, fade_out_ms);
            }
            playing.sink.stop();
        }
        self.pending.clear();
    }
}

fn fade_out_sink(sink: &Sink, volume: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(volume * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
