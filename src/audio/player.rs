use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;
use crate::library::{Track, TrackId};
use crate::queue::{DeviceError, MediaQueue, Transport};

use super::mirror::Mirror;
use super::sink::probe;
use super::thread::spawn_device_thread;
use super::types::{ClockHandle, DeviceClock, DeviceCmd, EventSink, QueuedTrack};

/// Media queue backed by the rodio device thread.
///
/// Queue calls return immediately: files are probed on the calling thread,
/// the command is sent to the device and the local mirror is updated. The
/// device reports back through the [`EventSink`] passed to [`open`].
///
/// [`open`]: RodioQueue::open
pub struct RodioQueue {
    tx: Sender<DeviceCmd>,
    clock: ClockHandle,
    mirror: Mirror,
    fade_out: Duration,
    join: Option<JoinHandle<()>>,
}

impl RodioQueue {
    /// Open the default output device.
    pub fn open(settings: &AudioSettings, events: EventSink) -> Result<Self, DeviceError> {
        let (tx, rx) = mpsc::channel::<DeviceCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let clock: ClockHandle = Arc::new(Mutex::new(DeviceClock::default()));

        let join = spawn_device_thread(rx, clock.clone(), events, settings.clone(), ready_tx);
        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let _ = join.join();
                return Err(err);
            }
            Err(_) => return Err(DeviceError::Disconnected),
        }

        Ok(Self {
            tx,
            clock,
            mirror: Mirror::default(),
            fade_out: Duration::from_millis(settings.quit_fade_out_ms),
            join: Some(join),
        })
    }

    fn send(&self, cmd: DeviceCmd) -> Result<(), DeviceError> {
        self.tx.send(cmd).map_err(|_| DeviceError::Disconnected)
    }

    /// For commands whose failure leaves nothing to undo.
    fn fire(&self, cmd: DeviceCmd) {
        if let Err(error) = self.send(cmd) {
            warn!(%error, "device command dropped");
        }
    }

    fn queued(track: &Track) -> QueuedTrack {
        QueuedTrack {
            id: track.id(),
            path: track.path().to_path_buf(),
        }
    }

    /// Snapshot of the device clock, if it describes the mirrored item.
    fn clock_for_now_playing(&self) -> Option<DeviceClock> {
        let now_playing = self.mirror.now_playing()?;
        let clock = self.clock.lock().ok()?.clone();
        (clock.track == Some(now_playing)).then_some(clock)
    }

    /// Fade out and stop the device thread. Safe to call more than once.
    pub fn quit_softly(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        let _ = self.send(DeviceCmd::Quit {
            fade_out_ms: self.fade_out.as_millis() as u64,
        });
        let _ = join.join();
    }
}

impl Drop for RodioQueue {
    fn drop(&mut self) {
        self.quit_softly();
    }
}

impl MediaQueue for RodioQueue {
    fn load(&mut self, track: &Track, autoplay: bool) -> Result<(), DeviceError> {
        probe(track.path())?;
        self.send(DeviceCmd::Load {
            track: Self::queued(track),
            autoplay,
        })?;
        self.mirror.load(track.id());
        Ok(())
    }

    fn append(&mut self, track: &Track) -> Result<(), DeviceError> {
        probe(track.path())?;
        self.send(DeviceCmd::Append(Self::queued(track)))?;
        self.mirror.append(track.id());
        Ok(())
    }

    fn clear_pending(&mut self) {
        self.fire(DeviceCmd::ClearPending);
        self.mirror.clear_pending();
    }

    fn clear(&mut self) {
        self.fire(DeviceCmd::Clear);
        self.mirror.clear();
    }

    fn advance(&mut self) -> Option<TrackId> {
        self.mirror.advance()
    }

    fn now_playing(&self) -> Option<TrackId> {
        self.mirror.now_playing()
    }

    fn pending(&self) -> Vec<TrackId> {
        self.mirror.pending()
    }

    fn pending_count(&self) -> usize {
        self.mirror.pending_count()
    }

    fn confirm_started(&mut self, started: TrackId) -> bool {
        self.mirror.confirm_started(started)
    }
}

impl Transport for RodioQueue {
    fn pause(&mut self) {
        self.fire(DeviceCmd::Pause);
    }

    fn resume(&mut self) {
        self.fire(DeviceCmd::Resume);
    }

    fn seek(&mut self, seconds: f64) {
        self.fire(DeviceCmd::Seek(seconds));
    }

    fn set_volume(&mut self, volume: f32) {
        self.fire(DeviceCmd::SetVolume(volume));
    }

    fn position(&self) -> f64 {
        self.clock_for_now_playing()
            .map(|clock| clock.position)
            .unwrap_or(0.0)
    }

    fn duration(&self) -> f64 {
        self.clock_for_now_playing()
            .map(|clock| clock.duration)
            .unwrap_or(0.0)
    }
}
