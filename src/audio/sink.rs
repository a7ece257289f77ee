//! Helpers for opening files as rodio sources and sinks.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::queue::DeviceError;

fn unreadable(path: &Path, reason: impl ToString) -> DeviceError {
    DeviceError::Unreadable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>, DeviceError> {
    let file = File::open(path).map_err(|e| unreadable(path, e))?;
    Decoder::new(BufReader::new(file)).map_err(|e| unreadable(path, e))
}

/// Check that `path` opens and has a decodable header.
pub(super) fn probe(path: &Path) -> Result<(), DeviceError> {
    open_decoder(path).map(|_| ())
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
/// Also returns the source length in seconds (`0.0` when unknown).
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, f64), DeviceError> {
    let decoder = open_decoder(path)?;
    let duration = decoder
        .total_duration()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    // `skip_duration` is the fallback seeking primitive; Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, duration))
}
