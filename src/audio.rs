//! rodio output device.
//!
//! Decoding and output run on a dedicated thread that owns the rodio
//! stream. The control thread talks to it through [`RodioQueue`], which
//! mirrors the device queue so the reconciler can work against it without
//! waiting on the device.

mod mirror;
mod player;
mod sink;
mod thread;
mod types;

pub use player::RodioQueue;
pub use types::{ClockHandle, DeviceClock, EventSink};

#[cfg(test)]
mod tests;
