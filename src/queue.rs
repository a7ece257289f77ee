//! The media queue boundary and the reconciler that keeps it in step with
//! the playlist.
//!
//! The device side only supports replacing the now-playing slot, appending
//! upcoming items and draining from the front. The playlist is edited freely,
//! so every edit is followed by a reconciliation pass that rebuilds as little
//! of the device queue as possible.

mod adapter;
mod memory;
mod reconciler;

pub use adapter::{DeviceError, DeviceEvent, MediaQueue, Transport};
pub use memory::{MemoryQueue, QueueOp};
pub use reconciler::{
    Follow, LoadRejected, PendingChange, QueueReconciler, Reconciliation, SlotChange, Start,
    follow_current,
};

#[cfg(test)]
mod tests;
