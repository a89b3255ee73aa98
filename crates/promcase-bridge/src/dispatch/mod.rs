//! Dispatch queue and consumer loop.
//!
//! The UDP path enqueues without waiting; a single dispatcher task drains the
//! queue in FIFO order and applies each update through the `ApplyUpdate` seam.

pub mod dispatcher;
pub mod queue;

pub use dispatcher::{ApplyUpdate, Dispatcher};
pub use queue::{channel, QueueReceiver, QueueSender};
