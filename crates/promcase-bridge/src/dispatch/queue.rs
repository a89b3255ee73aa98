//! Bounded FIFO between the receive path and the dispatcher.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use promcase_core::error::{PromcaseError, Result};
use promcase_core::protocol::Update;

use crate::obs::BridgeMetrics;

/// Create a queue holding at most `capacity` updates.
pub fn channel(capacity: usize, metrics: Arc<BridgeMetrics>) -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (QueueSender { tx, metrics }, QueueReceiver { rx })
}

/// Producer side. Cheap to clone; never waits.
#[derive(Clone)]
pub struct QueueSender {
    tx: mpsc::Sender<Update>,
    metrics: Arc<BridgeMetrics>,
}

impl QueueSender {
    /// Enqueue without waiting. A full queue drops the update, counts the drop,
    /// and returns `QueueFull`.
    pub fn try_enqueue(&self, update: Update) -> Result<()> {
        match self.tx.try_send(update) {
            Ok(()) => {
                self.metrics.updates_enqueued.inc(&[]);
                Ok(())
            }
            Err(TrySendError::Full(dropped)) => {
                self.metrics.queue_dropped.inc(&[]);
                tracing::warn!(
                    name = %dropped.name,
                    source = %dropped.source,
                    capacity = self.tx.max_capacity(),
                    "dispatch queue full, update dropped"
                );
                Err(PromcaseError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => Err(PromcaseError::QueueClosed),
        }
    }

    /// Updates currently waiting for the dispatcher.
    pub fn depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Consumer side, owned by the dispatcher.
pub struct QueueReceiver {
    rx: mpsc::Receiver<Update>,
}

impl QueueReceiver {
    /// Next update in FIFO order; `None` once every sender is gone and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<Update> {
        self.rx.recv().await
    }
}
