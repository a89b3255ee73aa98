use std::sync::Arc;

use promcase_core::error::Result;
use promcase_core::protocol::Update;

use crate::dispatch::queue::QueueReceiver;
use crate::obs::BridgeMetrics;

/// Destination of dequeued updates. Implemented by the registry; tests plug in
/// recording sinks.
pub trait ApplyUpdate: Send + Sync {
    fn apply(&self, update: &Update) -> Result<()>;
}

/// Single consumer of the dispatch queue.
pub struct Dispatcher<S: ApplyUpdate + ?Sized> {
    sink: Arc<S>,
    metrics: Arc<BridgeMetrics>,
}

impl<S: ApplyUpdate + ?Sized> Dispatcher<S> {
    pub fn new(sink: Arc<S>, metrics: Arc<BridgeMetrics>) -> Self {
        Self { sink, metrics }
    }

    /// Apply one update. Failures are logged and counted here; they only ever
    /// affect this update.
    pub fn process(&self, update: &Update) -> Result<()> {
        tracing::debug!(
            source = %update.source,
            metric_type = %update.metric_type,
            name = %update.name,
            labels = ?update.labels,
            action = %update.action,
            args = ?update.args,
            "received udp message"
        );

        let res = self.sink.apply(update);
        match &res {
            Ok(()) => self.metrics.updates_applied.inc(&[]),
            Err(e) => {
                self.metrics.apply_errors.inc(&[("reason", e.reason())]);
                tracing::error!(
                    error = %e,
                    code = e.code().as_str(),
                    source = %update.source,
                    name = %update.name,
                    raw = %update.raw,
                    "update rejected"
                );
            }
        }
        res
    }

    /// Drain the queue until every sender is dropped.
    pub async fn run(self, mut rx: QueueReceiver) {
        while let Some(update) = rx.recv().await {
            let _ = self.process(&update);
        }
        tracing::info!("dispatch queue closed, dispatcher stopped");
    }
}
