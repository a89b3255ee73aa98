//! Shared application state for the bridge.
//!
//! Owns the registry, self-metrics and the producer side of the dispatch
//! queue. Built once in `main` (or a test) and cloned into the UDP receiver,
//! dispatcher, and HTTP handlers; there is no process-wide singleton.

use std::sync::Arc;

use promcase_core::error::Result;

use crate::config::BridgeConfig;
use crate::dispatch::{self, Dispatcher, QueueReceiver, QueueSender};
use crate::obs::BridgeMetrics;
use crate::registry::{render, Registry};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: BridgeConfig,
    registry: Arc<Registry>,
    metrics: Arc<BridgeMetrics>,
    queue: QueueSender,
}

impl AppState {
    /// Build application state and the consumer end of the dispatch queue.
    pub fn new(cfg: BridgeConfig) -> Result<(Self, QueueReceiver)> {
        let registry = Arc::new(Registry::with_default_buckets(
            cfg.registry.default_buckets.clone(),
        )?);
        let metrics = Arc::new(BridgeMetrics::new());
        let (queue, rx) = dispatch::channel(cfg.queue.capacity, Arc::clone(&metrics));

        Ok((
            Self {
                inner: Arc::new(AppStateInner {
                    cfg,
                    registry,
                    metrics,
                    queue,
                }),
            },
            rx,
        ))
    }

    pub fn cfg(&self) -> &BridgeConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn queue(&self) -> QueueSender {
        self.inner.queue.clone()
    }

    /// Dispatcher applying to this state's registry.
    pub fn dispatcher(&self) -> Dispatcher<Registry> {
        Dispatcher::new(self.registry(), self.metrics())
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Point-in-time gauges rendered after the counters.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("promcase_queue_depth", self.inner.queue.depth() as u64),
            ("promcase_queue_capacity", self.inner.queue.max_capacity() as u64),
            ("promcase_instruments", self.inner.registry.len() as u64),
        ]
    }

    /// Full scrape body: user instruments, then bridge self-metrics.
    pub fn render_metrics(&self) -> String {
        let mut body = render::render(&self.inner.registry);
        body.push_str(&self.inner.metrics.render(&self.metrics_extra()));
        body
    }
}
