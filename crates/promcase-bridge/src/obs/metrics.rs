//! Bridge self-metrics.
//!
//! Counters for the ingest pipeline itself (datagrams, decode and apply
//! failures, queue drops). They live outside the user registry and are
//! appended to the `/metrics` body under the reserved `promcase_` prefix, which
//! producers cannot register.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dashmap::DashMap;

use crate::registry::render::format_labels;

/// Prefix reserved for bridge self-metrics.
pub const SELF_METRIC_PREFIX: &str = "promcase_";

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let mut key: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        key.sort();

        self.map
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for one label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        let mut key: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        key.sort();
        self.map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum across all label sets.
    pub fn total(&self) -> u64 {
        self.map.iter().map(|r| r.value().load(Ordering::Relaxed)).sum()
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, help);
        let _ = writeln!(out, "# TYPE {} counter", name);
        let mut rows: Vec<(Vec<(String, String)>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (key, val) in rows {
            let labels = format_labels(key.iter().map(|(k, v)| (k.as_str(), v.as_str())), None);
            let _ = writeln!(out, "{}{} {}", name, labels, val);
        }
    }
}

#[derive(Default)]
pub struct BridgeMetrics {
    pub datagrams_received: CounterVec,
    pub decode_errors: CounterVec,
    pub updates_enqueued: CounterVec,
    pub queue_dropped: CounterVec,
    pub updates_applied: CounterVec,
    pub apply_errors: CounterVec,
    draining: AtomicBool,
}

impl BridgeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    /// Render all self-metrics plus caller-provided gauges.
    pub fn render(&self, gauges: &[(&str, u64)]) -> String {
        let mut out = String::new();
        self.datagrams_received.render(
            "promcase_datagrams_received_total",
            "UDP datagrams received.",
            &mut out,
        );
        self.decode_errors.render(
            "promcase_decode_errors_total",
            "Datagrams dropped because they did not match the line protocol.",
            &mut out,
        );
        self.updates_enqueued.render(
            "promcase_updates_enqueued_total",
            "Decoded updates handed to the dispatch queue.",
            &mut out,
        );
        self.queue_dropped.render(
            "promcase_queue_dropped_total",
            "Decoded updates dropped because the dispatch queue was full.",
            &mut out,
        );
        self.updates_applied.render(
            "promcase_updates_applied_total",
            "Updates applied to the registry.",
            &mut out,
        );
        self.apply_errors.render(
            "promcase_apply_errors_total",
            "Updates rejected by the registry.",
            &mut out,
        );

        let _ = writeln!(
            out,
            "# TYPE promcase_draining gauge\npromcase_draining {}",
            u8::from(self.is_draining())
        );
        for (k, v) in gauges {
            let _ = writeln!(out, "# TYPE {} gauge\n{} {}", k, k, v);
        }
        out
    }
}
