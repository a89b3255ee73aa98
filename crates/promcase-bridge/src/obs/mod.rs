//! Bridge observability.
//!
//! Self-metrics are plain atomics rendered by the `/metrics` handler next to
//! the user registry. Logging goes through `tracing`; see `main.rs` for the
//! subscriber setup.

pub mod metrics;

pub use metrics::{BridgeMetrics, CounterVec};
