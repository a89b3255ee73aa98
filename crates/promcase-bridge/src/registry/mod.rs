//! Metric registry: lazily created, typed instruments and their exposition.
//!
//! The registry is an owned value shared through `Arc` by the dispatcher (sole
//! writer) and the `/metrics` handler (reader). Series cardinality is not
//! bounded; every label assignment ever seen stays until the process exits.

pub mod instrument;
pub mod render;
mod store;

pub use instrument::{HistogramSnapshot, Instrument, LabelValues, SeriesValue};
pub use store::{parse_buckets, validate_bounds, Registry, DEFAULT_BUCKETS};
