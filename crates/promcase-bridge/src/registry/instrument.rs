//! Instruments and their series cells.
//!
//! Every cell is built from atomics so a scrape can read a series while the
//! dispatcher mutates it. Floats are stored as bits in `AtomicU64` and updated
//! with compare-and-swap loops. Cells of one histogram series are updated one
//! by one, so a reader may see a count that is one observation ahead of the sum.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use promcase_core::error::{PromcaseError, Result};
use promcase_core::protocol::{Action, MetricKind};

/// Label values ordered like the instrument's sorted label names.
pub type LabelValues = Vec<String>;

#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl AtomicF64 {
    pub fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Release);
    }

    pub fn add(&self, v: f64) {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + v).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

/// One histogram series: cumulative bucket counts, sum, and total count.
#[derive(Debug)]
pub struct HistogramCell {
    buckets: Vec<AtomicU64>,
    sum: AtomicF64,
    count: AtomicU64,
}

impl HistogramCell {
    fn new(bounds: usize) -> Self {
        Self {
            buckets: (0..bounds).map(|_| AtomicU64::new(0)).collect(),
            sum: AtomicF64::default(),
            count: AtomicU64::new(0),
        }
    }

    fn observe(&self, bounds: &[f64], v: f64) {
        for (bucket, &le) in self.buckets.iter().zip(bounds) {
            if v <= le {
                bucket.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.sum.add(v);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            buckets: self
                .buckets
                .iter()
                .map(|b| b.load(Ordering::Relaxed))
                .collect(),
            sum: self.sum.get(),
            count: self.count.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// Cumulative counts, one per bound.
    pub buckets: Vec<u64>,
    pub sum: f64,
    /// Equals the `+Inf` bucket.
    pub count: u64,
}

/// Point-in-time value of one series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValue {
    Counter(f64),
    Gauge(f64),
    Histogram(HistogramSnapshot),
}

enum Series {
    Counter(DashMap<LabelValues, AtomicF64>),
    Gauge(DashMap<LabelValues, AtomicF64>),
    Histogram {
        bounds: Vec<f64>,
        cells: DashMap<LabelValues, HistogramCell>,
    },
}

/// A named, typed metric with a fixed label schema.
pub struct Instrument {
    name: String,
    help: String,
    label_names: Vec<String>,
    series: Series,
}

impl Instrument {
    pub fn counter(name: String, help: String, label_names: Vec<String>) -> Self {
        Self::with_series(name, help, label_names, Series::Counter(DashMap::new()))
    }

    pub fn gauge(name: String, help: String, label_names: Vec<String>) -> Self {
        Self::with_series(name, help, label_names, Series::Gauge(DashMap::new()))
    }

    /// `bounds` must already be validated (finite, strictly ascending).
    pub fn histogram(name: String, help: String, label_names: Vec<String>, bounds: Vec<f64>) -> Self {
        Self::with_series(
            name,
            help,
            label_names,
            Series::Histogram {
                bounds,
                cells: DashMap::new(),
            },
        )
    }

    fn with_series(name: String, help: String, mut label_names: Vec<String>, series: Series) -> Self {
        label_names.sort();
        Self {
            name,
            help,
            label_names,
            series,
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self.series {
            Series::Counter(_) => MetricKind::Counter,
            Series::Gauge(_) => MetricKind::Gauge,
            Series::Histogram { .. } => MetricKind::Histogram,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    /// Sorted label names fixed at creation.
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Histogram bucket bounds; empty for other kinds.
    pub fn bounds(&self) -> &[f64] {
        match &self.series {
            Series::Histogram { bounds, .. } => bounds,
            _ => &[],
        }
    }

    pub fn series_count(&self) -> usize {
        match &self.series {
            Series::Counter(m) | Series::Gauge(m) => m.len(),
            Series::Histogram { cells, .. } => cells.len(),
        }
    }

    /// Apply a validated action to the series for `values`.
    ///
    /// `values` must be ordered like `label_names()`. A series cell is created
    /// on first sight of a label assignment and kept for the process lifetime.
    /// The operand is not range-checked here; `Registry::apply` does that.
    pub fn apply(&self, action: Action, values: LabelValues, v: f64) -> Result<()> {
        match (&self.series, action) {
            (Series::Counter(m), Action::Increment) => m.entry(values).or_default().add(v),
            (Series::Gauge(m), Action::Increment) => m.entry(values).or_default().add(v),
            (Series::Gauge(m), Action::Decrement) => m.entry(values).or_default().add(-v),
            (Series::Gauge(m), Action::Set) => m.entry(values).or_default().set(v),
            (Series::Histogram { bounds, cells }, Action::Observe) => {
                cells
                    .entry(values)
                    .or_insert_with(|| HistogramCell::new(bounds.len()))
                    .observe(bounds, v);
            }
            (_, action) => {
                return Err(PromcaseError::InvalidAction {
                    kind: self.kind().as_str(),
                    action: action.code().to_string(),
                })
            }
        }
        Ok(())
    }

    /// Sorted copy of every series.
    pub fn snapshot(&self) -> Vec<(LabelValues, SeriesValue)> {
        let mut out: Vec<(LabelValues, SeriesValue)> = match &self.series {
            Series::Counter(m) => m
                .iter()
                .map(|r| (r.key().clone(), SeriesValue::Counter(r.value().get())))
                .collect(),
            Series::Gauge(m) => m
                .iter()
                .map(|r| (r.key().clone(), SeriesValue::Gauge(r.value().get())))
                .collect(),
            Series::Histogram { cells, .. } => cells
                .iter()
                .map(|r| (r.key().clone(), SeriesValue::Histogram(r.value().snapshot())))
                .collect(),
        };
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Current value of the series for `values`, if it exists.
    pub fn value(&self, values: &[String]) -> Option<SeriesValue> {
        match &self.series {
            Series::Counter(m) => m.get(values).map(|r| SeriesValue::Counter(r.get())),
            Series::Gauge(m) => m.get(values).map(|r| SeriesValue::Gauge(r.get())),
            Series::Histogram { cells, .. } => cells
                .get(values)
                .map(|r| SeriesValue::Histogram(r.snapshot())),
        }
    }
}
