use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use promcase_core::error::{PromcaseError, Result};
use promcase_core::protocol::line::{ARG_BUCKETS, ARG_VALUE};
use promcase_core::protocol::{MetricKind, Update};

use crate::dispatch::ApplyUpdate;
use crate::obs::metrics::SELF_METRIC_PREFIX;
use crate::registry::instrument::{Instrument, LabelValues};

/// Prometheus client default buckets.
pub const DEFAULT_BUCKETS: [f64; 11] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Counter increments default to one when `v` is absent.
const DEFAULT_COUNTER_OPERAND: &str = "1";

const BUCKET_SEPARATOR: char = '#';

/// Process-wide instrument store: `name -> Instrument`.
///
/// A name is bound to one kind and one label schema by the first update that
/// uses it. Creation goes through `DashMap::entry`, so concurrent appliers
/// still produce at most one instrument per name.
pub struct Registry {
    instruments: DashMap<String, Arc<Instrument>>,
    default_buckets: Vec<f64>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            instruments: DashMap::new(),
            default_buckets: DEFAULT_BUCKETS.to_vec(),
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose histograms fall back to `default_buckets` when an
    /// update carries no `b` arg.
    pub fn with_default_buckets(default_buckets: Vec<f64>) -> Result<Self> {
        validate_bounds(&default_buckets)?;
        Ok(Self {
            instruments: DashMap::new(),
            default_buckets,
        })
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Instrument>> {
        self.instruments.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Every instrument, sorted by name.
    pub fn instruments(&self) -> Vec<Arc<Instrument>> {
        let mut out: Vec<Arc<Instrument>> = self
            .instruments
            .iter()
            .map(|r| Arc::clone(r.value()))
            .collect();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        out
    }

    /// Apply one update.
    ///
    /// Every check runs before the instrument is touched, so a rejected update
    /// leaves the registry as it was.
    pub fn apply(&self, update: &Update) -> Result<()> {
        let kind = update
            .kind()
            .ok_or_else(|| PromcaseError::UnknownKind(update.metric_type.clone()))?;
        let action = update
            .action_kind()
            .filter(|a| kind.accepts(*a))
            .ok_or_else(|| PromcaseError::InvalidAction {
                kind: kind.as_str(),
                action: update.action.clone(),
            })?;

        validate_metric_name(&update.name)?;
        for label in update.labels.keys() {
            validate_label_name(kind, label)?;
        }
        let v = operand(kind, update)?;
        // Counters and histograms never recover from NaN or an infinity;
        // a gauge's next `s` does.
        if kind != MetricKind::Gauge && !v.is_finite() {
            return Err(PromcaseError::InvalidNumber {
                field: ARG_VALUE,
                value: v.to_string(),
            });
        }
        if kind == MetricKind::Counter && v < 0.0 {
            return Err(PromcaseError::NegativeIncrement {
                name: update.name.clone(),
                value: v,
            });
        }

        let instrument = self.get_or_create(kind, update)?;
        if instrument.kind() != kind {
            return Err(PromcaseError::NameKindConflict {
                name: update.name.clone(),
                existing: instrument.kind().as_str(),
                requested: kind.as_str(),
            });
        }
        if !instrument.label_names().iter().eq(update.labels.keys()) {
            return Err(PromcaseError::LabelSchemaMismatch {
                name: update.name.clone(),
                expected: instrument.label_names().to_vec(),
                got: update.label_names(),
            });
        }

        // BTreeMap iterates keys in sorted order, matching label_names().
        let values: LabelValues = update.labels.values().cloned().collect();
        instrument.apply(action, values, v)
    }

    fn get_or_create(&self, kind: MetricKind, update: &Update) -> Result<Arc<Instrument>> {
        if let Some(existing) = self.instruments.get(&update.name) {
            return Ok(Arc::clone(existing.value()));
        }

        match self.instruments.entry(update.name.clone()) {
            Entry::Occupied(e) => Ok(Arc::clone(e.get())),
            Entry::Vacant(e) => {
                let instrument = Arc::new(self.build(kind, update)?);
                tracing::info!(
                    name = %update.name,
                    kind = %kind,
                    labels = ?instrument.label_names(),
                    source = %update.source,
                    "instrument created"
                );
                Ok(Arc::clone(e.insert(instrument).value()))
            }
        }
    }

    fn build(&self, kind: MetricKind, update: &Update) -> Result<Instrument> {
        let name = update.name.clone();
        let help = update.help.clone();
        let labels = update.label_names();
        Ok(match kind {
            MetricKind::Counter => Instrument::counter(name, help, labels),
            MetricKind::Gauge => Instrument::gauge(name, help, labels),
            MetricKind::Histogram => {
                let bounds = match update.arg(ARG_BUCKETS) {
                    Some(spec) => parse_buckets(spec)?,
                    None => self.default_buckets.clone(),
                };
                Instrument::histogram(name, help, labels, bounds)
            }
        })
    }
}

impl ApplyUpdate for Registry {
    fn apply(&self, update: &Update) -> Result<()> {
        Registry::apply(self, update)
    }
}

fn operand(kind: MetricKind, update: &Update) -> Result<f64> {
    let raw = match (kind, update.arg(ARG_VALUE)) {
        (_, Some(v)) => v,
        (MetricKind::Counter, None) => DEFAULT_COUNTER_OPERAND,
        (kind, None) => {
            return Err(PromcaseError::MissingOperand {
                kind: kind.as_str(),
                name: update.name.clone(),
            })
        }
    };
    raw.parse::<f64>().map_err(|_| PromcaseError::InvalidNumber {
        field: ARG_VALUE,
        value: raw.to_string(),
    })
}

/// Parse a `#`-separated bucket spec such as `1#2#5`. A trailing `+Inf` is
/// implicit in every histogram and is dropped.
pub fn parse_buckets(spec: &str) -> Result<Vec<f64>> {
    let mut bounds = spec
        .split(BUCKET_SEPARATOR)
        .map(|s| {
            s.parse::<f64>().map_err(|_| PromcaseError::InvalidNumber {
                field: ARG_BUCKETS,
                value: s.to_string(),
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    if bounds.last() == Some(&f64::INFINITY) {
        bounds.pop();
    }
    validate_bounds(&bounds)?;
    Ok(bounds)
}

/// Bounds must be non-empty, finite, and strictly ascending.
pub fn validate_bounds(bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(PromcaseError::InvalidBuckets("at least one finite bound is required".into()));
    }
    if let Some(b) = bounds.iter().find(|b| !b.is_finite()) {
        return Err(PromcaseError::InvalidBuckets(format!("bound {b} is not finite")));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(PromcaseError::InvalidBuckets(format!(
            "bounds must be strictly ascending: {bounds:?}"
        )));
    }
    Ok(())
}

fn validate_metric_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        _ => false,
    };
    if !valid {
        return Err(PromcaseError::InvalidName(format!("metric name {name:?}")));
    }
    if name.starts_with(SELF_METRIC_PREFIX) {
        return Err(PromcaseError::InvalidName(format!(
            "metric name {name:?} uses the reserved {SELF_METRIC_PREFIX} prefix"
        )));
    }
    Ok(())
}

fn validate_label_name(kind: MetricKind, label: &str) -> Result<()> {
    let mut chars = label.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    // `__` is reserved by Prometheus; `le` carries histogram bucket bounds.
    if !valid || label.starts_with("__") || (kind == MetricKind::Histogram && label == "le") {
        return Err(PromcaseError::InvalidName(format!("label name {label:?}")));
    }
    Ok(())
}
