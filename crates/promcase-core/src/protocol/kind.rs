//! Metric kinds and actions with their single-letter wire codes.

use std::fmt;

/// Metric type short codes used in the wire format.
pub const CODE_COUNTER: &str = "c";
pub const CODE_GAUGE: &str = "g";
pub const CODE_HISTOGRAM: &str = "h";

/// Action short codes used in the wire format.
pub const CODE_INCREMENT: &str = "i";
pub const CODE_DECREMENT: &str = "d";
pub const CODE_SET: &str = "s";
pub const CODE_OBSERVE: &str = "o";

/// Instrument kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    /// Resolve a wire code (`c`, `g`, `h`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            CODE_COUNTER => Some(MetricKind::Counter),
            CODE_GAUGE => Some(MetricKind::Gauge),
            CODE_HISTOGRAM => Some(MetricKind::Histogram),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            MetricKind::Counter => CODE_COUNTER,
            MetricKind::Gauge => CODE_GAUGE,
            MetricKind::Histogram => CODE_HISTOGRAM,
        }
    }

    /// Name used in `# TYPE` lines and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }

    /// Whether `action` may be applied to an instrument of this kind.
    pub fn accepts(self, action: Action) -> bool {
        matches!(
            (self, action),
            (MetricKind::Counter, Action::Increment)
                | (MetricKind::Gauge, Action::Increment)
                | (MetricKind::Gauge, Action::Decrement)
                | (MetricKind::Gauge, Action::Set)
                | (MetricKind::Histogram, Action::Observe)
        )
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutation requested by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Increment,
    Decrement,
    Set,
    Observe,
}

impl Action {
    /// Resolve a wire code (`i`, `d`, `s`, `o`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            CODE_INCREMENT => Some(Action::Increment),
            CODE_DECREMENT => Some(Action::Decrement),
            CODE_SET => Some(Action::Set),
            CODE_OBSERVE => Some(Action::Observe),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Action::Increment => CODE_INCREMENT,
            Action::Decrement => CODE_DECREMENT,
            Action::Set => CODE_SET,
            Action::Observe => CODE_OBSERVE,
        }
    }
}
