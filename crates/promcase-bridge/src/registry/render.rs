//! Prometheus text exposition (format 0.0.4).

use std::fmt::Write;

use crate::registry::instrument::{Instrument, SeriesValue};
use crate::registry::Registry;

/// Content type served with the rendered body.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Escape a label value.
pub fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Escape help text (quotes stay as-is).
pub fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a sample value the way Prometheus parses it back.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

/// `{k="v",...}` or the empty string when there are no labels.
pub fn format_labels<'a, I>(pairs: I, extra: Option<(&str, &str)>) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut parts: Vec<String> = pairs
        .into_iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some((k, v)) = extra {
        parts.push(format!("{}=\"{}\"", k, escape_label(v)));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

/// Render one instrument: `# HELP`, `# TYPE`, then every series in label order.
pub fn write_instrument(out: &mut String, instrument: &Instrument) {
    let name = instrument.name();
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(instrument.help()));
    let _ = writeln!(out, "# TYPE {} {}", name, instrument.kind().as_str());

    let label_names = instrument.label_names();
    for (values, value) in instrument.snapshot() {
        let pairs = || {
            label_names
                .iter()
                .map(String::as_str)
                .zip(values.iter().map(String::as_str))
        };
        match value {
            SeriesValue::Counter(v) | SeriesValue::Gauge(v) => {
                let _ = writeln!(out, "{}{} {}", name, format_labels(pairs(), None), format_value(v));
            }
            SeriesValue::Histogram(h) => {
                for (le, count) in instrument.bounds().iter().zip(&h.buckets) {
                    let le = format_value(*le);
                    let _ = writeln!(
                        out,
                        "{}_bucket{} {}",
                        name,
                        format_labels(pairs(), Some(("le", le.as_str()))),
                        count
                    );
                }
                let _ = writeln!(
                    out,
                    "{}_bucket{} {}",
                    name,
                    format_labels(pairs(), Some(("le", "+Inf"))),
                    h.count
                );
                let labels = format_labels(pairs(), None);
                let _ = writeln!(out, "{}_sum{} {}", name, labels, format_value(h.sum));
                let _ = writeln!(out, "{}_count{} {}", name, labels, h.count);
            }
        }
    }
}

/// Render every instrument in name order.
pub fn render(registry: &Registry) -> String {
    let mut out = String::new();
    for instrument in registry.instruments() {
        write_instrument(&mut out, &instrument);
    }
    out
}
