#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use promcase_bridge::obs::BridgeMetrics;
use promcase_bridge::registry::render::{escape_label, format_value, render};
use promcase_bridge::registry::Registry;
use promcase_core::protocol::parse_line;

fn apply(reg: &Registry, line: &str) {
    reg.apply(&parse_line(line, "127.0.0.1:1").unwrap()).unwrap();
}

#[test]
fn renders_histogram_with_cumulative_buckets() {
    let reg = Registry::new();
    for v in ["0.5", "1.5", "3", "10"] {
        apply(&reg, &format!("h|rt_seconds|Response time|path=/a|o|v={v},b=1#2.5#5"));
    }

    let body = render(&reg);
    let expected = "\
# HELP rt_seconds Response time
# TYPE rt_seconds histogram
rt_seconds_bucket{path=\"/a\",le=\"1\"} 1
rt_seconds_bucket{path=\"/a\",le=\"2.5\"} 2
rt_seconds_bucket{path=\"/a\",le=\"5\"} 3
rt_seconds_bucket{path=\"/a\",le=\"+Inf\"} 4
rt_seconds_sum{path=\"/a\"} 15
rt_seconds_count{path=\"/a\"} 4
";
    assert_eq!(body, expected);
}

#[test]
fn renders_instruments_in_name_order_with_sorted_series() {
    let reg = Registry::new();
    apply(&reg, "g|zeta|Last one|host=b|s|v=2");
    apply(&reg, "g|zeta|Last one|host=a|s|v=1.5");
    apply(&reg, "c|alpha_total|First one||i|v=1");

    let body = render(&reg);
    let expected = "\
# HELP alpha_total First one
# TYPE alpha_total counter
alpha_total 1
# HELP zeta Last one
# TYPE zeta gauge
zeta{host=\"a\"} 1.5
zeta{host=\"b\"} 2
";
    assert_eq!(body, expected);
}

#[test]
fn escapes_help_and_label_values() {
    let reg = Registry::new();
    apply(&reg, "g|quoted|Has \\ backslash|v=a\"b\\c|s|v=1");

    let body = render(&reg);
    assert!(body.contains("# HELP quoted Has \\\\ backslash\n"), "{body}");
    assert!(body.contains("quoted{v=\"a\\\"b\\\\c\"} 1\n"), "{body}");
    assert_eq!(escape_label("line\nbreak"), "line\\nbreak");
}

#[test]
fn formats_special_values() {
    assert_eq!(format_value(f64::INFINITY), "+Inf");
    assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
    assert_eq!(format_value(f64::NAN), "NaN");
    assert_eq!(format_value(0.25), "0.25");
    assert_eq!(format_value(3.0), "3");
}

#[test]
fn self_metrics_render_after_counters() {
    let metrics = BridgeMetrics::new();
    metrics.apply_errors.inc(&[("reason", "unknown_kind")]);
    metrics.apply_errors.inc(&[("reason", "unknown_kind")]);
    metrics.queue_dropped.inc(&[]);

    let body = metrics.render(&[("promcase_queue_depth", 7)]);
    assert!(body.contains("# TYPE promcase_apply_errors_total counter\n"));
    assert!(body.contains("promcase_apply_errors_total{reason=\"unknown_kind\"} 2\n"));
    assert!(body.contains("promcase_queue_dropped_total 1\n"));
    assert!(body.contains("promcase_draining 0\n"));
    assert!(body.ends_with("# TYPE promcase_queue_depth gauge\npromcase_queue_depth 7\n"));
}
