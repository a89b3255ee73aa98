//! Line parser vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use promcase_core::protocol::{parse_line, Action, MetricKind};

mod vector_loader;
use vector_loader::{load, ALL};

#[test]
fn line_vectors() {
    for f in ALL {
        let v = load(f);
        let res = parse_line(&v.line, &v.from);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            if let Some(reason) = err.reason {
                assert_eq!(e.reason(), reason, "vector={}", v.description);
            }
            continue;
        }

        let update = res.expect("expected ok update");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(update.metric_type, ex.metric_type, "vector={}", v.description);
        assert_eq!(update.name, ex.name, "vector={}", v.description);
        assert_eq!(update.help, ex.help, "vector={}", v.description);
        assert_eq!(update.labels, ex.labels, "vector={}", v.description);
        assert_eq!(update.action, ex.action, "vector={}", v.description);
        assert_eq!(update.args, ex.args, "vector={}", v.description);
        assert_eq!(update.source, v.from, "vector={}", v.description);
        assert!(!update.raw.ends_with('\n'), "vector={}", v.description);
    }
}

#[test]
fn resolves_known_codes() {
    let u = parse_line("g|queue_depth|Depth|shard=1|d|v=3", "a").unwrap();
    assert_eq!(u.kind(), Some(MetricKind::Gauge));
    assert_eq!(u.action_kind(), Some(Action::Decrement));
    assert_eq!(u.arg("v"), Some("3"));
    assert_eq!(u.label_names(), vec!["shard".to_string()]);

    let u = parse_line("q|n|h||x|v=1", "a").unwrap();
    assert_eq!(u.kind(), None);
    assert_eq!(u.action_kind(), None);
}

#[test]
fn duplicate_keys_keep_last_value() {
    let u = parse_line("c|n|h|k=a,k=b|i|v=1,v=2", "a").unwrap();
    assert_eq!(u.labels.get("k").map(String::as_str), Some("b"));
    assert_eq!(u.arg("v"), Some("2"));
}

#[test]
fn non_numeric_operand_decodes() {
    let u = parse_line("c|n|h||i|v=abc", "a").unwrap();
    assert_eq!(u.arg("v"), Some("abc"));
}

#[test]
fn kind_action_table() {
    assert!(MetricKind::Counter.accepts(Action::Increment));
    assert!(!MetricKind::Counter.accepts(Action::Set));
    assert!(MetricKind::Gauge.accepts(Action::Decrement));
    assert!(!MetricKind::Gauge.accepts(Action::Observe));
    assert!(MetricKind::Histogram.accepts(Action::Observe));
    assert!(!MetricKind::Histogram.accepts(Action::Increment));
}
