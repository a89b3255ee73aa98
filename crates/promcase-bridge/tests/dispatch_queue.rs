#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use promcase_bridge::dispatch::{channel, ApplyUpdate, Dispatcher};
use promcase_bridge::obs::BridgeMetrics;
use promcase_bridge::registry::{Registry, SeriesValue};
use promcase_core::error::PromcaseError;
use promcase_core::protocol::{parse_line, Update};

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<String>>,
}

impl ApplyUpdate for Recorder {
    fn apply(&self, update: &Update) -> promcase_core::Result<()> {
        self.seen.lock().unwrap().push(update.raw.clone());
        Ok(())
    }
}

fn update(i: usize) -> Update {
    parse_line(&format!("g|seq|Sequence||s|v={i}"), "127.0.0.1:1").unwrap()
}

#[tokio::test]
async fn overflow_drops_exactly_one_and_keeps_order() {
    let capacity = 16;
    let metrics = Arc::new(BridgeMetrics::new());
    let (tx, rx) = channel(capacity, Arc::clone(&metrics));

    let mut dropped = 0;
    for i in 0..=capacity {
        match tx.try_enqueue(update(i)) {
            Ok(()) => {}
            Err(PromcaseError::QueueFull) => dropped += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(dropped, 1);
    assert_eq!(tx.depth(), capacity);
    assert_eq!(metrics.queue_dropped.total(), 1);
    assert_eq!(metrics.updates_enqueued.total(), capacity as u64);

    let recorder = Arc::new(Recorder::default());
    drop(tx);
    Dispatcher::new(Arc::clone(&recorder), Arc::clone(&metrics))
        .run(rx)
        .await;

    let seen = recorder.seen.lock().unwrap().clone();
    let expected: Vec<String> = (0..capacity).map(|i| format!("g|seq|Sequence||s|v={i}")).collect();
    assert_eq!(seen, expected);
    assert_eq!(metrics.updates_applied.total(), capacity as u64);
}

#[tokio::test]
async fn dispatcher_survives_rejected_updates() {
    let metrics = Arc::new(BridgeMetrics::new());
    let registry = Arc::new(Registry::new());
    let (tx, rx) = channel(8, Arc::clone(&metrics));

    for line in [
        "c|hits|Hits||i|v=1",
        "g|hits|Hits||s|v=1",
        "c|hits|Hits||i|v=oops",
        "q|hits|Hits||i|v=1",
        "c|hits|Hits||i|v=2",
    ] {
        tx.try_enqueue(parse_line(line, "127.0.0.1:1").unwrap()).unwrap();
    }
    drop(tx);

    Dispatcher::new(Arc::clone(&registry), Arc::clone(&metrics))
        .run(rx)
        .await;

    assert_eq!(
        registry.get("hits").unwrap().value(&[]),
        Some(SeriesValue::Counter(3.0))
    );
    assert_eq!(metrics.updates_applied.total(), 2);
    assert_eq!(metrics.apply_errors.total(), 3);
    assert_eq!(metrics.apply_errors.get(&[("reason", "name_kind_conflict")]), 1);
    assert_eq!(metrics.apply_errors.get(&[("reason", "invalid_number")]), 1);
    assert_eq!(metrics.apply_errors.get(&[("reason", "unknown_kind")]), 1);
}

#[tokio::test]
async fn closed_queue_is_reported() {
    let metrics = Arc::new(BridgeMetrics::new());
    let (tx, rx) = channel(1, metrics);
    drop(rx);

    let err = tx.try_enqueue(update(0)).unwrap_err();
    assert_eq!(err.code().as_str(), "QUEUE");
    assert_eq!(err.reason(), "queue_closed");
}
