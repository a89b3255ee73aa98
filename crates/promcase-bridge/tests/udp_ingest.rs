#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use tokio::net::UdpSocket;

use promcase_bridge::app_state::AppState;
use promcase_bridge::config::BridgeConfig;
use promcase_bridge::ops;
use promcase_bridge::registry::SeriesValue;
use promcase_bridge::transport::UdpReceiver;

async fn start() -> (AppState, std::net::SocketAddr) {
    start_with(BridgeConfig::default()).await
}

async fn start_with(mut cfg: BridgeConfig) -> (AppState, std::net::SocketAddr) {
    cfg.udp.listen = "127.0.0.1:0".into();
    cfg.validate().unwrap();

    let (state, rx) = AppState::new(cfg).unwrap();
    tokio::spawn(state.dispatcher().run(rx));

    let udp = UdpReceiver::bind(
        state.cfg().udp.listen_addr().unwrap(),
        state.cfg().udp.max_datagram_bytes,
        state.queue(),
        state.metrics(),
    )
    .await
    .unwrap();
    let addr = udp.local_addr().unwrap();
    tokio::spawn(udp.run());
    (state, addr)
}

async fn wait_for<F: Fn() -> bool>(cond: F) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn datagrams_reach_registry_and_scrape() {
    let (state, addr) = start().await;
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    for line in [
        "c|orders_total|Orders placed|shop=eu|i|v=2\n",
        "c|orders_total|Orders placed|shop=eu|i|v=3\n",
        "h|test_hist|Test histogram||o|v=1.0005,b=1#2#5\n",
        "this is not a metric\n",
        "g|orders_total|Wrong kind||s|v=1\n",
    ] {
        client.send_to(line.as_bytes(), addr).await.unwrap();
    }

    let metrics = state.metrics();
    wait_for(|| metrics.updates_applied.total() + metrics.apply_errors.total() == 4).await;
    assert_eq!(metrics.datagrams_received.total(), 5);
    assert_eq!(metrics.decode_errors.get(&[("reason", "malformed")]), 1);
    assert_eq!(metrics.apply_errors.get(&[("reason", "name_kind_conflict")]), 1);

    let registry = state.registry();
    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.get("orders_total").unwrap().value(&["eu".to_string()]),
        Some(SeriesValue::Counter(5.0))
    );

    let resp = ops::metrics(State(state.clone())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4; charset=utf-8"
    );
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();

    assert!(body.contains("orders_total{shop=\"eu\"} 5\n"), "{body}");
    assert!(body.contains("test_hist_bucket{le=\"2\"} 1\n"), "{body}");
    assert!(body.contains("test_hist_bucket{le=\"+Inf\"} 1\n"), "{body}");
    assert!(body.contains("test_hist_count 1\n"), "{body}");
    assert!(body.contains("promcase_instruments 2\n"), "{body}");
    assert!(body.contains("promcase_decode_errors_total{reason=\"malformed\"} 1\n"), "{body}");
}

#[tokio::test]
async fn oversized_datagram_is_dropped_not_truncated() {
    let mut cfg = BridgeConfig::default();
    cfg.udp.max_datagram_bytes = 16;
    let (state, addr) = start_with(cfg).await;
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    // 20 bytes; the first 16 would still parse as `v=12`.
    client.send_to(b"g|temp|T||s|v=123456", addr).await.unwrap();
    client.send_to(b"g|temp|T||s|v=7", addr).await.unwrap();

    let metrics = state.metrics();
    wait_for(|| metrics.updates_applied.total() == 1).await;
    assert_eq!(metrics.datagrams_received.total(), 2);
    assert_eq!(metrics.decode_errors.get(&[("reason", "oversized")]), 1);
    assert_eq!(
        state.registry().get("temp").unwrap().value(&[]),
        Some(SeriesValue::Gauge(7.0))
    );
}

#[tokio::test]
async fn readiness_follows_draining() {
    let (state, _) = start().await;

    let resp = axum::response::IntoResponse::into_response(ops::readyz(State(state.clone())).await);
    assert_eq!(resp.status(), StatusCode::OK);

    state.set_draining();
    let resp = axum::response::IntoResponse::into_response(ops::readyz(State(state.clone())).await);
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
