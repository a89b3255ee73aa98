//! UDP receive loop.
//!
//! Responsibilities:
//! - Receive one datagram at a time into a buffer one byte larger than the
//!   limit, so an oversized datagram is detected instead of truncated
//! - Decode it into an `Update` (decode errors are logged and dropped)
//! - Enqueue without waiting (a full queue drops the update)

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;

use promcase_core::error::{PromcaseError, Result};
use promcase_core::protocol::datagram::decode_datagram;

use crate::dispatch::QueueSender;
use crate::obs::BridgeMetrics;

pub struct UdpReceiver {
    socket: UdpSocket,
    max_datagram_bytes: usize,
    queue: QueueSender,
    metrics: Arc<BridgeMetrics>,
}

impl UdpReceiver {
    /// Bind the ingest socket. Failing to bind is fatal for the process.
    pub async fn bind(
        addr: SocketAddr,
        max_datagram_bytes: usize,
        queue: QueueSender,
        metrics: Arc<BridgeMetrics>,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket,
            max_datagram_bytes,
            queue,
            metrics,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Decode and enqueue one datagram.
    pub fn handle_datagram(&self, payload: Bytes, from: SocketAddr) -> Result<()> {
        self.metrics.datagrams_received.inc(&[]);

        if payload.len() > self.max_datagram_bytes {
            let e = PromcaseError::Oversized {
                max: self.max_datagram_bytes,
            };
            self.metrics.decode_errors.inc(&[("reason", e.reason())]);
            tracing::warn!(
                source = %from,
                max_datagram_bytes = self.max_datagram_bytes,
                "oversized datagram dropped"
            );
            return Err(e);
        }

        let update = match decode_datagram(payload.clone(), &from.to_string()) {
            Ok(u) => u,
            Err(e) => {
                self.metrics.decode_errors.inc(&[("reason", e.reason())]);
                tracing::error!(
                    error = %e,
                    code = e.code().as_str(),
                    source = %from,
                    raw = %String::from_utf8_lossy(&payload),
                    "datagram dropped"
                );
                return Err(e);
            }
        };

        self.queue.try_enqueue(update)
    }

    /// Receive forever. Socket errors are logged and the loop continues.
    pub async fn run(self) {
        let mut buf = vec![0u8; self.max_datagram_bytes + 1];
        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((n, from)) => {
                    let _ = self.handle_datagram(Bytes::copy_from_slice(&buf[..n]), from);
                }
                Err(e) => {
                    tracing::error!(error = %e, "udp receive failed");
                }
            }
        }
    }
}
