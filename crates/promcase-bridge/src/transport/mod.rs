//! Transport layer (UDP ingest).
//!
//! Turns datagrams into decoded updates and hands them to the dispatch queue.
//! HTTP exposition lives in `ops`.

pub mod udp;

pub use udp::UdpReceiver;
