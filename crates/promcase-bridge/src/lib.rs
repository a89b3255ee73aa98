//! promcase bridge library entry.
//!
//! Wires the UDP transport, dispatch queue, metric registry, and HTTP
//! exposition into one service. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod registry;
pub mod router;
pub mod transport;
