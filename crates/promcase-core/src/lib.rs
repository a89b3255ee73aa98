//! promcase core: the UDP line protocol, update model, and error types.
//!
//! This crate defines the wire-level contract between metric producers and the
//! bridge. It carries no transport or runtime dependencies so it can be reused
//! by producers, tooling, and tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Any datagram, however malformed, surfaces as `PromcaseError` instead of
//! taking the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, PromcaseError, Result};
pub use protocol::{Action, MetricKind, Update};
