//! Top-level facade crate for promcase.
//!
//! Re-exports the wire protocol and the bridge library so users can depend on a single crate.

pub mod core {
    pub use promcase_core::*;
}

pub mod bridge {
    pub use promcase_bridge::*;
}
