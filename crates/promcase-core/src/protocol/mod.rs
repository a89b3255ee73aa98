//! Wire protocol modules.
//!
//! One UDP datagram carries one line:
//!
//! ```text
//! type|name|help|labels|action|args
//! h|test_hist|Test histogram||o|v=1.0005,b=1#2#5
//! ```
//!
//! Parsing here is purely syntactic. Type and action codes are carried through
//! as received and numbers stay strings; the registry interprets both when it
//! applies the update.

pub mod datagram;
pub mod kind;
pub mod line;

pub use kind::{Action, MetricKind};
pub use line::{parse_line, Update};
