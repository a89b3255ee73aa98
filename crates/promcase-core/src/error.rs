//! Shared error type across promcase crates.

use thiserror::Error;

/// Stable error classes used in logs and the `code` label of error counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Raw line does not match the wire grammar.
    Decode,
    /// Decoded update is semantically invalid for the registry.
    Apply,
    /// Update could not be handed to the dispatch queue.
    Queue,
    /// Invalid or unreadable configuration.
    Config,
    /// Internal / IO failure.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Decode => "DECODE",
            ErrorCode::Apply => "APPLY",
            ErrorCode::Queue => "QUEUE",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PromcaseError>;

/// Unified error type used by core and bridge.
#[derive(Debug, Error)]
pub enum PromcaseError {
    #[error("malformed line: {0}")]
    Malformed(String),
    #[error("malformed action args: {0}")]
    BadArgs(String),
    #[error("datagram exceeds {max} bytes")]
    Oversized { max: usize },

    #[error("unknown metric type: {0:?}")]
    UnknownKind(String),
    #[error("action {action:?} is invalid for {kind}")]
    InvalidAction { kind: &'static str, action: String },
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("value is not sent for {kind}: {name}")]
    MissingOperand { kind: &'static str, name: String },
    #[error("invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid buckets: {0}")]
    InvalidBuckets(String),
    #[error("metric {name} is already registered as a {existing}, not a {requested}")]
    NameKindConflict {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },
    #[error("labels for {name} must be {expected:?}, got {got:?}")]
    LabelSchemaMismatch {
        name: String,
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("counter cannot decrease: {name} by {value}")]
    NegativeIncrement { name: String, value: f64 },

    #[error("dispatch queue is full")]
    QueueFull,
    #[error("dispatch queue is closed")]
    QueueClosed,

    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl PromcaseError {
    /// Map an error to its stable class.
    pub fn code(&self) -> ErrorCode {
        match self {
            PromcaseError::Malformed(_)
            | PromcaseError::BadArgs(_)
            | PromcaseError::Oversized { .. } => ErrorCode::Decode,
            PromcaseError::UnknownKind(_)
            | PromcaseError::InvalidAction { .. }
            | PromcaseError::InvalidName(_)
            | PromcaseError::MissingOperand { .. }
            | PromcaseError::InvalidNumber { .. }
            | PromcaseError::InvalidBuckets(_)
            | PromcaseError::NameKindConflict { .. }
            | PromcaseError::LabelSchemaMismatch { .. }
            | PromcaseError::NegativeIncrement { .. } => ErrorCode::Apply,
            PromcaseError::QueueFull | PromcaseError::QueueClosed => ErrorCode::Queue,
            PromcaseError::Config(_) | PromcaseError::UnsupportedVersion => ErrorCode::Config,
            PromcaseError::Io(_) | PromcaseError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Short machine-readable reason, used as the `reason` label of the
    /// apply-error counter.
    pub fn reason(&self) -> &'static str {
        match self {
            PromcaseError::Malformed(_) => "malformed",
            PromcaseError::BadArgs(_) => "bad_args",
            PromcaseError::Oversized { .. } => "oversized",
            PromcaseError::UnknownKind(_) => "unknown_kind",
            PromcaseError::InvalidAction { .. } => "invalid_action",
            PromcaseError::InvalidName(_) => "invalid_name",
            PromcaseError::MissingOperand { .. } => "missing_operand",
            PromcaseError::InvalidNumber { .. } => "invalid_number",
            PromcaseError::InvalidBuckets(_) => "invalid_buckets",
            PromcaseError::NameKindConflict { .. } => "name_kind_conflict",
            PromcaseError::LabelSchemaMismatch { .. } => "label_schema_mismatch",
            PromcaseError::NegativeIncrement { .. } => "negative_increment",
            PromcaseError::QueueFull => "queue_full",
            PromcaseError::QueueClosed => "queue_closed",
            PromcaseError::Config(_) => "config",
            PromcaseError::UnsupportedVersion => "unsupported_version",
            PromcaseError::Io(_) => "io",
            PromcaseError::Internal(_) => "internal",
        }
    }
}
