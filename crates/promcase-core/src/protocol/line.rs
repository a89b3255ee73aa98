//! Line parser for `type|name|help|labels|action|args`.
//!
//! Parsing rules:
//! - `\n` is trimmed from both ends; any newline left inside the line is an error.
//! - Exactly six fields. Surplus `|` characters belong to the first field, so
//!   the last five fields never contain a pipe.
//! - Labels tolerate junk: tokens that are not a single `key=value` pair are
//!   skipped, which is how an empty labels field decodes to zero labels.
//! - Args do not: every token must be a single `key=value` pair, so an empty
//!   args field fails the whole line.
//! - Duplicate keys keep the last value.

use std::collections::BTreeMap;

use crate::error::{PromcaseError, Result};
use crate::protocol::kind::{Action, MetricKind};

const FIELD_SEPARATOR: char = '|';
const PAIR_SEPARATOR: char = ',';
const KEY_VALUE_SEPARATOR: char = '=';

/// Arg key carrying the numeric operand.
pub const ARG_VALUE: &str = "v";
/// Arg key carrying histogram bucket bounds (`#`-separated).
pub const ARG_BUCKETS: &str = "b";

/// One decoded update. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// The trimmed line as received.
    pub raw: String,
    /// Sender address (diagnostic only).
    pub source: String,
    /// Raw metric type code; interpreted by the registry.
    pub metric_type: String,
    pub name: String,
    pub help: String,
    pub labels: BTreeMap<String, String>,
    /// Raw action code; interpreted by the registry.
    pub action: String,
    pub args: BTreeMap<String, String>,
}

impl Update {
    /// Resolved metric kind, if the type code is known.
    pub fn kind(&self) -> Option<MetricKind> {
        MetricKind::from_code(&self.metric_type)
    }

    /// Resolved action, if the action code is known.
    pub fn action_kind(&self) -> Option<Action> {
        Action::from_code(&self.action)
    }

    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// Label names in sorted order.
    pub fn label_names(&self) -> Vec<String> {
        self.labels.keys().cloned().collect()
    }
}

/// Parse one raw line received from `from`.
pub fn parse_line(raw: &str, from: &str) -> Result<Update> {
    let line = raw.trim_matches('\n');
    if line.contains('\n') {
        return Err(PromcaseError::Malformed(line.to_string()));
    }

    let mut fields = line.rsplitn(6, FIELD_SEPARATOR);
    let (Some(args), Some(action), Some(labels), Some(help), Some(name), Some(metric_type)) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return Err(PromcaseError::Malformed(line.to_string()));
    };

    let args = parse_args(args).ok_or_else(|| PromcaseError::BadArgs(line.to_string()))?;

    Ok(Update {
        raw: line.to_string(),
        source: from.to_string(),
        metric_type: metric_type.to_string(),
        name: name.to_string(),
        help: help.to_string(),
        labels: parse_labels(labels),
        action: action.to_string(),
        args,
    })
}

fn split_pair(token: &str) -> Option<(&str, &str)> {
    let mut parts = token.split(KEY_VALUE_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(k), Some(v), None) => Some((k, v)),
        _ => None,
    }
}

fn parse_labels(field: &str) -> BTreeMap<String, String> {
    field
        .split(PAIR_SEPARATOR)
        .filter_map(split_pair)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn parse_args(field: &str) -> Option<BTreeMap<String, String>> {
    let mut args = BTreeMap::new();
    for token in field.split(PAIR_SEPARATOR) {
        let (k, v) = split_pair(token)?;
        args.insert(k.to_string(), v.to_string());
    }
    Some(args)
}
