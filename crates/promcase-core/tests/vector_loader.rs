//! JSON test vector loader shared by the line and datagram tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LineVector {
    pub description: String,
    pub line: String,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default)]
    pub expect: Option<ExpectUpdate>,
    #[serde(default)]
    pub expect_error: Option<ExpectError>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectUpdate {
    pub metric_type: String,
    pub name: String,
    pub help: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub action: String,
    pub args: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectError {
    pub code: String,
    #[serde(default)]
    pub reason: Option<String>,
}

fn default_from() -> String {
    "127.0.0.1:40000".to_string()
}

pub fn load(name: &str) -> LineVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}"))
        .unwrap_or_else(|e| panic!("read vector {name}: {e}"));
    serde_json::from_str(&s).unwrap_or_else(|e| panic!("parse vector {name}: {e}"))
}

pub const ALL: [&str; 13] = [
    "counter_no_labels.json",
    "counter_one_label.json",
    "histogram_with_buckets.json",
    "labels_junk_skipped.json",
    "extra_pipes_first_field.json",
    "unknown_type_passthrough.json",
    "empty_action.json",
    "seven_fields_greedy.json",
    "args_missing_eq.json",
    "args_empty.json",
    "args_double_eq.json",
    "too_few_fields.json",
    "embedded_newline.json",
];
