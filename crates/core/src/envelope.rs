//! Response envelope decoding
//!
//! The directory API answers list queries either with a bare JSON array or with
//! an object carrying the array under `data` and, sometimes, an authoritative
//! count under `dataAllPage`. Both shapes are decoded into [`Envelope`] once and
//! handled exhaustively afterwards.

use serde_json::Value;

use crate::record::{normalize_records, CanonicalRecord};

/// Field holding the record list in the wrapped shape.
pub const LIST_FIELD: &str = "data";

/// Field holding the authoritative record count in the wrapped shape.
pub const TOTAL_FIELD: &str = "dataAllPage";

/// The shapes a list response can take.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `[ {...}, {...} ]`
    Bare(Vec<Value>),
    /// `{ "data": [ ... ], "dataAllPage": 123 }`
    Wrapped { items: Vec<Value>, total: Option<u64> },
    /// Anything else: treated as an empty result.
    Unrecognized,
}

impl Envelope {
    /// Classify a decoded response body.
    pub fn decode(body: Value) -> Self {
        match body {
            Value::Array(items) => Envelope::Bare(items),
            Value::Object(mut map) => {
                let total = map.get(TOTAL_FIELD).and_then(Value::as_u64);
                match map.remove(LIST_FIELD) {
                    Some(Value::Array(items)) => Envelope::Wrapped { items, total },
                    _ => Envelope::Unrecognized,
                }
            }
            _ => Envelope::Unrecognized,
        }
    }

    /// Authoritative count, only ever present in the wrapped shape.
    pub fn total(&self) -> Option<u64> {
        match self {
            Envelope::Wrapped { total, .. } => *total,
            Envelope::Bare(_) | Envelope::Unrecognized => None,
        }
    }

    /// Normalized records, in response order.
    pub fn records(&self) -> Vec<CanonicalRecord> {
        match self {
            Envelope::Bare(items) | Envelope::Wrapped { items, .. } => normalize_records(items),
            Envelope::Unrecognized => Vec::new(),
        }
    }
}
