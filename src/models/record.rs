//! Raw, unvalidated search results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One article document as returned by the endpoint.
///
/// Nothing about its shape is checked on receipt; the projector decides what a
/// usable record looks like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Build a record from a JSON value, if it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Dotted key-path lookup, e.g. `headline.main`
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = self.0.get(segments.next()?)?;
        segments.try_fold(first, |value, key| value.as_object()?.get(key))
    }
}

/// One page of results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// Total number of hits the endpoint reports for the query
    pub hits: u64,

    /// Records on this page
    pub docs: Vec<RawRecord>,
}

impl SearchPage {
    pub fn new(hits: u64, docs: Vec<RawRecord>) -> Self {
        Self { hits, docs }
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
