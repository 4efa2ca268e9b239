//! Equality filter built from request query parameters.
//!
//! Only equality is supported. A facet that was absent or given an empty
//! value is left out entirely, so a record is never matched against an
//! empty string.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::types::{Facet, RecordFields};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    conditions: BTreeMap<Facet, String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from raw query pairs. Keys that are not facets are
    /// ignored; when a facet repeats, its first occurrence decides.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut seen = Vec::new();
        let mut filter = Self::new();
        for (key, value) in pairs {
            let Some(facet) = Facet::from_field(key.as_ref()) else {
                continue;
            };
            if seen.contains(&facet) {
                continue;
            }
            seen.push(facet);
            filter.insert(facet, value);
        }
        filter
    }

    /// Add an equality condition. Empty values are ignored.
    pub fn insert(&mut self, facet: Facet, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.conditions.insert(facet, value);
        }
    }

    pub fn with(mut self, facet: Facet, value: impl Into<String>) -> Self {
        self.insert(facet, value);
        self
    }

    pub fn get(&self, facet: Facet) -> Option<&str> {
        self.conditions.get(&facet).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Facet, &str)> {
        self.conditions.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn matches(&self, fields: &RecordFields) -> bool {
        self.iter()
            .all(|(facet, value)| fields.facet_value(facet) == value)
    }

    /// The filter as a JSON object of `field -> value`, for document
    /// containment queries.
    pub fn to_document(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(facet, value)| (facet.field().to_string(), Value::String(value.to_string())))
            .collect();
        Value::Object(map)
    }
}
