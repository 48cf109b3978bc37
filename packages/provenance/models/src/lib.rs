#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Provenance input records and the per-place label tally.

use std::collections::BTreeMap;

use gazetteer_resolver_models::PlaceId;
use serde::{Deserialize, Deserializer, Serialize};

/// One input record: free provenance text plus the places it mentions.
///
/// `places` is an ordered list of `{ label: uri }` maps. The label is the
/// text expected to appear in `provenance`; the URI points at the place's
/// gazetteer record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceDatum {
    /// Record identifier. Numbers in the input are kept as their decimal
    /// string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Free-text provenance that should mention every place label.
    #[serde(default)]
    pub provenance: String,
    /// Ordered place references.
    #[serde(default)]
    pub places: Vec<BTreeMap<String, Option<String>>>,
}

impl ProvenanceDatum {
    /// Iterates `(label, uri)` pairs in reference order. A `null` URI is
    /// yielded as the empty string.
    pub fn references(&self) -> impl Iterator<Item = (&str, &str)> {
        self.places.iter().flat_map(|place| {
            place
                .iter()
                .map(|(label, uri)| (label.as_str(), uri.as_deref().unwrap_or("")))
        })
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// How often each label was used for each place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceTally(BTreeMap<PlaceId, BTreeMap<String, u64>>);

impl PlaceTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count of `label` for place `id`.
    pub fn record(&mut self, id: &str, label: &str) {
        *self
            .0
            .entry(id.to_string())
            .or_default()
            .entry(label.to_string())
            .or_insert(0) += 1;
    }

    /// Returns how often `label` was used for place `id`.
    #[must_use]
    pub fn count(&self, id: &str, label: &str) -> u64 {
        self.0
            .get(id)
            .and_then(|labels| labels.get(label))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlaceId, &BTreeMap<String, u64>)> {
        self.0.iter()
    }
}
