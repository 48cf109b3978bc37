#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Provenance processing on top of the gazetteer resolver.
//!
//! A [`ProvenanceProcessor`] owns the session state (resolver with its raw
//! record memo, the resolved label cache, and the place tally) and
//! provides:
//!
//! - [`ingest`]: resolves every referenced place into the label cache and
//!   counts label usage;
//! - [`validate`]: checks that each reference has a URI and that its label
//!   appears in the provenance text;
//! - [`geometry`]: builds a deduplicated `MultiLineString` from the
//!   coordinates of each record's places.

pub mod geometry;
pub mod ingest;
pub mod progress;
pub mod validate;

use std::path::Path;

use gazetteer_provenance_models::{PlaceTally, ProvenanceDatum};
use gazetteer_resolver::label_cache::LabelCache;
use gazetteer_resolver::{GazetteerError, Resolver};
use gazetteer_resolver_models::LookupOptions;
use serde::Serialize;
use thiserror::Error;

/// Errors from provenance file handling.
#[derive(Debug, Error)]
pub enum ProvenanceError {
    /// Resolver I/O failed (e.g. saving the label cache).
    #[error("Gazetteer error: {0}")]
    Gazetteer(#[from] GazetteerError),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading input or writing output.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Session state for processing provenance records.
pub struct ProvenanceProcessor {
    resolver: Resolver,
    cache: LabelCache,
    tally: PlaceTally,
}

impl ProvenanceProcessor {
    #[must_use]
    pub fn new(resolver: Resolver, cache: LabelCache) -> Self {
        Self {
            resolver,
            cache,
            tally: PlaceTally::new(),
        }
    }

    #[must_use]
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    #[must_use]
    pub const fn cache(&self) -> &LabelCache {
        &self.cache
    }

    #[must_use]
    pub const fn tally(&self) -> &PlaceTally {
        &self.tally
    }

    /// Returns the label of place `id` (cache first, resolver otherwise).
    pub async fn name_of(&mut self, id: &str, options: &LookupOptions) -> Option<String> {
        self.cache.name_of(id, &mut self.resolver, options).await
    }

    /// Returns the `(lng, lat)` of place `id` (cache first, resolver
    /// otherwise).
    pub async fn coordinates_of(
        &mut self,
        id: &str,
        options: &LookupOptions,
    ) -> (Option<f64>, Option<f64>) {
        self.cache.coordinates_of(id, &mut self.resolver, options).await
    }

    /// Saves the label cache to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvenanceError`] if the cache cannot be written.
    pub fn save_cache(&self, path: &Path) -> Result<(), ProvenanceError> {
        Ok(self.cache.save(path)?)
    }
}

/// Reads a JSON array of provenance records from `path`.
///
/// # Errors
///
/// Returns [`ProvenanceError`] if the file cannot be read or parsed.
pub fn load_data(path: &Path) -> Result<Vec<ProvenanceDatum>, ProvenanceError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ProvenanceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Writes `value` to `path` as pretty-printed JSON, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`ProvenanceError`] if serialization or the write fails.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ProvenanceError> {
    if let Some(parent) = path.parent() {
        gazetteer_resolver::paths::ensure_dir(parent).map_err(|e| ProvenanceError::Io {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|e| ProvenanceError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use gazetteer_resolver::testing::{self, MemoryTransport};
    use gazetteer_resolver_models::CacheEntry;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn lookups_prefer_the_label_cache() {
        let transport = MemoryTransport::new();
        transport.add_place(
            "101751119",
            &testing::place("locality", "Paris", "-1", json!({}), 9.0, 9.0),
        );
        transport.add_place(
            "101748417",
            &testing::place("locality", "Lyon", "-1", json!({}), 4.8, 45.7),
        );
        let mut cache = LabelCache::new();
        cache.insert(
            "101751119".to_string(),
            CacheEntry {
                label: Some("Paris, France".to_string()),
                lng: Some(2.35),
                lat: Some(48.86),
                country: Some("France".to_string()),
            },
        );
        let mut processor =
            ProvenanceProcessor::new(Resolver::new(Box::new(transport.clone())), cache);
        let options = testing::options("processor_lookups");

        assert_eq!(
            processor.name_of("101751119", &options).await.as_deref(),
            Some("Paris, France")
        );
        assert_eq!(
            processor.coordinates_of("101751119", &options).await,
            (Some(2.35), Some(48.86))
        );
        assert_eq!(transport.requests(), 0);

        assert_eq!(processor.name_of("101748417", &options).await.as_deref(), Some("Lyon"));
        assert_eq!(
            processor.coordinates_of("101748417", &options).await,
            (Some(4.8), Some(45.7))
        );
        assert_eq!(transport.requests(), 1);
        assert!(!processor.cache().contains("101748417"));
    }

    #[test]
    fn loads_and_writes_data_files() {
        let dir = testing::scratch_dir("provenance_files");
        let path = dir.join("data.json");
        let data = vec![ProvenanceDatum {
            id: "1".to_string(),
            title: "Untitled".to_string(),
            provenance: "Paris".to_string(),
            places: Vec::new(),
        }];

        write_json(&path, &data).unwrap();
        assert_eq!(load_data(&path).unwrap(), data);
        assert!(load_data(&dir.join("missing.json")).is_err());
    }
}
