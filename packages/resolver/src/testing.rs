//! In-memory transport and record fixtures for tests.
//!
//! Enabled for this crate's unit tests and, through the `test-utils`
//! feature, for downstream crates' tests.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gazetteer_resolver_models::LookupOptions;
use serde_json::Value;

use crate::GazetteerError;
use crate::codec::uri_from_id;
use crate::transport::Transport;

/// Serves canned bodies keyed by URI and counts requests.
///
/// Clones share the same bodies and counter, so a test can keep a handle
/// after boxing one into a resolver.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    bodies: Arc<Mutex<BTreeMap<String, String>>>,
    requests: Arc<AtomicUsize>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a raw body for place `id` and returns its URI.
    ///
    /// # Panics
    ///
    /// Panics if `id` has no URI or the body map is poisoned.
    pub fn add_body(&self, id: &str, body: &str) -> String {
        let uri = uri_from_id(id).expect("fixture id must have a URI");
        self.bodies
            .lock()
            .expect("memory transport poisoned")
            .insert(uri.clone(), body.to_string());
        uri
    }

    /// Registers a `GeoJSON` feature for place `id` and returns its URI.
    pub fn add_place(&self, id: &str, feature: &Value) -> String {
        self.add_body(id, &feature.to_string())
    }

    /// Number of GET requests served (including misses).
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn get(&self, uri: &str) -> Result<String, GazetteerError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.bodies
            .lock()
            .expect("memory transport poisoned")
            .get(uri)
            .cloned()
            .ok_or_else(|| GazetteerError::HttpStatus {
                url: uri.to_string(),
                status: 404,
            })
    }
}

/// Returns verbose, non-sleeping options whose raw cache directory is a
/// fresh scratch directory named after `test_name`.
#[must_use]
pub fn options(test_name: &str) -> LookupOptions {
    let dir = scratch_dir(test_name);
    LookupOptions {
        force: false,
        sleep: Duration::ZERO,
        output_dir: dir.join("raw"),
        verbose: true,
    }
}

/// Returns an empty scratch directory under the system temp dir.
#[must_use]
pub fn scratch_dir(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "gazetteer_test_{test_name}_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Wraps `properties` in a `GeoJSON` feature.
#[must_use]
pub fn feature(properties: Value) -> Value {
    serde_json::json!({
        "type": "Feature",
        "properties": properties,
        "geometry": null
    })
}

/// A root country record.
#[must_use]
pub fn country(name: &str) -> Value {
    feature(serde_json::json!({
        "wof:placetype": "country",
        "wof:name": name,
        "name:eng_x_preferred": [name],
        "wof:parent_id": -1,
        "wof:hierarchy": []
    }))
}

/// A region record under `country_id`.
#[must_use]
pub fn region(name: &str, abbreviation: &str, country_id: &str) -> Value {
    feature(serde_json::json!({
        "wof:placetype": "region",
        "wof:name": name,
        "wof:abbreviation": abbreviation,
        "wof:parent_id": country_id,
        "wof:hierarchy": [{ "country_id": country_id }]
    }))
}

/// A non-administrative place with coordinates and a hierarchy map.
#[must_use]
pub fn place(
    placetype: &str,
    name: &str,
    parent_id: &str,
    hierarchy: Value,
    lng: f64,
    lat: f64,
) -> Value {
    feature(serde_json::json!({
        "wof:placetype": placetype,
        "wof:name": name,
        "wof:parent_id": parent_id,
        "wof:hierarchy": [hierarchy],
        "geom:longitude": lng,
        "geom:latitude": lat
    }))
}
