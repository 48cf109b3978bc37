#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the gazetteer resolver.
//!
//! This crate contains only data types and simple accessors. It has no
//! network, filesystem, or JSON parsing logic.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a place in the remote gazetteer (e.g. `"85633793"`).
pub type PlaceId = String;

/// Identifier returned when a URI cannot be parsed into a [`PlaceId`].
pub const UNKNOWN_PLACE_ID: &str = "unknown";

/// Default directory for the per-ID raw record cache.
pub const DEFAULT_OUTPUT_DIR: &str = "caches/mapzen";

/// Default delay after each successful network fetch.
pub const DEFAULT_SLEEP: Duration = Duration::from_millis(50);

/// Placetype of a country record.
pub const PLACETYPE_COUNTRY: &str = "country";

/// Placetype of a continent record.
pub const PLACETYPE_CONTINENT: &str = "continent";

/// Placetype of a region (state, province) record.
pub const PLACETYPE_REGION: &str = "region";

/// One entry of a place's declared hierarchy: `<placetype>_id -> PlaceId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hierarchy(pub BTreeMap<String, PlaceId>);

impl Hierarchy {
    /// Returns the ancestor ID stored under `key` (e.g. `"county_id"`).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the ID of the country this place belongs to.
    #[must_use]
    pub fn country_id(&self) -> Option<&str> {
        self.get("country_id")
    }

    /// Returns the ID of the region (state, province) this place belongs to.
    #[must_use]
    pub fn region_id(&self) -> Option<&str> {
        self.get("region_id")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The properties of a remote place document that the resolver reads.
///
/// Every field is optional: remote records are read defensively and a
/// missing or mistyped property is simply absent here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Categorical tag (e.g. `"locality"`, `"region"`, `"country"`).
    pub placetype: Option<String>,
    /// Preferred English names, most preferred first.
    pub preferred_english_names: Vec<String>,
    /// Fallback display name.
    pub default_name: Option<String>,
    /// Parent place, or `None` when this record is a root.
    pub parent_id: Option<PlaceId>,
    /// Declared ancestor maps; the first entry is authoritative.
    pub hierarchy: Vec<Hierarchy>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Short code, present on regions (e.g. `"CA"`).
    pub abbreviation: Option<String>,
}

impl PlaceRecord {
    /// Returns the display name of the place.
    ///
    /// Prefers the first preferred English name and falls back to the
    /// default name when the preferred list is empty.
    #[must_use]
    pub fn preferred_name(&self) -> Option<&str> {
        self.preferred_english_names
            .first()
            .map(String::as_str)
            .or(self.default_name.as_deref())
    }

    /// Returns `true` if this record is a country or a continent.
    #[must_use]
    pub fn is_country_or_continent(&self) -> bool {
        matches!(
            self.placetype.as_deref(),
            Some(PLACETYPE_COUNTRY | PLACETYPE_CONTINENT)
        )
    }

    /// Returns `true` if this record is a region.
    #[must_use]
    pub fn is_region(&self) -> bool {
        self.placetype.as_deref() == Some(PLACETYPE_REGION)
    }
}

/// A fully resolved place, as persisted in the resolved-label cache.
///
/// Entries are built once and never updated: a `None` field records that
/// the value could not be resolved, not that it is pending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Canonical display label (e.g. `"Oakland, CA"`).
    pub label: Option<String>,
    /// Longitude (WGS84).
    pub lng: Option<f64>,
    /// Latitude (WGS84).
    pub lat: Option<f64>,
    /// Preferred name of the containing country.
    pub country: Option<String>,
}

impl CacheEntry {
    /// Returns the stored `(lng, lat)` pair.
    #[must_use]
    pub const fn coordinates(&self) -> (Option<f64>, Option<f64>) {
        (self.lng, self.lat)
    }
}

/// Options recognised by every lookup call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOptions {
    /// Bypass the on-disk raw cache and always hit the network.
    pub force: bool,
    /// Delay after each successful network fetch.
    pub sleep: Duration,
    /// Directory holding the per-ID raw record cache.
    pub output_dir: PathBuf,
    /// Emit diagnostics for absorbed failures.
    pub verbose: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            force: false,
            sleep: DEFAULT_SLEEP,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            verbose: false,
        }
    }
}
