//! Persisted cache of fully resolved places.
//!
//! Maps place IDs to [`CacheEntry`] values (label, coordinates, country).
//! The cache is loaded once per session, consulted before the
//! [`Resolver`], and written back wholesale by [`LabelCache::save`].
//!
//! A key present in the cache is final: reads never re-resolve it, even
//! when some of its fields are `None`. Reads for an uncached ID go to the
//! resolver every time and do **not** populate the cache; only provenance
//! ingestion inserts entries.

use std::collections::BTreeMap;
use std::path::Path;

use gazetteer_resolver_models::{CacheEntry, LookupOptions, PlaceId};

use crate::paths::ensure_dir;
use crate::{GazetteerError, Resolver};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelCache {
    entries: BTreeMap<PlaceId, CacheEntry>,
}

impl LabelCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the cache from `path`.
    ///
    /// Returns an empty cache when `path` is `None` or does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if the file exists but cannot be read or
    /// is not a JSON object of cache entries.
    pub fn load(path: Option<&Path>) -> Result<Self, GazetteerError> {
        let Some(path) = path else {
            return Ok(Self::new());
        };

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No label cache at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(GazetteerError::Io {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };

        let entries: BTreeMap<PlaceId, CacheEntry> = serde_json::from_str(&contents)?;
        log::info!("Loaded {} cached places from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    /// Writes the whole cache to `path` as pretty-printed JSON, replacing
    /// any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), GazetteerError> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent).map_err(|e| GazetteerError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json).map_err(|e| GazetteerError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        log::info!("Saved {} cached places to {}", self.entries.len(), path.display());
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CacheEntry> {
        self.entries.get(id)
    }

    /// Adds a resolved entry. Existing entries are never replaced.
    pub fn insert(&mut self, id: PlaceId, entry: CacheEntry) {
        self.entries.entry(id).or_insert(entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlaceId, &CacheEntry)> {
        self.entries.iter()
    }

    /// Returns the label of place `id`, resolving it when uncached.
    pub async fn name_of(
        &self,
        id: &str,
        resolver: &mut Resolver,
        options: &LookupOptions,
    ) -> Option<String> {
        match self.entries.get(id) {
            Some(entry) => entry.label.clone(),
            None => resolver.canonical_form(id, options).await,
        }
    }

    /// Returns the `(lng, lat)` of place `id`, resolving it when uncached.
    pub async fn coordinates_of(
        &self,
        id: &str,
        resolver: &mut Resolver,
        options: &LookupOptions,
    ) -> (Option<f64>, Option<f64>) {
        match self.entries.get(id) {
            Some(entry) => entry.coordinates(),
            None => resolver.coordinates_of(id, options).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{self, MemoryTransport};

    fn paris() -> CacheEntry {
        CacheEntry {
            label: Some("Paris, France".to_string()),
            lng: Some(2.35),
            lat: Some(48.86),
            country: Some("France".to_string()),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = testing::scratch_dir("label_cache_missing");
        let cache = LabelCache::load(Some(&dir.join("fast_cache.json"))).unwrap();
        assert!(cache.is_empty());
        assert!(LabelCache::load(None).unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = testing::scratch_dir("label_cache_malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fast_cache.json");
        std::fs::write(&path, "[\"not\", \"a\", \"map\"]").unwrap();
        assert!(LabelCache::load(Some(&path)).is_err());
    }

    #[test]
    fn save_then_load_preserves_entries() {
        let dir = testing::scratch_dir("label_cache_save");
        let path = dir.join("output").join("fast_cache.json");

        let mut cache = LabelCache::new();
        cache.insert("101751119".to_string(), paris());
        cache.insert("unknown".to_string(), CacheEntry::default());
        cache.save(&path).unwrap();

        let loaded = LabelCache::load(Some(&path)).unwrap();
        assert_eq!(loaded, cache);
        assert_eq!(loaded.get("unknown"), Some(&CacheEntry::default()));
    }

    #[test]
    fn insert_keeps_first_entry() {
        let mut cache = LabelCache::new();
        cache.insert("1".to_string(), paris());
        cache.insert("1".to_string(), CacheEntry::default());
        assert_eq!(cache.get("1"), Some(&paris()));
    }

    #[tokio::test]
    async fn cached_ids_never_fetch() {
        let transport = MemoryTransport::new();
        transport.add_place(
            "101751119",
            &testing::place("locality", "Elsewhere", "-1", json!({}), 9.0, 9.0),
        );
        let mut resolver = Resolver::new(Box::new(transport.clone()));
        let options = testing::options("label_cache_fast_path");

        let mut cache = LabelCache::new();
        cache.insert("101751119".to_string(), paris());
        cache.insert(
            "202".to_string(),
            CacheEntry {
                label: None,
                ..CacheEntry::default()
            },
        );

        for _ in 0..3 {
            assert_eq!(
                cache.name_of("101751119", &mut resolver, &options).await.as_deref(),
                Some("Paris, France")
            );
            assert_eq!(
                cache.coordinates_of("101751119", &mut resolver, &options).await,
                (Some(2.35), Some(48.86))
            );
            assert_eq!(cache.name_of("202", &mut resolver, &options).await, None);
            assert_eq!(
                cache.coordinates_of("202", &mut resolver, &options).await,
                (None, None)
            );
        }

        assert_eq!(transport.requests(), 0);
        assert_eq!(resolver.fetcher().network_fetches(), 0);
    }

    #[tokio::test]
    async fn uncached_reads_resolve_without_populating() {
        let transport = MemoryTransport::new();
        transport.add_place(
            "303",
            &testing::place("locality", "Loose", "-1", json!({}), 1.0, 2.0),
        );
        let mut resolver = Resolver::new(Box::new(transport));
        let options = testing::options("label_cache_slow_path");
        let cache = LabelCache::new();

        assert_eq!(
            cache.name_of("303", &mut resolver, &options).await.as_deref(),
            Some("Loose")
        );
        assert_eq!(
            cache.coordinates_of("303", &mut resolver, &options).await,
            (Some(1.0), Some(2.0))
        );
        assert!(!cache.contains("303"));
    }
}
