//! Ancestor traversal and hierarchy lookups.
//!
//! Two distinct notions of "ancestor" are used:
//!
//! - the **parent chain** (`wof:parent_id`), walked by
//!   [`Resolver::ancestor_chain_complete`] only to warm the record caches;
//! - the **hierarchy map** (`wof:hierarchy`), which names the country and
//!   region a place belongs to and drives label formatting.

use std::collections::BTreeSet;

use gazetteer_resolver_models::{Hierarchy, LookupOptions};

use crate::Resolver;

/// Maximum number of records visited while walking a parent chain.
pub const MAX_ANCESTOR_DEPTH: usize = 32;

impl Resolver {
    /// Fetches the record at `uri` and every record on its parent chain.
    ///
    /// Returns `true` once a record without a parent is reached, `false` if
    /// any fetch fails. A chain that revisits a record or exceeds
    /// [`MAX_ANCESTOR_DEPTH`] is abandoned with a warning.
    pub async fn ancestor_chain_complete(
        &mut self,
        uri: &str,
        options: &LookupOptions,
    ) -> bool {
        let mut current = uri.to_string();
        let mut visited = BTreeSet::new();

        for _ in 0..MAX_ANCESTOR_DEPTH {
            if !visited.insert(current.clone()) {
                log::warn!("Parent chain of {uri} loops back to {current}");
                return false;
            }

            let Some(record) = self.fetch_record(&current, options).await else {
                return false;
            };

            let Some(parent_id) = record.parent_id else {
                return true;
            };

            let Some(parent_uri) = self.uri_for(&parent_id) else {
                return false;
            };
            current = parent_uri;
        }

        log::warn!("Parent chain of {uri} is deeper than {MAX_ANCESTOR_DEPTH} levels");
        false
    }

    /// Returns the first hierarchy map of place `id`.
    pub async fn hierarchy_of(&mut self, id: &str, options: &LookupOptions) -> Option<Hierarchy> {
        let record = self.fetch_place(id, options).await?;

        match record.hierarchy.into_iter().next() {
            Some(hierarchy) if !hierarchy.is_empty() => Some(hierarchy),
            _ => {
                if options.verbose {
                    log::warn!("no hierarchy for {id}");
                }
                None
            }
        }
    }

    /// Returns the preferred name of the country place `id` belongs to.
    pub async fn country_name_of(&mut self, id: &str, options: &LookupOptions) -> Option<String> {
        let hierarchy = self.hierarchy_of(id, options).await;
        let Some(country_id) = hierarchy.as_ref().and_then(Hierarchy::country_id) else {
            if options.verbose {
                log::warn!("no country hierarchy for {id}");
            }
            return None;
        };

        let Some(country) = self.fetch_place(country_id, options).await else {
            if options.verbose {
                log::warn!("could not find a country for {id} (country id: {country_id})");
            }
            return None;
        };

        country.preferred_name().map(String::from)
    }

    /// Returns the abbreviation of the region place `id` belongs to.
    pub async fn state_abbreviation_of(
        &mut self,
        id: &str,
        options: &LookupOptions,
    ) -> Option<String> {
        let hierarchy = self.hierarchy_of(id, options).await;
        let Some(region_id) = hierarchy.as_ref().and_then(Hierarchy::region_id) else {
            if options.verbose {
                log::warn!("no state hierarchy for {id}");
            }
            return None;
        };

        let Some(region) = self.fetch_place(region_id, options).await else {
            if options.verbose {
                log::warn!("cannot find a state for {id} (region id: {region_id})");
            }
            return None;
        };

        region.abbreviation
    }

    /// Returns the `(lng, lat)` of place `id` straight from its record.
    pub async fn coordinates_of(
        &mut self,
        id: &str,
        options: &LookupOptions,
    ) -> (Option<f64>, Option<f64>) {
        let Some(record) = self.fetch_place(id, options).await else {
            return (None, None);
        };

        if (record.longitude.is_none() || record.latitude.is_none()) && options.verbose {
            log::warn!("{id} is missing geo coordinates.");
        }

        (record.longitude, record.latitude)
    }
}
