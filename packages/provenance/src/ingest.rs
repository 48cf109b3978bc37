//! Population of the label cache from provenance records.

use std::ops::AddAssign;

use gazetteer_provenance_models::ProvenanceDatum;
use gazetteer_resolver::codec::id_from_uri;
use gazetteer_resolver_models::{CacheEntry, LookupOptions};

use crate::ProvenanceProcessor;
use crate::progress::ProgressCallback;

/// Counters from one or more ingestion passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Place references processed.
    pub references: usize,
    /// References whose place was not yet in the label cache.
    pub cache_misses: usize,
}

impl AddAssign for IngestStats {
    fn add_assign(&mut self, rhs: Self) {
        self.references += rhs.references;
        self.cache_misses += rhs.cache_misses;
    }
}

impl ProvenanceProcessor {
    /// Resolves place `id` into the entry stored in the label cache.
    ///
    /// Each field degrades to `None` independently when it cannot be
    /// resolved.
    pub async fn entry_for(&mut self, id: &str, options: &LookupOptions) -> CacheEntry {
        let (lng, lat) = self.resolver.coordinates_of(id, options).await;
        let label = self.resolver.canonical_form(id, options).await;
        let country = self.resolver.country_name_of(id, options).await;
        CacheEntry {
            label,
            lng,
            lat,
            country,
        }
    }

    /// Caches every place `datum` references and tallies its labels.
    ///
    /// Uncached places first have their whole parent chain fetched so the
    /// lookups that build the entry hit the record memo. The entry is
    /// inserted even if some of its fields could not be resolved; the tally
    /// is incremented for every reference.
    pub async fn ingest(
        &mut self,
        datum: &ProvenanceDatum,
        options: &LookupOptions,
    ) -> IngestStats {
        let mut stats = IngestStats::default();

        for (label, uri) in datum.references() {
            stats.references += 1;
            let id = id_from_uri(uri);

            if !self.cache.contains(&id) {
                stats.cache_misses += 1;
                log::info!("cache miss for {id}");

                if !self.resolver.ancestor_chain_complete(uri, options).await {
                    log::debug!("parent chain of {id} could not be completed");
                }

                let entry = self.entry_for(&id, options).await;
                self.cache.insert(id.clone(), entry);
            }

            self.tally.record(&id, label);
        }

        stats
    }

    /// Ingests every datum in order, reporting one unit of progress each.
    pub async fn ingest_all(
        &mut self,
        data: &[ProvenanceDatum],
        options: &LookupOptions,
        progress: &dyn ProgressCallback,
    ) -> IngestStats {
        let mut stats = IngestStats::default();
        progress.set_total(data.len() as u64);

        for datum in data {
            progress.set_message(format!("Ingesting {}", datum.id));
            stats += self.ingest(datum, options).await;
            progress.inc(1);
        }

        progress.finish(format!(
            "Ingested {} references ({} cache misses)",
            stats.references, stats.cache_misses
        ));
        stats
    }
}
