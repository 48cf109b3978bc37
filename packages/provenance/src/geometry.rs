//! Line geometry connecting the places of each provenance record.

use std::collections::BTreeSet;

use gazetteer_provenance_models::ProvenanceDatum;
use gazetteer_resolver::codec::id_from_uri;
use gazetteer_resolver_models::LookupOptions;
use geojson::{Geometry, Value};
use sha2::{Digest, Sha256};

use crate::ProvenanceProcessor;

/// Hex SHA-256 of a line's coordinates, in order, by bit pattern.
///
/// Two lines hash equal exactly when they visit the same positions in the
/// same order. `-0.0` hashes as `0.0`.
#[must_use]
pub fn line_hash(line: &[Vec<f64>]) -> String {
    let mut hasher = Sha256::new();
    for position in line {
        hasher.update((position.len() as u64).to_le_bytes());
        for &coordinate in position {
            let coordinate = if coordinate == 0.0 { 0.0 } else { coordinate };
            hasher.update(coordinate.to_bits().to_le_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

impl ProvenanceProcessor {
    /// Builds a `MultiLineString` with one line per record.
    ///
    /// Each line joins the `[lng, lat]` positions of the record's places in
    /// reference order, skipping places without both coordinates. Lines with
    /// fewer than two positions and repeats of an earlier line are dropped.
    pub async fn line_geometry(
        &mut self,
        data: &[ProvenanceDatum],
        options: &LookupOptions,
    ) -> Geometry {
        let mut seen = BTreeSet::new();
        let mut lines = Vec::new();

        for datum in data {
            let mut line = Vec::new();
            for (_, uri) in datum.references() {
                let id = id_from_uri(uri);
                if let (Some(lng), Some(lat)) = self.coordinates_of(&id, options).await {
                    line.push(vec![lng, lat]);
                }
            }

            if line.len() > 1 && seen.insert(line_hash(&line)) {
                lines.push(line);
            }
        }

        log::debug!("Built {} distinct lines from {} records", lines.len(), data.len());
        Geometry::new(Value::MultiLineString(lines))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use gazetteer_resolver::Resolver;
    use gazetteer_resolver::label_cache::LabelCache;
    use gazetteer_resolver::testing::{self, MemoryTransport};
    use gazetteer_resolver_models::CacheEntry;
    use serde_json::json;

    use super::*;
    use crate::progress::NullProgress;

    fn datum(id: &str, references: &[(&str, &str)]) -> ProvenanceDatum {
        ProvenanceDatum {
            id: id.to_string(),
            title: format!("Object {id}"),
            provenance: references
                .iter()
                .map(|(label, _)| *label)
                .collect::<Vec<_>>()
                .join("; "),
            places: references
                .iter()
                .map(|(label, uri)| {
                    BTreeMap::from([((*label).to_string(), Some((*uri).to_string()))])
                })
                .collect(),
        }
    }

    fn entry(lng: Option<f64>, lat: Option<f64>) -> CacheEntry {
        CacheEntry {
            lng,
            lat,
            ..CacheEntry::default()
        }
    }

    fn uri(id: &str) -> String {
        gazetteer_resolver::codec::uri_from_id(id).unwrap()
    }

    #[test]
    fn hash_depends_on_order() {
        let forward = vec![vec![1.0, 1.0], vec![2.0, 2.0]];
        let backward = vec![vec![2.0, 2.0], vec![1.0, 1.0]];
        assert_eq!(line_hash(&forward), line_hash(&[vec![1.0, 1.0], vec![2.0, 2.0]]));
        assert_ne!(line_hash(&forward), line_hash(&backward));
        assert_eq!(line_hash(&forward).len(), 64);
    }

    #[test]
    fn signed_zeros_hash_equal() {
        let positive = [vec![0.0, 51.5], vec![-0.1, 0.0]];
        let negative = [vec![-0.0, 51.5], vec![-0.1, -0.0]];
        assert_eq!(line_hash(&positive), line_hash(&negative));
    }

    #[tokio::test]
    async fn drops_short_and_duplicate_lines() {
        let mut cache = LabelCache::new();
        cache.insert("101".to_string(), entry(Some(1.0), Some(1.0)));
        cache.insert("102".to_string(), entry(Some(2.0), Some(2.0)));
        cache.insert("103".to_string(), entry(Some(3.0), None));
        let transport = MemoryTransport::new();
        let mut processor =
            ProvenanceProcessor::new(Resolver::new(Box::new(transport.clone())), cache);
        let options = testing::options("geometry_dedup");

        let (a, b, c) = (uri("101"), uri("102"), uri("103"));
        let data = [
            datum("1", &[("A", a.as_str()), ("C", c.as_str()), ("B", b.as_str())]),
            datum("2", &[("A", a.as_str()), ("B", b.as_str())]),
            datum("3", &[("A", a.as_str())]),
            datum("4", &[("B", b.as_str()), ("A", a.as_str())]),
        ];
        let geometry = processor.line_geometry(&data, &options).await;

        assert_eq!(
            geometry.value,
            Value::MultiLineString(vec![
                vec![vec![1.0, 1.0], vec![2.0, 2.0]],
                vec![vec![2.0, 2.0], vec![1.0, 1.0]],
            ])
        );
        assert_eq!(transport.requests(), 0);
    }

    #[tokio::test]
    async fn shared_path_yields_one_line_and_doubled_tally() {
        let transport = MemoryTransport::new();
        let places = [("201", "Alpha", 1.0), ("202", "Beta", 2.0), ("203", "Gamma", 3.0)];
        for (id, name, point) in places {
            transport.add_place(
                id,
                &testing::place("locality", name, "-1", json!({}), point, point),
            );
        }
        let mut processor = ProvenanceProcessor::new(
            Resolver::new(Box::new(transport.clone())),
            LabelCache::new(),
        );
        let options = testing::options("geometry_end_to_end");

        let path = [("Alpha", uri("201")), ("Beta", uri("202")), ("Gamma", uri("203"))];
        let references: Vec<(&str, &str)> =
            path.iter().map(|(label, uri)| (*label, uri.as_str())).collect();
        let data = [datum("1", &references), datum("2", &references)];

        assert!(crate::validate::validate_all(&data, &options).is_empty());
        processor.ingest_all(&data, &options, &NullProgress).await;
        let geometry = processor.line_geometry(&data, &options).await;

        assert_eq!(
            geometry.value,
            Value::MultiLineString(vec![vec![
                vec![1.0, 1.0],
                vec![2.0, 2.0],
                vec![3.0, 3.0],
            ]])
        );
        for (label, uri) in &path {
            assert_eq!(processor.tally().count(&id_from_uri(uri), label), 2);
        }
        assert_eq!(transport.requests(), 3);
        assert_eq!(processor.cache().len(), 3);
    }
}
