//! Conversion between place IDs and sharded record URIs.
//!
//! Record files live under a path built from the ID split into
//! consecutive 3-character groups, e.g. `85633793` is stored at
//! `<base>/856/337/93/85633793.geojson`.

use gazetteer_resolver_models::{PlaceId, UNKNOWN_PLACE_ID};

/// Base URL of the public Who's On First data mirror.
pub const DEFAULT_BASE_URL: &str = "https://whosonfirst.mapzen.com/data";

/// File extension of record documents.
pub const RECORD_EXTENSION: &str = "geojson";

const SHARD_LEN: usize = 3;

/// Extracts the place ID from a record URI.
///
/// Takes the last non-empty path segment and strips everything from its
/// first `.`. The scheme and host of an absolute URI are not path
/// segments. Returns [`UNKNOWN_PLACE_ID`] when the URI is empty or has no
/// usable segment.
#[must_use]
pub fn id_from_uri(uri: &str) -> PlaceId {
    let path = uri.split(['?', '#']).next().unwrap_or("");
    let path = path
        .split_once("://")
        .map_or(path, |(_, rest)| rest.find('/').map_or("", |start| &rest[start..]));

    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .and_then(|segment| segment.split('.').next())
        .filter(|stem| !stem.is_empty())
        .map_or_else(|| UNKNOWN_PLACE_ID.to_string(), str::to_string)
}

/// Builds the record URI for `id` under [`DEFAULT_BASE_URL`].
///
/// Returns `None` for an empty ID or the [`UNKNOWN_PLACE_ID`] sentinel.
#[must_use]
pub fn uri_from_id(id: &str) -> Option<String> {
    uri_from_id_with_base(DEFAULT_BASE_URL, id)
}

/// Builds the record URI for `id` under `base_url`.
///
/// Purely syntactic: the ID is not checked against the remote service.
#[must_use]
pub fn uri_from_id_with_base(base_url: &str, id: &str) -> Option<String> {
    if id.is_empty() || id == UNKNOWN_PLACE_ID {
        return None;
    }

    let chars: Vec<char> = id.chars().collect();
    let shards: Vec<String> = chars
        .chunks(SHARD_LEN)
        .map(|chunk| chunk.iter().collect())
        .collect();

    Some(format!(
        "{}/{}/{id}.{RECORD_EXTENSION}",
        base_url.trim_end_matches('/'),
        shards.join("/"),
    ))
}
