#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place resolution against the Who's On First gazetteer.
//!
//! Turns opaque place IDs into display labels, coordinates, and country
//! names. Raw place records are fetched through a two-tier cache (an
//! in-memory memo plus one `.geojson` file per ID on disk) before any
//! network request is issued:
//!
//! 1. [`codec`] converts between place IDs and sharded record URIs.
//! 2. [`fetch::RecordFetcher`] owns the memo, the disk cache, and the
//!    [`transport::Transport`] used for network requests.
//! 3. [`Resolver`] walks ancestor chains and hierarchy maps
//!    ([`hierarchy`]) and formats canonical names ([`canonical`]).
//! 4. [`label_cache::LabelCache`] holds fully resolved entries and is
//!    consulted before the resolver.
//!
//! Lookups never fail loudly: missing data, unreachable hosts, malformed
//! bodies, and unwritable cache files all degrade to `None`, with a `log`
//! diagnostic when [`LookupOptions::verbose`] is set.

pub mod canonical;
pub mod codec;
pub mod fetch;
pub mod hierarchy;
pub mod label_cache;
pub mod paths;
pub mod record;
pub mod service;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod transport;

pub use gazetteer_resolver_models::{
    CacheEntry, Hierarchy, LookupOptions, PlaceId, PlaceRecord, UNKNOWN_PLACE_ID,
};

use fetch::RecordFetcher;
use service::GazetteerService;
use thiserror::Error;
use transport::{HttpTransport, Transport};

/// Errors raised by resolver I/O.
///
/// Lookup paths convert these into `None` at the component boundary;
/// they only reach callers from explicit operations such as loading or
/// saving the label cache.
#[derive(Debug, Error)]
pub enum GazetteerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status} for {url}")]
    HttpStatus {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response body is JSON but not a place document.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// I/O error reading or writing a cache file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Resolves place IDs into records, hierarchy data, and canonical names.
///
/// Owns the [`RecordFetcher`] (and therefore the raw record memo) for the
/// lifetime of a processing session. Every lookup is sequential; there is
/// no internal concurrency.
pub struct Resolver {
    fetcher: RecordFetcher,
    base_url: String,
}

impl Resolver {
    /// Creates a resolver using `transport` and the default record base URL.
    #[must_use]
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::with_base_url(transport, codec::DEFAULT_BASE_URL)
    }

    /// Creates a resolver that builds record URIs under `base_url`.
    #[must_use]
    pub fn with_base_url(transport: Box<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher: RecordFetcher::new(transport),
            base_url: base_url.into(),
        }
    }

    /// Creates a resolver backed by an HTTP client configured from
    /// `service`.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if the HTTP client cannot be built.
    pub fn from_service(service: &GazetteerService) -> Result<Self, GazetteerError> {
        let transport = HttpTransport::new(service)?;
        Ok(Self::with_base_url(
            Box::new(transport),
            service.base_url.clone(),
        ))
    }

    /// Returns the record URI for `id`, or `None` for the unknown sentinel.
    #[must_use]
    pub fn uri_for(&self, id: &str) -> Option<String> {
        codec::uri_from_id_with_base(&self.base_url, id)
    }

    /// Returns the underlying fetcher (memo and request counters).
    #[must_use]
    pub const fn fetcher(&self) -> &RecordFetcher {
        &self.fetcher
    }

    /// Fetches the raw record at `uri` through the two-tier cache.
    pub async fn fetch_record(
        &mut self,
        uri: &str,
        options: &LookupOptions,
    ) -> Option<PlaceRecord> {
        self.fetcher.fetch_record(uri, options).await
    }

    /// Fetches the raw record for place `id`.
    pub async fn fetch_place(&mut self, id: &str, options: &LookupOptions) -> Option<PlaceRecord> {
        let uri = self.uri_for(id)?;
        self.fetcher.fetch_record(&uri, options).await
    }
}
