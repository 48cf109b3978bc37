//! Raw record retrieval through a two-tier cache.
//!
//! Lookup order for a record URI:
//!
//! 1. the in-memory memo (per session, keyed by URI);
//! 2. the on-disk raw cache, `<output_dir>/<id>.geojson`, unless
//!    [`LookupOptions::force`] is set;
//! 3. a network GET through the [`Transport`].
//!
//! A network fetch only counts as successful once its body has parsed
//! *and* been written to the disk cache. A body that cannot be persisted
//! is discarded: it is neither returned nor memoized.

use std::collections::BTreeMap;
use std::path::Path;

use gazetteer_resolver_models::{LookupOptions, PlaceRecord};

use crate::codec::id_from_uri;
use crate::paths::raw_record_path;
use crate::record::parse_record;
use crate::transport::Transport;
use crate::GazetteerError;

/// Fetches place records, memoizing successes for the session.
pub struct RecordFetcher {
    transport: Box<dyn Transport>,
    memo: BTreeMap<String, PlaceRecord>,
    network_fetches: usize,
}

impl RecordFetcher {
    #[must_use]
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            memo: BTreeMap::new(),
            network_fetches: 0,
        }
    }

    /// Number of network requests issued so far.
    #[must_use]
    pub const fn network_fetches(&self) -> usize {
        self.network_fetches
    }

    /// Returns `true` if `uri` has been memoized this session.
    #[must_use]
    pub fn is_memoized(&self, uri: &str) -> bool {
        self.memo.contains_key(uri)
    }

    /// Number of memoized records.
    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    /// Returns the record at `uri`, or `None` if it cannot be obtained.
    ///
    /// Failures (empty URI, transport error, malformed body, unwritable
    /// cache file) are logged when `options.verbose` is set and otherwise
    /// absorbed. After a successful network fetch the call sleeps for
    /// `options.sleep` to rate-limit the remote service.
    pub async fn fetch_record(
        &mut self,
        uri: &str,
        options: &LookupOptions,
    ) -> Option<PlaceRecord> {
        if uri.is_empty() {
            return None;
        }

        if let Some(record) = self.memo.get(uri) {
            return Some(record.clone());
        }

        let id = id_from_uri(uri);
        let path = raw_record_path(&options.output_dir, &id);

        if !options.force {
            if let Some(record) = read_cached(&path, options).await {
                self.memo.insert(uri.to_string(), record.clone());
                return Some(record);
            }
        }

        if options.verbose {
            log::info!("downloading {uri}");
        }
        self.network_fetches += 1;

        let body = match self.transport.get(uri).await {
            Ok(body) => body,
            Err(e) => {
                if options.verbose {
                    log::warn!("Failed to download {uri}: {e}");
                }
                return None;
            }
        };

        let record = match parse_record(&body) {
            Ok(record) => record,
            Err(e) => {
                if options.verbose {
                    log::warn!("Invalid JSON at {uri}: {e}");
                }
                return None;
            }
        };

        if let Err(e) = write_cached(&path, &body).await {
            if options.verbose {
                log::warn!("Error writing {uri}: {e}");
            }
            return None;
        }

        self.memo.insert(uri.to_string(), record.clone());
        tokio::time::sleep(options.sleep).await;
        Some(record)
    }
}

/// Reads and parses a raw cache file. A missing file is a silent miss; an
/// unreadable or malformed one is reported and also treated as a miss.
async fn read_cached(path: &Path, options: &LookupOptions) -> Option<PlaceRecord> {
    let body = match tokio::fs::read_to_string(path).await {
        Ok(body) => body,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            if options.verbose {
                log::warn!("Failed to read cached record {}: {e}", path.display());
            }
            return None;
        }
    };

    match parse_record(&body) {
        Ok(record) => Some(record),
        Err(e) => {
            if options.verbose {
                log::warn!("Ignoring malformed cached record {}: {e}", path.display());
            }
            None
        }
    }
}

async fn write_cached(path: &Path, body: &str) -> Result<(), GazetteerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| GazetteerError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
    }

    tokio::fs::write(path, body)
        .await
        .map_err(|e| GazetteerError::Io {
            path: path.display().to_string(),
            source: e,
        })
}
