//! Network access for raw place records.
//!
//! The [`Transport`] trait is the only seam through which the resolver
//! talks to the remote service. [`HttpTransport`] is the production
//! implementation; tests substitute an in-memory one.

use async_trait::async_trait;

use crate::GazetteerError;
use crate::service::GazetteerService;

/// Fetches the body of a record document.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET for `uri` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if the request fails or the server
    /// answers with a non-success status.
    async fn get(&self, uri: &str) -> Result<String, GazetteerError>;
}

/// `reqwest`-backed transport. Follows redirects up to the service's
/// configured limit; no retries.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds the HTTP client from the service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::Http`] if the client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(service: &GazetteerService) -> Result<Self, GazetteerError> {
        let client = reqwest::Client::builder()
            .user_agent(service.user_agent.clone())
            .timeout(service.timeout())
            .redirect(reqwest::redirect::Policy::limited(service.max_redirects))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, uri: &str) -> Result<String, GazetteerError> {
        let resp = self.client.get(uri).send().await?;

        if !resp.status().is_success() {
            return Err(GazetteerError::HttpStatus {
                url: uri.to_string(),
                status: resp.status().as_u16(),
            });
        }

        Ok(resp.text().await?)
    }
}
