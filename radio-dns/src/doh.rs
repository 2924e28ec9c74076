//! DNS-over-HTTPS resolver
//!
//! Queries a DoH endpoint using the JSON API (`application/dns-json`) that
//! Cloudflare and Google expose at `/dns-query` and `/resolve`:
//!
//! ```text
//! GET https://1.1.1.1/dns-query?name=_api._tcp.radio-browser.info&type=SRV
//! Accept: application/dns-json
//!
//! {"Status":0, "Answer":[{"name":"...","type":33,"TTL":300,"data":"1 1 443 de1.api.radio-browser.info."}]}
//! ```
//!
//! The resolver returns the `Answer` array untouched; turning entries into
//! records is the job of [`crate::srv`].

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Default DoH endpoint (Cloudflare)
pub const DEFAULT_DOH_ENDPOINT: &str = "https://1.1.1.1/dns-query";

/// Default DoH request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Media type of the DNS-JSON wire format
pub const DNS_JSON_CONTENT_TYPE: &str = "application/dns-json";

/// A single entry of the `Answer` array, as sent by the resolver
pub type RawAnswer = serde_json::Map<String, serde_json::Value>;

/// Top-level DNS-JSON response
#[derive(Debug, Deserialize)]
struct DnsJsonResponse {
    /// DNS response code (0 = NOERROR, 3 = NXDOMAIN, ...)
    #[serde(rename = "Status")]
    status: Option<u16>,

    #[serde(rename = "Answer")]
    answer: Option<Vec<RawAnswer>>,
}

/// Decode a DNS-JSON body into its raw answer entries
///
/// Fails with [`Error::InvalidResponse`] if the body is not a JSON object,
/// `Answer` is missing, or `Answer` is not an array of objects.
pub fn decode_response(body: &[u8]) -> Result<Vec<RawAnswer>> {
    let response: DnsJsonResponse = serde_json::from_slice(body)
        .map_err(|e| Error::InvalidResponse(format!("malformed DNS-JSON body: {}", e)))?;

    if let Some(status) = response.status {
        log::debug!("DoH response status: {}", status);
    }

    response
        .answer
        .ok_or_else(|| match response.status {
            Some(status) => {
                Error::InvalidResponse(format!("no Answer section (status {})", status))
            }
            None => Error::InvalidResponse("no Answer section".into()),
        })
}

/// SRV resolver backed by a DNS-over-HTTPS endpoint
#[derive(Debug, Clone)]
pub struct DohResolver {
    /// DoH endpoint, without query parameters
    endpoint: Url,

    /// HTTP client used for the queries
    http_client: reqwest::Client,
}

impl DohResolver {
    /// Create a resolver for `endpoint` with its own HTTP client
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Self::with_client(endpoint, http_client)
    }

    /// Create a resolver that shares an existing HTTP client
    pub fn with_client(endpoint: &str, http_client: reqwest::Client) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::Config("empty DoH endpoint".into()));
        }

        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid DoH endpoint '{}': {}", endpoint, e)))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "unsupported DoH endpoint scheme '{}', expected 'https'",
                endpoint.scheme()
            )));
        }

        Ok(Self {
            endpoint,
            http_client,
        })
    }

    /// Create a resolver for the default Cloudflare endpoint
    pub fn cloudflare() -> Result<Self> {
        Self::new(DEFAULT_DOH_ENDPOINT, DEFAULT_TIMEOUT)
    }

    /// The configured DoH endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Build the query URL for an SRV lookup of `name`
    ///
    /// Only emptiness is checked here; label syntax is left to the resolver.
    pub fn query_url(&self, name: &str) -> Result<Url> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidRequest("empty service name".into()));
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("type", "SRV");

        Ok(url)
    }

    /// Look up the SRV records of `name`
    ///
    /// Performs exactly one GET request and returns the `Answer` array in
    /// resolver order. No retries are attempted.
    pub async fn query_srv(&self, name: &str) -> Result<Vec<RawAnswer>> {
        let url = self.query_url(name)?;

        log::debug!("Querying {} for SRV records of {}", self.endpoint, name);

        let response = self
            .http_client
            .get(url)
            .header(ACCEPT, DNS_JSON_CONTENT_TYPE)
            .header(CONTENT_TYPE, DNS_JSON_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| Error::ResolutionFailed(format!("DoH request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            log::warn!("DoH server {} returned {}", self.endpoint, status);
            return Err(Error::ResolutionFailed(format!(
                "DoH server returned error: {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::ResolutionFailed(format!("failed to read DoH response: {}", e)))?;

        decode_response(&body)
    }
}
