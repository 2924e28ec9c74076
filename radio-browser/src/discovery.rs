//! Discovery client
//!
//! Holds the most recently discovered [`ServerList`] and hands out one
//! server per outgoing request. The client starts out uninitialized;
//! [`DiscoveryClient::initialize`] resolves the SRV name and stores the
//! result, and it must be called again to pick up topology changes.

use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, PoisonError, RwLock};

use radio_dns::{parse_answers, DohResolver, SelectionStrategy, ServerList};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::ServerStats;

/// Path of the station search endpoint
pub const SEARCH_PATH: &str = "/json/stations/search";

/// Path of the server statistics endpoint
pub const STATS_PATH: &str = "/json/stats";

/// Client that discovers Radio Browser servers and spreads requests across them
#[derive(Debug)]
pub struct DiscoveryClient {
    /// SRV name to resolve
    service_name: String,

    /// DoH resolver used by `initialize`
    resolver: DohResolver,

    /// HTTP client for API requests
    http_client: reqwest::Client,

    /// Server selection strategy
    strategy: SelectionStrategy,

    /// Round-robin position
    cursor: AtomicUsize,

    /// `None` until the first successful discovery
    servers: RwLock<Option<Arc<ServerList>>>,
}

impl DiscoveryClient {
    /// Create a new client
    pub fn new(
        service_name: impl Into<String>,
        resolver: DohResolver,
        strategy: SelectionStrategy,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            resolver,
            http_client,
            strategy,
            cursor: AtomicUsize::new(0),
            servers: RwLock::new(None),
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let resolver = DohResolver::new(&config.discovery.doh_endpoint, config.discovery.timeout())?;
        let strategy = config.discovery.selection_strategy()?;

        let http_client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.http.timeout())
            .user_agent(config.http.user_agent.as_str())
            .build()?;

        log::info!(
            "Discovery client for {} via {} ({} selection)",
            config.discovery.service_name,
            resolver.endpoint(),
            strategy
        );

        Ok(Self::new(
            config.discovery.service_name.clone(),
            resolver,
            strategy,
            http_client,
        ))
    }

    /// SRV name this client resolves
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Selection strategy in use
    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Resolve the service name and replace the stored server list
    ///
    /// On failure the previously stored list (if any) is left untouched.
    /// An empty answer is a success and leaves the client ready with no
    /// servers.
    pub async fn initialize(&self) -> Result<Arc<ServerList>> {
        let answers = match self.resolver.query_srv(&self.service_name).await {
            Ok(answers) => answers,
            Err(e) => {
                log::warn!("Server discovery for {} failed: {}", self.service_name, e);
                return Err(e.into());
            }
        };

        let batch = parse_answers(&answers);
        if !batch.skipped.is_empty() {
            log::debug!(
                "Skipped {} of {} DNS answers for {}",
                batch.skipped.len(),
                answers.len(),
                self.service_name
            );
        }

        let servers = Arc::new(ServerList::from_records(batch.records));
        if servers.is_empty() {
            log::warn!("No servers found for {}", self.service_name);
        } else {
            log::info!(
                "Discovered {} servers for {}: {:?}",
                servers.len(),
                self.service_name,
                servers.urls()
            );
        }

        *self.servers.write().unwrap_or_else(PoisonError::into_inner) = Some(servers.clone());
        Ok(servers)
    }

    /// Whether a discovery has completed successfully
    pub fn is_ready(&self) -> bool {
        self.servers().is_some()
    }

    /// Snapshot of the current server list
    pub fn servers(&self) -> Option<Arc<ServerList>> {
        self.servers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Pick the base URL for the next request
    ///
    /// Fails with [`Error::NoServersAvailable`] both before the first
    /// discovery and when discovery found nothing.
    pub fn select_server(&self) -> Result<String> {
        let servers = self.servers().ok_or(Error::NoServersAvailable)?;

        let entry = self
            .strategy
            .select(&servers, &self.cursor, &mut rand::rng())
            .ok_or(Error::NoServersAvailable)?;

        log::debug!("Selected server {}", entry.url);
        Ok(entry.url.clone())
    }

    /// Build the station search URL against `base`
    pub fn search_url(base: &str, query: &str) -> Result<Url> {
        let mut url = endpoint_url(base, SEARCH_PATH)?;
        url.query_pairs_mut().append_pair("name", query);
        Ok(url)
    }

    /// Search stations by name on one selected server
    ///
    /// Returns the raw response body. A non-success status is logged but
    /// its body is still handed back to the caller.
    pub async fn search_stations(&self, query: &str) -> Result<Vec<u8>> {
        let base = self.select_server()?;
        self.search_stations_at(&base, query).await
    }

    /// Search stations by name on the server at `base`
    pub async fn search_stations_at(&self, base: &str, query: &str) -> Result<Vec<u8>> {
        let url = Self::search_url(base, query)?;

        log::debug!("GET {}", url);
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Station search on {} returned {}", base, status);
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// GET `path` on one selected server and decode the JSON body
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let base = self.select_server()?;
        self.fetch_json_at(&base, path).await
    }

    /// GET `path` on the server at `base` and decode the JSON body
    ///
    /// Unlike station search, a non-success status is an error here.
    pub async fn fetch_json_at<T: DeserializeOwned>(&self, base: &str, path: &str) -> Result<T> {
        let url = endpoint_url(base, path)?;

        log::debug!("GET {}", url);
        let response = self.http_client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetch statistics of one selected server
    pub async fn server_stats(&self) -> Result<ServerStats> {
        self.fetch_json(STATS_PATH).await
    }
}

/// Join an absolute `path` onto `base`
///
/// `path` must start with exactly one `/`. A leading `//` (or `/\`) would
/// make `Url::join` treat it as scheme-relative and leave the selected host.
fn endpoint_url(base: &str, path: &str) -> Result<Url> {
    let rest = path.strip_prefix('/').ok_or_else(|| {
        Error::InvalidRequest(format!("request path '{}' must start with '/'", path))
    })?;
    if rest.starts_with(['/', '\\']) {
        return Err(Error::InvalidRequest(format!(
            "request path '{}' must not name another host",
            path
        )));
    }

    let base = Url::parse(base)
        .map_err(|e| Error::InvalidRequest(format!("bad server URL '{}': {}", base, e)))?;

    base.join(path)
        .map_err(|e| Error::InvalidRequest(format!("bad request path '{}': {}", path, e)))
}
