//! Configuration types for the Radio Browser client

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use radio_dns::SelectionStrategy;

use crate::error::{Error, Result};

/// SRV name under which the Radio Browser API servers are published
pub const DEFAULT_SERVICE_NAME: &str = "_api._tcp.radio-browser.info";

/// Main configuration structure
///
/// Every field has a default, so an empty file (or no file at all) gives a
/// working client that discovers servers through Cloudflare's resolver.
///
/// # Example Configuration
///
/// ```toml
/// log_level = "info"
///
/// [discovery]
/// service_name = "_api._tcp.radio-browser.info"
/// doh_endpoint = "https://1.1.1.1/dns-query"
/// timeout_secs = 5
/// strategy = "random"
///
/// [http]
/// user_agent = "radio-browser-rs/0.1.0"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Server discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Settings for requests to the API servers
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            discovery: DiscoveryConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.discovery.validate()?;
        self.http.validate()?;
        Ok(())
    }

    /// Generate a sample configuration
    pub fn sample() -> String {
        format!(
            r#"# Radio Browser client configuration

# Log level: "error", "warn", "info", "debug", "trace"
log_level = "info"

# Server discovery via DNS SRV records over DNS-over-HTTPS
[discovery]
# SRV name listing the API servers
service_name = "{service}"

# DNS-over-HTTPS endpoint (JSON API)
doh_endpoint = "{endpoint}"

# DoH request timeout in seconds (default: 5)
timeout_secs = 5

# Server selection: "random", "round-robin", or "weighted" (default: random)
#   random      - uniform over every discovered server
#   round-robin - cycle through servers in priority/weight order
#   weighted    - RFC 2782: lowest priority tier, proportional to weight
strategy = "random"

# Requests to the API servers
[http]
# User-Agent sent with every API request
user_agent = "{agent}"

# Request timeout in seconds (default: 10)
timeout_secs = 10
"#,
            service = DEFAULT_SERVICE_NAME,
            endpoint = radio_dns::DEFAULT_DOH_ENDPOINT,
            agent = default_user_agent(),
        )
    }
}

/// Server discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// SRV name to resolve
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// DNS-over-HTTPS endpoint
    #[serde(default = "default_doh_endpoint")]
    pub doh_endpoint: String,

    /// DoH request timeout in seconds
    #[serde(default = "default_doh_timeout")]
    pub timeout_secs: u64,

    /// Server selection strategy
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            doh_endpoint: default_doh_endpoint(),
            timeout_secs: default_doh_timeout(),
            strategy: default_strategy(),
        }
    }
}

impl DiscoveryConfig {
    /// Validate discovery configuration
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(Error::Config("discovery.service_name is required".into()));
        }

        if !self.doh_endpoint.starts_with("https://") && !self.doh_endpoint.starts_with("http://") {
            return Err(Error::Config(format!(
                "discovery.doh_endpoint '{}' must be an http(s) URL",
                self.doh_endpoint
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("discovery.timeout_secs must be > 0".into()));
        }

        self.selection_strategy()?;

        Ok(())
    }

    /// DoH request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse the configured selection strategy
    pub fn selection_strategy(&self) -> Result<SelectionStrategy> {
        self.strategy
            .parse()
            .map_err(|e: radio_dns::Error| Error::Config(format!("discovery.strategy: {}", e)))
    }
}

/// API request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for API requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_http_timeout(),
        }
    }
}

impl HttpConfig {
    /// Validate HTTP configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Config("http.timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_doh_endpoint() -> String {
    radio_dns::DEFAULT_DOH_ENDPOINT.to_string()
}

fn default_doh_timeout() -> u64 {
    radio_dns::DEFAULT_TIMEOUT.as_secs()
}

fn default_strategy() -> String {
    SelectionStrategy::default().to_string()
}

fn default_user_agent() -> String {
    format!("radio-browser-rs/{}", env!("CARGO_PKG_VERSION"))
}

fn default_http_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.discovery.service_name, "_api._tcp.radio-browser.info");
        assert_eq!(config.discovery.doh_endpoint, "https://1.1.1.1/dns-query");
        assert_eq!(config.discovery.timeout(), Duration::from_secs(5));
        assert_eq!(
            config.discovery.selection_strategy().unwrap(),
            SelectionStrategy::Random
        );
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        assert!(config.http.user_agent.starts_with("radio-browser-rs/"));
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
log_level = "debug"

[discovery]
service_name = "_api._tcp.example.org"
doh_endpoint = "https://dns.google/resolve"
timeout_secs = 3
strategy = "weighted"

[http]
user_agent = "my-player/2.0"
timeout_secs = 30
"#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.discovery.service_name, "_api._tcp.example.org");
        assert_eq!(config.discovery.doh_endpoint, "https://dns.google/resolve");
        assert_eq!(config.discovery.timeout(), Duration::from_secs(3));
        assert_eq!(
            config.discovery.selection_strategy().unwrap(),
            SelectionStrategy::Weighted
        );
        assert_eq!(config.http.user_agent, "my-player/2.0");
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_sample_config_is_valid() {
        let config = Config::from_toml(&Config::sample()).unwrap();
        assert_eq!(config.discovery.service_name, DEFAULT_SERVICE_NAME);
        assert_eq!(config.discovery.doh_endpoint, radio_dns::DEFAULT_DOH_ENDPOINT);
    }

    #[test]
    fn test_empty_service_name_fails() {
        let toml = r#"
[discovery]
service_name = ""
"#;
        assert!(matches!(Config::from_toml(toml), Err(Error::Config(_))));
    }

    #[test]
    fn test_non_http_endpoint_fails() {
        let toml = r#"
[discovery]
doh_endpoint = "tls://dns.google"
"#;
        assert!(matches!(Config::from_toml(toml), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_timeouts_fail() {
        assert!(Config::from_toml("[discovery]\ntimeout_secs = 0\n").is_err());
        assert!(Config::from_toml("[http]\ntimeout_secs = 0\n").is_err());
    }

    #[test]
    fn test_unknown_strategy_fails() {
        let err = Config::from_toml("[discovery]\nstrategy = \"fastest\"\n").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml("[discovery\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/radio-browser.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "radio-browser-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[discovery]\nstrategy = \"round-robin\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            config.discovery.selection_strategy().unwrap(),
            SelectionStrategy::RoundRobin
        );
    }
}
