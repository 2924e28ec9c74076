//! Radio Browser client
//!
//! Finds the Radio Browser API servers through DNS SRV records resolved
//! over DNS-over-HTTPS, and spreads requests across them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     radio-cli / apps                     │
//! └────────────────────────────┬─────────────────────────────┘
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                      radio-browser                       │
//! │  - DiscoveryClient (initialize, select, requests)        │
//! │  - Config (TOML configuration)                           │
//! │  - Models (API records)                                  │
//! └────────────────────────────┬─────────────────────────────┘
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                        radio-dns                         │
//! │  DohResolver ─▶ parse_answers ─▶ ServerList ─▶ strategy  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use radio_browser::{Config, DiscoveryClient};
//!
//! # async fn example() -> radio_browser::Result<()> {
//! let client = DiscoveryClient::from_config(&Config::default())?;
//! client.initialize().await?;
//!
//! let body = client.search_stations("jazz").await?;
//! println!("{}", String::from_utf8_lossy(&body));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod models;

pub use config::{Config, DiscoveryConfig, HttpConfig, DEFAULT_SERVICE_NAME};
pub use discovery::DiscoveryClient;
pub use error::{Error, Result};
pub use models::{
    AddStationResult, CheckStatus, Codec, Country, Language, ServerStats, State,
    StationCheck, StationCheckStep, StationClick, StationClickCounter, StreamingServer, Vote,
};
