//! Radio Browser API records
//!
//! Plain serde records mirroring the JSON the API servers return. Field
//! names follow Rust conventions; `#[serde(rename)]` maps them onto the
//! wire keys. Optional wire fields are `Option`s.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server statistics (`/json/stats`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerStats {
    /// API version the server supports
    pub supported_version: u32,

    /// Server software version
    pub software_version: String,

    /// Health status, `"OK"` when healthy
    pub status: String,

    /// Number of working stations
    pub stations: u64,

    /// Number of stations failing their checks
    pub station_broken: u64,

    /// Number of distinct tags
    pub tags: u64,

    /// Clicks in the last hour
    pub click_last_hour: u64,

    /// Clicks in the last 24 hours
    pub click_last_day: u64,

    /// Number of distinct languages
    pub languages: u64,

    /// Number of distinct countries
    pub countries: u64,
}

/// Result of voting for a station
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vote {
    /// Whether the vote was counted
    pub ok: bool,

    /// Server message, e.g. why a vote was refused
    pub message: String,
}

/// A single recorded station click
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationClick {
    /// Station that was clicked
    #[serde(rename = "stationuuid")]
    pub station_uuid: String,

    /// Unique ID of this click
    #[serde(rename = "clickuuid")]
    pub click_uuid: String,

    /// Click time, ISO 8601
    #[serde(rename = "clicktimestamp_iso8601")]
    pub click_timestamp_iso8601: String,

    /// Click time, `YYYY-MM-DD HH:MM:SS`
    #[serde(rename = "clicktimestamp")]
    pub click_timestamp: String,
}

/// Result of counting a click on a station
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationClickCounter {
    /// Whether the click was counted
    pub ok: bool,

    /// Server message
    pub message: String,

    /// Station that was clicked
    #[serde(rename = "stationuuid")]
    pub station_uuid: String,

    /// Stream URL to play
    pub url: String,
}

/// Result of adding a station
///
/// The API reports `ok` as the string `"true"` or `"false"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddStationResult {
    /// `"true"` or `"false"`
    pub ok: String,

    /// Server message
    pub message: String,

    /// UUID assigned to the new station
    pub uuid: String,
}

impl AddStationResult {
    /// Whether the station was accepted
    pub fn is_ok(&self) -> bool {
        self.ok.eq_ignore_ascii_case("true")
    }
}

/// Codec with its station count
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Codec {
    /// Codec name, e.g. `MP3`
    pub name: String,

    /// Stations using this codec
    #[serde(rename = "stationcount")]
    pub station_count: u64,
}

/// Country with its station count
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    /// Country name
    pub name: String,

    /// ISO 3166-1 alpha-2 code
    pub iso_3166_1: String,

    /// Stations in this country (camel case on the wire, unlike the
    /// other listing endpoints)
    #[serde(rename = "stationCount")]
    pub station_count: u64,
}

/// Language with its station count
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language {
    /// Language name
    pub name: String,

    /// ISO 639 code, when known
    #[serde(default)]
    pub iso_639: Option<String>,

    /// Stations broadcasting in this language
    #[serde(rename = "stationcount")]
    pub station_count: u64,
}

/// Country subdivision with its station count
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    /// Subdivision name
    pub name: String,

    /// Country the subdivision belongs to
    pub country: String,

    /// Stations in this subdivision
    #[serde(rename = "stationcount")]
    pub station_count: u64,
}

/// Streaming server known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamingServer {
    /// Server UUID
    pub uuid: String,

    /// Server base URL
    pub url: String,

    /// Status page URL
    #[serde(rename = "statusurl", default)]
    pub status_url: Option<String>,

    /// Last error seen when polling the server
    #[serde(default)]
    pub error: Option<String>,

    /// Administrator contact
    #[serde(rename = "admin")]
    pub admin_email: String,

    /// Server location
    pub location: String,

    /// Server software, e.g. `Icecast 2.4.4`
    pub software: String,
}

/// Outcome of a station check, derived from its flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Success,
    Failure,
    SslError,
    Timeout,
}

impl CheckStatus {
    /// Get a human-readable description of this status
    pub fn description(&self) -> &'static str {
        match self {
            CheckStatus::Success => "station is working",
            CheckStatus::Failure => "station check failed",
            CheckStatus::SslError => "TLS error",
            CheckStatus::Timeout => "connection timed out",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Checks slower than this count as timeouts
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one station check run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCheck {
    /// Station that was checked
    #[serde(rename = "stationuuid")]
    pub station_uuid: String,

    /// Unique ID of this check
    #[serde(rename = "checkuuid")]
    pub check_uuid: String,

    /// Server that ran the check
    pub source: String,

    /// Detected codec
    pub codec: String,

    /// Detected bitrate in kbps
    pub bitrate: u32,

    /// 1 if the stream is HLS
    pub hls: u8,

    /// 1 if the check succeeded
    pub ok: u8,

    /// Check time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,

    /// Check time, ISO 8601
    pub timestamp_iso8601: String,

    /// Resolved stream URL
    #[serde(rename = "urlcache")]
    pub url_cache: String,

    /// 1 if stream metadata overrides the database entry
    pub metainfo_overrides_database: u8,

    /// Public flag reported by the stream
    #[serde(rename = "public", default)]
    pub is_public: Option<String>,

    /// Name reported by the stream
    #[serde(default)]
    pub name: Option<String>,

    /// Description reported by the stream
    #[serde(default)]
    pub description: Option<String>,

    /// Comma separated
    #[serde(default)]
    pub tags: Option<String>,

    /// ISO 3166-1 country code
    #[serde(rename = "countrycode", default)]
    pub country_code: Option<String>,

    /// ISO 3166-2 subdivision code
    #[serde(rename = "countrysubdivisioncode", default)]
    pub country_subdivision_code: Option<String>,

    /// Homepage reported by the stream
    #[serde(default)]
    pub homepage: Option<String>,

    /// Icon URL reported by the stream
    #[serde(default)]
    pub favicon: Option<String>,

    /// Load balancer in front of the stream
    #[serde(rename = "loadbalancer", default)]
    pub load_balancer: Option<String>,

    /// Streaming software
    #[serde(default)]
    pub server_software: Option<String>,

    /// Sampling rate in Hz
    #[serde(default)]
    pub sampling: Option<u32>,

    /// Check duration in milliseconds
    pub timing_ms: u64,

    /// Comma separated
    #[serde(rename = "languagecodes", default)]
    pub language_codes: Option<String>,

    /// Non-zero if TLS failed
    pub ssl_error: u8,

    #[serde(rename = "geo_lat", default)]
    pub geo_latitude: Option<f64>,

    #[serde(rename = "geo_long", default)]
    pub geo_longitude: Option<f64>,
}

impl StationCheck {
    /// Whether the stream was reachable
    pub fn is_ok(&self) -> bool {
        self.ok == 1
    }

    /// Whether the stream is HLS
    pub fn is_hls(&self) -> bool {
        self.hls == 1
    }

    /// Whether the check hit a TLS error
    pub fn has_ssl_error(&self) -> bool {
        self.ssl_error != 0
    }

    /// Whether stream metadata replaces the database entry
    pub fn metadata_overrides_database(&self) -> bool {
        self.metainfo_overrides_database == 1
    }

    /// Tags split on commas, trimmed
    pub fn tag_list(&self) -> Vec<String> {
        split_list(self.tags.as_deref())
    }

    /// Language codes split on commas, trimmed
    pub fn language_code_list(&self) -> Vec<String> {
        split_list(self.language_codes.as_deref())
    }

    /// Time the check took
    pub fn timing(&self) -> Duration {
        Duration::from_millis(self.timing_ms)
    }

    /// Time the check took, in seconds
    pub fn timing_secs(&self) -> f64 {
        self.timing().as_secs_f64()
    }

    /// When the check ran, if the timestamp parses
    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp_iso8601)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Sampling rate, e.g. `44100 Hz`, or `Unknown`
    pub fn sampling_rate_description(&self) -> String {
        match self.sampling {
            Some(hz) => format!("{} Hz", hz),
            None => "Unknown".to_string(),
        }
    }

    /// Codec, bitrate and sampling rate, e.g. `MP3 128kbps @ 44100 Hz`
    pub fn audio_summary(&self) -> String {
        format!(
            "{} {}kbps @ {}",
            self.codec,
            self.bitrate,
            self.sampling_rate_description()
        )
    }

    /// Classify the check
    ///
    /// A TLS error wins over everything else; a failed check that took
    /// longer than [`CHECK_TIMEOUT`] is a timeout.
    pub fn status(&self) -> CheckStatus {
        if self.has_ssl_error() {
            CheckStatus::SslError
        } else if self.is_ok() {
            CheckStatus::Success
        } else if self.timing() > CHECK_TIMEOUT {
            CheckStatus::Timeout
        } else {
            CheckStatus::Failure
        }
    }
}

/// One step of a station check (redirects, playlist resolution)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationCheckStep {
    /// Unique ID of this step
    #[serde(rename = "stepuuid")]
    pub step_uuid: String,

    /// Step this one was reached from
    #[serde(rename = "parent_stepuuid", default)]
    pub parent_step_uuid: Option<String>,

    /// Check the step belongs to
    #[serde(rename = "checkuuid")]
    pub check_uuid: String,

    /// Station being checked
    #[serde(rename = "stationuuid")]
    pub station_uuid: String,

    /// URL fetched in this step
    pub url: String,

    /// Kind of resource found, e.g. `PLS`
    #[serde(rename = "urltype", default)]
    pub url_type: Option<String>,

    /// Error hit in this step
    #[serde(default)]
    pub error: Option<String>,

    /// Step time, ISO 8601
    pub creation_iso8601: String,
}

fn split_list(value: Option<&str>) -> Vec<String> {
    match value {
        Some(v) if !v.is_empty() => v.split(',').map(|s| s.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}
