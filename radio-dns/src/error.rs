//! Error types for SRV discovery over DNS-over-HTTPS

use thiserror::Error;

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving SRV records over DoH
#[derive(Debug, Error)]
pub enum Error {
    /// The DoH request URL could not be built (empty or malformed service name)
    #[error("invalid DNS request: {0}")]
    InvalidRequest(String),

    /// Transport failure or non-success status from the DoH endpoint
    #[error("DNS resolution failed: {0}")]
    ResolutionFailed(String),

    /// The response body did not match the DNS-JSON shape
    #[error("invalid DNS response: {0}")]
    InvalidResponse(String),

    /// Resolver configuration error
    #[error("DNS configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if retrying the same request later may succeed
    ///
    /// Only transport-level failures qualify; a malformed request or a
    /// response in the wrong shape will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ResolutionFailed(_))
    }
}
