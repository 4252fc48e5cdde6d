use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the Pathfinder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No directions provider key is configured.
    #[error("no routing provider configured; set MAPBOX_API_KEY or ORS_API_KEY")]
    NoProviderConfigured,

    /// A directions provider exhausted its attempts or returned an unusable body.
    #[error("{provider} request failed: {message}")]
    Provider { provider: String, message: String },

    /// The trip exceeds a single tank and no chain of stations connects it.
    #[error(
        "No feasible route found: {direct_miles:.1} mi trip exceeds the {max_range_miles:.0} mi range and no refuelling chain reaches the destination"
    )]
    NoFeasibleRoute {
        direct_miles: f64,
        max_range_miles: f64,
    },

    /// No geocoding provider produced a result for an address the caller needed.
    #[error("no geocoding result for address '{address}'")]
    AddressNotFound { address: String },

    /// Raised when a coordinate string or value is invalid.
    #[error("invalid coordinate '{input}': {message}")]
    InvalidCoordinate { input: String, message: String },

    /// Raised when a fuel price cannot be parsed or is negative.
    #[error("invalid fuel price '{input}': {message}")]
    InvalidPrice { input: String, message: String },

    /// Raised when a configuration value cannot be parsed or fails validation.
    #[error("invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// No suitable cache directory could be resolved for the geocode cache file.
    #[error("failed to resolve cache directories for the geocode cache")]
    CacheDirsUnavailable,

    /// Raised when the geocode cache file exists but cannot be decoded.
    #[error("failed to load geocode cache from {path}: {message}")]
    CacheLoad { path: PathBuf, message: String },

    /// A persisted route row could not be decoded.
    #[error("stored route {id} is corrupt: {message}")]
    CorruptRoute { id: i64, message: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON encoding and decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn provider(provider: &str, message: impl Into<String>) -> Self {
        Error::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error describes a user-facing condition rather than a system fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::NoFeasibleRoute { .. }
                | Error::AddressNotFound { .. }
                | Error::InvalidCoordinate { .. }
        )
    }
}
