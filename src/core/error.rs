//! Error types for meshroute.

use thiserror::Error;

/// Result type alias for routing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in routing operations.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration load failed: {0}")]
    ConfigLoadFailed(String),

    #[error("Duplicate region id: {0}")]
    DuplicateRegionId(String),

    #[error("No regions configured")]
    NoRegionsConfigured,

    #[error("Geo rule references unknown region: {0}")]
    UnknownGeoRuleTarget(String),

    #[error("Region {0} declares no health endpoints")]
    MissingHealthEndpoints(String),

    // Runtime errors
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigLoadFailed(err.to_string())
    }
}
