//! Error types for gigscout.
//!
//! This module defines the centralized error type [`GigscoutError`] and a type alias
//! [`Result`] used throughout the crate. All errors are implemented with the
//! `thiserror` crate.
//!
//! # Surfacing Policy
//!
//! Not every variant reaches the user. Search failures (`Network`, `Decode`,
//! `Geocoding`, `Validation`) are recorded as the session's last error. `Storage`
//! and `Io` failures raised by a key/value backend are absorbed by the favourites
//! and last-search stores, which degrade to "empty" instead.

use thiserror::Error;

/// The main error type for gigscout operations.
///
/// # Examples
///
/// ```
/// use gigscout::GigscoutError;
///
/// let err = GigscoutError::Geocoding("Atlantis".to_string());
/// assert_eq!(err.to_string(), "No location found for \"Atlantis\"");
/// ```
#[derive(Debug, Error)]
pub enum GigscoutError {
    /// The discovery request could not be sent or returned a non-success status.
    #[error("Network error: {0}")]
    Network(String),

    /// The discovery response body was not a valid events payload.
    #[error("Could not read events response: {0}")]
    Decode(String),

    /// The geocoder had no match for a city name.
    #[error("No location found for \"{0}\"")]
    Geocoding(String),

    /// A search query was rejected before any request was made.
    #[error("Invalid search: {0}")]
    Validation(String),

    /// Key/value persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or missing.
    ///
    /// Raised when the configuration file cannot be parsed or when the discovery
    /// client is built without an API key.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GigscoutError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// A specialized `Result` type for gigscout operations.
pub type Result<T> = std::result::Result<T, GigscoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: GigscoutError = io.into();
        assert!(matches!(err, GigscoutError::Io(_)));
    }
}
