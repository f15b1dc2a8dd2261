//! Error types shared across the core crate.
//!
//! Each concern gets its own enum so callers can match on what actually went
//! wrong; pluggable seams (backends, location providers, storage) report
//! through `anyhow` and are wrapped here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DateError {
    #[error("Malformed date '{input}': expected YYYY-MM-DD")]
    Malformed {
        input: String,
        /// `None` when the input is rejected before chrono sees it.
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("Date {0} has no counterpart one year earlier")]
    OutOfRange(chrono::NaiveDate),
}

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Mock mode is off and no backend has been wired in.
    #[error("Real API not implemented yet. Set use_mock_data to true.")]
    Unimplemented,

    #[error("Weather backend request failed: {0:#}")]
    Backend(#[source] anyhow::Error),

    #[error(transparent)]
    Date(#[from] DateError),
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location permission request failed: {0:#}")]
    Permission(#[source] anyhow::Error),

    #[error("Could not determine current position: {0:#}")]
    Position(#[source] anyhow::Error),

    #[error("Reverse geocoding failed: {0:#}")]
    Geocode(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Network error. Please check your connection.")]
    Network(#[source] reqwest::Error),

    #[error("API request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to decode API response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Token storage error: {0:#}")]
    Storage(#[source] anyhow::Error),

    #[error("Invalid API configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unimplemented_message_points_at_mock_mode() {
        let msg = WeatherError::Unimplemented.to_string();
        assert!(msg.contains("not implemented"));
        assert!(msg.contains("use_mock_data"));
    }

    #[test]
    fn http_error_exposes_status() {
        let err = ApiError::Http { status: 401, message: "expired".into() };
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("expired"));
    }
}
