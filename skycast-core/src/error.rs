//! Error taxonomy for a lookup, split by where the failure originates:
//! input validation, geolocation, retrieval, or configuration.

use thiserror::Error;

/// Rejections of free-text city input; these never reach the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no city name entered")]
    EmptyInput,

    #[error("city names may only contain letters, spaces, commas and hyphens")]
    InvalidCityName,
}

/// Failures of the one-shot positioning capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("geolocation is not available")]
    Unsupported,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("location request timed out")]
    Timeout,

    #[error("location error: {0}")]
    Unknown(String),
}

/// Failures of the two-call retrieval sequence against the provider.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("location not found")]
    LocationNotFound,

    #[error("invalid API credentials")]
    InvalidCredentials,

    #[error("weather service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("forecast unavailable: {0}")]
    ForecastUnavailable(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected provider response: {0}")]
    Parse(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no API key configured. Run `skycast configure` and enter your OpenWeather API key")]
    MissingApiKey,
}

/// Everything a single lookup can fail with, classified at the session
/// boundary. Each variant maps to exactly one user-visible message.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LookupError {
    /// Short classification tag, for logs and presenters.
    pub fn tag(&self) -> &'static str {
        match self {
            LookupError::Validation(_) => "validation",
            LookupError::Geolocation(_) => "geolocation",
            LookupError::Retrieval(_) => "retrieval",
            LookupError::Config(_) => "config",
        }
    }

    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            LookupError::Validation(ValidationError::EmptyInput) => {
                "Please enter a city name.".into()
            }
            LookupError::Validation(ValidationError::InvalidCityName) => {
                "Please enter a valid city name (letters, spaces, commas and hyphens only).".into()
            }
            LookupError::Geolocation(GeolocationError::Unsupported) => {
                "Geolocation is not supported on this device.".into()
            }
            LookupError::Geolocation(GeolocationError::PermissionDenied) => {
                "Location access denied. Please search for a city instead.".into()
            }
            LookupError::Geolocation(GeolocationError::PositionUnavailable) => {
                "Your location could not be determined. Please search for a city instead.".into()
            }
            LookupError::Geolocation(GeolocationError::Timeout) => {
                "Location request timed out. Please search for a city instead.".into()
            }
            LookupError::Geolocation(GeolocationError::Unknown(_)) => {
                "Could not determine your location. Please search for a city instead.".into()
            }
            LookupError::Retrieval(RetrievalError::LocationNotFound) => {
                "City not found. Please check the spelling.".into()
            }
            LookupError::Retrieval(RetrievalError::InvalidCredentials) => {
                "Invalid API key. Please check your configuration.".into()
            }
            LookupError::Retrieval(RetrievalError::ServiceUnavailable(_)) => {
                "Weather service is currently unavailable. Please try again later.".into()
            }
            LookupError::Retrieval(RetrievalError::ForecastUnavailable(_)) => {
                "Forecast data is currently unavailable. Please try again later.".into()
            }
            LookupError::Retrieval(RetrievalError::Network(_)) => {
                "Network error. Please check your connection and try again.".into()
            }
            LookupError::Retrieval(RetrievalError::Parse(_)) => {
                "Received an unexpected response from the weather service.".into()
            }
            LookupError::Config(ConfigError::MissingApiKey) => {
                "No API key configured. Run `skycast configure` first.".into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_matches_ui_copy() {
        let err = LookupError::from(RetrievalError::LocationNotFound);
        assert_eq!(err.tag(), "retrieval");
        assert_eq!(err.user_message(), "City not found. Please check the spelling.");
    }

    #[test]
    fn every_validation_variant_has_a_message() {
        for variant in [ValidationError::EmptyInput, ValidationError::InvalidCityName] {
            let msg = LookupError::from(variant).user_message();
            assert!(!msg.is_empty());
        }
    }
}
