//! Location resolution: free-text city validation and the one-shot
//! geolocation capability.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{GeolocationError, ValidationError};
use crate::model::Location;

/// Validate free-text input into a city location.
///
/// The input is trimmed first; empty input and anything outside letters,
/// spaces, commas and hyphens is rejected before it can reach the network.
pub fn parse_city(input: &str) -> Result<Location, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let valid = trimmed
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c == ' ' || c == ',' || c == '-');
    if !valid {
        return Err(ValidationError::InvalidCityName);
    }

    Ok(Location::City { name: trimmed.to_string() })
}

/// Options for a position request, mirroring the browser geolocation
/// contract. `high_accuracy` is advisory; backends that cannot honor it
/// ignore it.
#[derive(Debug, Clone, Copy)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(600),
        }
    }
}

/// One-shot "where am I" capability.
#[async_trait]
pub trait Geolocator: Send + Sync + std::fmt::Debug {
    fn is_available(&self) -> bool {
        true
    }

    /// Current position as `(lat, lon)`, or a classified failure.
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<(f64, f64), GeolocationError>;
}

const IP_API_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

/// Approximate device position from the machine's public IP address,
/// via the keyless ip-api.com endpoint. A fix younger than
/// `maximum_age` is served from memory without a new request.
#[derive(Debug)]
pub struct IpGeolocator {
    http: Client,
    endpoint: String,
    last_fix: Mutex<Option<(Instant, (f64, f64))>>,
}

impl IpGeolocator {
    pub fn new() -> Self {
        Self::with_endpoint(IP_API_URL.to_string())
    }

    pub fn with_endpoint(endpoint: String) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            last_fix: Mutex::new(None),
        }
    }
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<(f64, f64), GeolocationError> {
        let mut cached = self.last_fix.lock().await;
        if let Some((at, fix)) = *cached {
            if at.elapsed() <= options.maximum_age {
                tracing::debug!(age_secs = at.elapsed().as_secs(), "serving cached position");
                return Ok(fix);
            }
        }

        let res = self
            .http
            .get(&self.endpoint)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(classify_transport)?;

        if !res.status().is_success() {
            tracing::debug!(status = %res.status(), "ip lookup rejected");
            return Err(GeolocationError::PositionUnavailable);
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| GeolocationError::Unknown(e.to_string()))?;

        if body.status != "success" {
            tracing::debug!(
                message = body.message.as_deref().unwrap_or(""),
                "ip lookup failed"
            );
            return Err(GeolocationError::PositionUnavailable);
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                *cached = Some((Instant::now(), (lat, lon)));
                Ok((lat, lon))
            }
            _ => Err(GeolocationError::PositionUnavailable),
        }
    }
}

fn classify_transport(err: reqwest::Error) -> GeolocationError {
    if err.is_timeout() {
        GeolocationError::Timeout
    } else if err.is_connect() {
        GeolocationError::PositionUnavailable
    } else {
        GeolocationError::Unknown(err.to_string())
    }
}

/// Stand-in used when positioning is disabled or absent on this system.
#[derive(Debug, Default)]
pub struct UnsupportedGeolocator;

#[async_trait]
impl Geolocator for UnsupportedGeolocator {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<(f64, f64), GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn accepts_plain_and_compound_names() {
        for input in ["Paris", "New York", "Stratford-upon-Avon", "Leeds, UK"] {
            let parsed = parse_city(input).expect("valid city name");
            assert_eq!(parsed, Location::City { name: input.to_string() });
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            parse_city("  London  "),
            Ok(Location::City { name: "London".to_string() })
        );
    }

    #[test]
    fn rejects_empty_and_whitespace_input() {
        assert_eq!(parse_city(""), Err(ValidationError::EmptyInput));
        assert_eq!(parse_city("   "), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn rejects_digits_and_symbols() {
        for input in ["London1", "90210", "Par!s", "Rio_de_Janeiro", "São Paulo"] {
            assert_eq!(parse_city(input), Err(ValidationError::InvalidCityName), "{input}");
        }
    }

    fn fix_body(lat: f64, lon: f64) -> serde_json::Value {
        serde_json::json!({ "status": "success", "lat": lat, "lon": lon })
    }

    #[tokio::test]
    async fn ip_lookup_returns_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fix_body(51.5, -0.12)))
            .mount(&server)
            .await;

        let geo = IpGeolocator::with_endpoint(server.uri());
        let fix = geo
            .current_position(&GeolocationOptions::default())
            .await
            .expect("position");
        assert_eq!(fix, (51.5, -0.12));
    }

    #[tokio::test]
    async fn fresh_fix_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fix_body(48.85, 2.35)))
            .expect(1)
            .mount(&server)
            .await;

        let geo = IpGeolocator::with_endpoint(server.uri());
        let options = GeolocationOptions::default();
        let first = geo.current_position(&options).await.expect("position");
        let second = geo.current_position(&options).await.expect("position");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn provider_fail_status_is_position_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail",
                "message": "private range",
            })))
            .mount(&server)
            .await;

        let geo = IpGeolocator::with_endpoint(server.uri());
        let err = geo
            .current_position(&GeolocationOptions::default())
            .await
            .expect_err("should fail");
        assert_eq!(err, GeolocationError::PositionUnavailable);
    }

    #[tokio::test]
    async fn unsupported_backend_reports_unsupported() {
        let geo = UnsupportedGeolocator;
        assert!(!geo.is_available());
        let err = geo
            .current_position(&GeolocationOptions::default())
            .await
            .expect_err("should fail");
        assert_eq!(err, GeolocationError::Unsupported);
    }
}
