//! Weather retrieval against the OpenWeather HTTP API.
//!
//! One lookup is two sequential calls, current conditions then forecast,
//! and is all-or-nothing: a failure anywhere discards whatever was
//! already fetched.

use chrono::{DateTime, Local, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{ConfigError, RetrievalError};
use crate::model::{CurrentReading, ForecastEntry, Location, WeatherSnapshot};

/// Upper bound on calendar days shown from the sub-daily forecast list.
pub const FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone)]
pub struct WeatherService {
    http: Client,
    api_key: String,
    base_url: String,
}

impl WeatherService {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.require_api_key()?, config.base_url.clone()))
    }

    /// Current conditions plus the raw forecast list for one location.
    ///
    /// The forecast request is only issued after the current-conditions
    /// request succeeds; its failure aborts the whole lookup.
    pub async fn fetch_weather(
        &self,
        location: &Location,
    ) -> Result<WeatherSnapshot, RetrievalError> {
        let current = self.fetch_current(location).await?;
        let forecast = self.fetch_forecast(location).await?;

        Ok(WeatherSnapshot {
            location: location.clone(),
            current,
            forecast,
        })
    }

    async fn fetch_current(&self, location: &Location) -> Result<CurrentReading, RetrievalError> {
        let url = format!("{}/weather", self.base_url);
        let res = self.request(&url, location).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let parsed: OwCurrent = res
            .json()
            .await
            .map_err(|e| RetrievalError::Parse(e.to_string()))?;

        Ok(parsed.into_reading())
    }

    async fn fetch_forecast(
        &self,
        location: &Location,
    ) -> Result<Vec<ForecastEntry>, RetrievalError> {
        let url = format!("{}/forecast", self.base_url);
        let res = self
            .request(&url, location)
            .send()
            .await
            .map_err(|e| RetrievalError::ForecastUnavailable(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(RetrievalError::ForecastUnavailable(format!(
                "status {status}"
            )));
        }

        let parsed: OwForecast = res
            .json()
            .await
            .map_err(|e| RetrievalError::ForecastUnavailable(e.to_string()))?;

        Ok(parsed.list.into_iter().map(OwSlot::into_entry).collect())
    }

    fn request(&self, url: &str, location: &Location) -> reqwest::RequestBuilder {
        let req = self
            .http
            .get(url)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")]);

        match location {
            Location::City { name } => req.query(&[("q", name.as_str())]),
            Location::Coordinates { lat, lon } => {
                req.query(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            }
        }
    }
}

fn classify_status(status: StatusCode) -> RetrievalError {
    match status {
        StatusCode::NOT_FOUND => RetrievalError::LocationNotFound,
        StatusCode::UNAUTHORIZED => RetrievalError::InvalidCredentials,
        other => RetrievalError::ServiceUnavailable(format!("status {other}")),
    }
}

/// Reduce sub-daily forecast slots to one entry per local calendar day.
///
/// Keeps the first slot seen for each distinct date, in provider order,
/// stopping after [`FORECAST_DAYS`] days. The selection is deliberately
/// order-dependent, not an average or a fixed time-of-day pick.
pub fn daily_overview(entries: &[ForecastEntry]) -> Vec<ForecastEntry> {
    let mut seen: Vec<NaiveDate> = Vec::new();
    let mut days = Vec::new();

    for entry in entries {
        let date = entry.timestamp.with_timezone(&Local).date_naive();
        if seen.contains(&date) {
            continue;
        }
        seen.push(date);
        days.push(entry.clone());
        if days.len() == FORECAST_DAYS {
            break;
        }
    }

    days
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: u8,
    #[serde(default)]
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize, Default)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    sys: Option<OwSys>,
}

impl OwCurrent {
    fn into_reading(self) -> CurrentReading {
        let (condition, description) = first_condition(self.weather);

        CurrentReading {
            place: self.name,
            country: self.sys.and_then(|s| s.country).unwrap_or_default(),
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind_speed_mps: self.wind.speed,
            condition,
            description,
            observation_time: unix_to_utc(self.dt).unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwSlot {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

impl OwSlot {
    fn into_entry(self) -> ForecastEntry {
        let (condition, description) = first_condition(self.weather);

        ForecastEntry {
            timestamp: unix_to_utc(self.dt).unwrap_or_else(Utc::now),
            temperature_c: self.main.temp,
            humidity_pct: self.main.humidity,
            condition,
            description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecast {
    list: Vec<OwSlot>,
}

fn first_condition(weather: Vec<OwWeather>) -> (String, String) {
    weather
        .into_iter()
        .next()
        .map(|w| (w.main, w.description))
        .unwrap_or_else(|| ("Unknown".to_string(), "unknown".to_string()))
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
