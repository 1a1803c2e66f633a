use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resolved place to look up weather for: either a free-text city name
/// (validated by [`crate::location::parse_city`]) or a coordinate pair
/// from geolocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City { name: String },
    Coordinates { lat: f64, lon: f64 },
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::City { name } => f.write_str(name),
            Location::Coordinates { lat, lon } => write!(f, "{lat:.4},{lon:.4}"),
        }
    }
}

/// Display unit for temperatures. Celsius is canonical everywhere in the
/// data model; Fahrenheit exists only at presentation time and the
/// preference resets each session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// A stored Celsius value in the requested display unit.
pub fn display_temp(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => to_fahrenheit(celsius),
    }
}

/// Current conditions as reported by the provider. `place` and `country`
/// are the provider's resolved names and supersede whatever the caller
/// searched for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentReading {
    pub place: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: f64,
    pub condition: String,
    pub description: String,
    pub observation_time: DateTime<Utc>,
}

/// One sub-daily forecast slot, kept in provider order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub condition: String,
    pub description: String,
}

/// Combined current + forecast result for one location at one point in time.
#[derive(Debug, Clone)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: CurrentReading,
    pub forecast: Vec<ForecastEntry>,
}

impl WeatherSnapshot {
    /// "Paris, FR" style heading, omitting an absent country code.
    pub fn display_name(&self) -> String {
        if self.current.country.is_empty() {
            self.current.place.clone()
        } else {
            format!("{}, {}", self.current.place, self.current.country)
        }
    }
}
