//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location resolution (free-text validation and geolocation)
//! - Weather retrieval against the OpenWeather HTTP API
//! - The persisted recent-cities list
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod recents;

pub use config::Config;
pub use error::{ConfigError, GeolocationError, LookupError, RetrievalError, ValidationError};
pub use location::{GeolocationOptions, Geolocator, IpGeolocator, UnsupportedGeolocator, parse_city};
pub use model::{CurrentReading, ForecastEntry, Location, TemperatureUnit, WeatherSnapshot};
pub use provider::{WeatherService, daily_overview};
pub use recents::RecentCities;
