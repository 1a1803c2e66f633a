//! Session orchestration: wires user actions to location resolution, the
//! retrieval service and the recent-cities store, and hands results to
//! the presenter.

use std::time::Duration;

use skycast_core::{
    GeolocationError, GeolocationOptions, Geolocator, Location, LookupError, RecentCities,
    TemperatureUnit, WeatherService, WeatherSnapshot, parse_city,
};

use crate::render::Presenter;

/// City looked up when first-load geolocation fails.
const DEFAULT_CITY: &str = "London";

/// Delay before the automatic lookup on startup.
const STARTUP_DELAY: Duration = Duration::from_millis(500);

/// Delay before falling back to the default city on first load.
const FALLBACK_DELAY: Duration = Duration::from_millis(1000);

/// Where the session is in its lookup cycle. A completed cycle rests in
/// `Displaying` or `ErrorShown` until acknowledged or superseded by the
/// next trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Displaying,
    ErrorShown,
}

/// One user session. Owns the display unit, the last snapshot and the
/// first-load flag; lookups run to completion one at a time, so the last
/// completed lookup is always the one on screen.
pub struct Session<P: Presenter> {
    service: WeatherService,
    geolocator: Box<dyn Geolocator>,
    store: RecentCities,
    presenter: P,
    unit: TemperatureUnit,
    snapshot: Option<WeatherSnapshot>,
    first_load: bool,
    state: SessionState,
    startup_delay: Duration,
    fallback_delay: Duration,
}

impl<P: Presenter> Session<P> {
    pub fn new(
        service: WeatherService,
        geolocator: Box<dyn Geolocator>,
        store: RecentCities,
        presenter: P,
    ) -> Self {
        Self {
            service,
            geolocator,
            store,
            presenter,
            unit: TemperatureUnit::default(),
            snapshot: None,
            first_load: true,
            state: SessionState::Idle,
            startup_delay: STARTUP_DELAY,
            fallback_delay: FALLBACK_DELAY,
        }
    }

    pub fn with_unit(mut self, unit: TemperatureUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Override the startup and fallback delays.
    #[cfg(test)]
    fn with_delays(mut self, startup: Duration, fallback: Duration) -> Self {
        self.startup_delay = startup;
        self.fallback_delay = fallback;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn recent_cities(&self) -> Vec<String> {
        self.store.load()
    }

    /// Return to `Idle` after the user has seen the result or error.
    pub fn acknowledge(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Page-ready trigger: a deferred automatic geolocation lookup. On the
    /// first load a geolocation failure is not surfaced; after a further
    /// delay the default city is looked up instead.
    pub async fn startup(&mut self) {
        tokio::time::sleep(self.startup_delay).await;

        let first = self.first_load;
        self.first_load = false;

        match self.resolve_position().await {
            Ok(location) => {
                let _ = self.run_lookup(location).await;
            }
            Err(err) if first => {
                tracing::info!(error = %err, "first-load geolocation failed, falling back to {DEFAULT_CITY}");
                tokio::time::sleep(self.fallback_delay).await;
                let _ = self
                    .run_lookup(Location::City { name: DEFAULT_CITY.to_string() })
                    .await;
            }
            Err(err) => {
                self.fail(err.into());
            }
        }
    }

    /// Search submission. Validation happens before any network traffic.
    pub async fn search(&mut self, input: &str) -> Result<(), LookupError> {
        self.first_load = false;
        let location = match parse_city(input) {
            Ok(location) => location,
            Err(err) => return Err(self.fail(err.into())),
        };
        self.run_lookup(location).await
    }

    /// Look up a city picked from the recents list. Stored names are
    /// provider-resolved and may contain characters the free-text
    /// alphabet rejects, so they bypass [`parse_city`].
    pub async fn search_recent(&mut self, name: &str) -> Result<(), LookupError> {
        self.first_load = false;
        self.run_lookup(Location::City { name: name.to_string() }).await
    }

    /// Explicit "use my location" action; failures are surfaced, never
    /// recovered with the default city.
    pub async fn locate(&mut self) -> Result<(), LookupError> {
        self.first_load = false;
        match self.resolve_position().await {
            Ok(location) => self.run_lookup(location).await,
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Flip the display unit and re-present the held snapshot. No network
    /// call, and a session with nothing displayed just flips the unit.
    pub fn toggle_unit(&mut self) {
        self.unit = self.unit.toggled();
        if let Some(snapshot) = &self.snapshot {
            self.presenter
                .show_weather(snapshot, self.unit, &self.store.load());
            self.state = SessionState::Displaying;
        }
    }

    async fn resolve_position(&self) -> Result<Location, GeolocationError> {
        if !self.geolocator.is_available() {
            return Err(GeolocationError::Unsupported);
        }

        let (lat, lon) = self
            .geolocator
            .current_position(&GeolocationOptions::default())
            .await?;
        Ok(Location::Coordinates { lat, lon })
    }

    async fn run_lookup(&mut self, location: Location) -> Result<(), LookupError> {
        self.state = SessionState::Loading;
        tracing::debug!(%location, "fetching weather");

        match self.service.fetch_weather(&location).await {
            Ok(snapshot) => {
                let recents = self.record_recent(&snapshot);
                self.presenter.show_weather(&snapshot, self.unit, &recents);
                self.snapshot = Some(snapshot);
                self.state = SessionState::Displaying;
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// The provider-resolved place name is authoritative for recents, for
    /// coordinate lookups too. Persist failures only cost the history, so
    /// they are logged rather than failing the lookup.
    fn record_recent(&self, snapshot: &WeatherSnapshot) -> Vec<String> {
        if snapshot.current.place.is_empty() {
            return self.store.load();
        }

        match self.store.add(&snapshot.current.place) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(error = %err, "failed to persist recent cities");
                self.store.load()
            }
        }
    }

    /// Present a failure and leave whatever was displayed before untouched.
    fn fail(&mut self, err: LookupError) -> LookupError {
        tracing::warn!(error = %err, tag = err.tag(), "lookup failed");
        self.presenter.show_error(&err, &err.user_message());
        self.state = SessionState::ErrorShown;
        err
    }
}
