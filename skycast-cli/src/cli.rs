use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::InquireError;
use skycast_core::{
    Config, Geolocator, IpGeolocator, LookupError, RecentCities, TemperatureUnit,
    UnsupportedGeolocator, WeatherService,
};

use crate::app::Session;
use crate::render::TerminalPresenter;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather lookup with recent-city history")]
pub struct Cli {
    /// Disable IP-based geolocation.
    #[arg(long, global = true)]
    pub no_geolocation: bool,

    /// Runs the interactive session when no subcommand is given.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather and forecast for a city.
    Show {
        /// City name (letters, spaces, commas and hyphens).
        city: String,

        /// Display temperatures in Fahrenheit.
        #[arg(long)]
        fahrenheit: bool,
    },

    /// Show weather for the device's current location.
    Here {
        /// Display temperatures in Fahrenheit.
        #[arg(long)]
        fahrenheit: bool,
    },

    /// List recently searched cities.
    Recents {
        /// Keep only entries containing this text.
        #[arg(long)]
        filter: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Some(Command::Configure) => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Some(Command::Show { city, fahrenheit }) => {
                let mut session = build_session(self.no_geolocation, fahrenheit)?;
                // The session already showed any user-facing message.
                Ok(lookup_exit(session.search(&city).await))
            }
            Some(Command::Here { fahrenheit }) => {
                let mut session = build_session(self.no_geolocation, fahrenheit)?;
                Ok(lookup_exit(session.locate().await))
            }
            Some(Command::Recents { filter }) => {
                recents(filter.as_deref())?;
                Ok(ExitCode::SUCCESS)
            }
            None => {
                interactive(self.no_geolocation).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Exit status for a one-shot lookup whose outcome was already presented.
fn lookup_exit(result: Result<(), LookupError>) -> ExitCode {
    ExitCode::from(lookup_status(&result))
}

fn lookup_status(result: &Result<(), LookupError>) -> u8 {
    if result.is_err() { 1 } else { 0 }
}

fn build_session(
    no_geolocation: bool,
    fahrenheit: bool,
) -> Result<Session<TerminalPresenter>> {
    let config = Config::load()?;
    let service = WeatherService::from_config(&config)?;

    let geolocator: Box<dyn Geolocator> = if no_geolocation {
        Box::new(UnsupportedGeolocator)
    } else {
        Box::new(IpGeolocator::new())
    };

    let unit = if fahrenheit {
        TemperatureUnit::Fahrenheit
    } else {
        TemperatureUnit::Celsius
    };

    Ok(Session::new(
        service,
        geolocator,
        RecentCities::open_default()?,
        TerminalPresenter::new(),
    )
    .with_unit(unit))
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Password::new("OpenWeather API key:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.api_key = Some(key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn recents(filter: Option<&str>) -> Result<()> {
    let store = RecentCities::open_default()?;
    let cities = match filter {
        Some(query) => store.filter(query),
        None => store.load(),
    };

    if cities.is_empty() {
        println!("No recent cities yet.");
    } else {
        for city in cities {
            println!("{city}");
        }
    }

    Ok(())
}

const MENU: [&str; 5] = [
    "Search city",
    "Use my location",
    "Toggle °C/°F",
    "Recent cities",
    "Quit",
];

async fn interactive(no_geolocation: bool) -> Result<()> {
    let mut session = build_session(no_geolocation, false)?;
    session.startup().await;

    loop {
        tracing::debug!(state = ?session.state(), "returning to menu");
        session.acknowledge();

        let choice = match inquire::Select::new("What next?", MENU.to_vec()).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Menu prompt failed"),
        };

        // Lookup failures are already presented by the session; the loop
        // just continues to the next action.
        match choice {
            "Search city" => {
                let input = match inquire::Text::new("City name:").prompt() {
                    Ok(input) => input,
                    Err(InquireError::OperationCanceled) => continue,
                    Err(err) => return Err(err).context("City prompt failed"),
                };
                let _ = session.search(&input).await;
            }
            "Use my location" => {
                let _ = session.locate().await;
            }
            "Toggle °C/°F" => {
                session.toggle_unit();
                if session.snapshot().is_none() {
                    println!("Unit set to {}.", session.unit().symbol());
                }
            }
            "Recent cities" => {
                let cities = session.recent_cities();
                if cities.is_empty() {
                    println!("No recent cities yet.");
                    continue;
                }
                match inquire::Select::new("Search again:", cities).prompt() {
                    Ok(city) => {
                        let _ = session.search_recent(&city).await;
                    }
                    Err(InquireError::OperationCanceled) => {}
                    Err(err) => return Err(err).context("Recents prompt failed"),
                }
            }
            _ => break,
        }
    }

    Ok(())
}
