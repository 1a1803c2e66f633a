//! Terminal presentation of lookup results.

use chrono::Local;
use skycast_core::model::display_temp;
use skycast_core::{LookupError, TemperatureUnit, WeatherSnapshot, daily_overview};

/// Where lookup results and errors end up. The session talks to this
/// instead of printing directly, so tests can capture what would be shown.
pub trait Presenter {
    fn show_weather(
        &mut self,
        snapshot: &WeatherSnapshot,
        unit: TemperatureUnit,
        recents: &[String],
    );

    fn show_error(&mut self, error: &LookupError, message: &str);
}

#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Presenter for TerminalPresenter {
    fn show_weather(
        &mut self,
        snapshot: &WeatherSnapshot,
        unit: TemperatureUnit,
        recents: &[String],
    ) {
        let current = &snapshot.current;

        println!();
        println!("{}", snapshot.display_name());
        println!(
            "  {}  {}",
            format_temp(current.temperature_c, unit),
            current.description
        );
        println!(
            "  feels like {}  humidity {}%  wind {:.1} m/s  pressure {} hPa",
            format_temp(current.feels_like_c, unit),
            current.humidity_pct,
            current.wind_speed_mps,
            current.pressure_hpa
        );

        let days = daily_overview(&snapshot.forecast);
        if !days.is_empty() {
            println!();
            println!("Forecast:");
            for entry in days {
                println!(
                    "  {}  {:>6}  {}",
                    entry.timestamp.with_timezone(&Local).format("%a %d %b"),
                    format_temp(entry.temperature_c, unit),
                    entry.description
                );
            }
        }

        if !recents.is_empty() {
            println!();
            println!("Recent: {}", recents.join(", "));
        }
    }

    fn show_error(&mut self, _error: &LookupError, message: &str) {
        eprintln!("{message}");
    }
}

fn format_temp(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{:.0}{}", display_temp(celsius, unit), unit.symbol())
}
