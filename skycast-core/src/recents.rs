//! Bounded, deduplicated list of recently searched cities, persisted as
//! JSON in the platform data directory.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::config;

/// Maximum number of cities kept.
pub const MAX_RECENTS: usize = 5;

#[derive(Debug, Clone)]
pub struct RecentCities {
    path: PathBuf,
}

impl RecentCities {
    /// Store backed by `recent_cities.json` in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self {
            path: config::data_dir()?.join("recent_cities.json"),
        })
    }

    /// Store backed by an explicit file.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// The persisted list, most recent first. A missing file or malformed
    /// contents read as empty rather than an error.
    pub fn load(&self) -> Vec<String> {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };

        serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(error = %err, path = %self.path.display(), "discarding malformed recents file");
            Vec::new()
        })
    }

    /// Record a successful lookup: drop any entry equal to `city` under
    /// case-insensitive comparison, insert at the front, keep at most
    /// [`MAX_RECENTS`], persist. Returns the resulting list.
    pub fn add(&self, city: &str) -> Result<Vec<String>> {
        let mut cities = self.load();
        cities.retain(|c| !c.eq_ignore_ascii_case(city));
        cities.insert(0, city.to_string());
        cities.truncate(MAX_RECENTS);
        self.persist(&cities)?;
        Ok(cities)
    }

    /// Case-insensitive substring match over the persisted list, order
    /// preserved.
    pub fn filter(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        self.load()
            .into_iter()
            .filter(|c| c.to_lowercase().contains(&needle))
            .collect()
    }

    fn persist(&self, cities: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(cities).context("Failed to serialize recent cities")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write recents file: {}", self.path.display()))?;

        Ok(())
    }
}
