//! Configuration loading for a simulation run.
//!
//! A scenario is a TOML document with a `[simulation]` section, a `[world]`
//! section and any number of `[[venues]]` tables. Every field has a default,
//! so an empty document is a valid scenario with no venues.

use serde::{Deserialize, Serialize};
use std::path::Path;
use venue_state::DividendPolicy;

use crate::catalog::{city, concept, venue_type};
use crate::error::ConfigError;
use crate::repair::repair_constants::TAX_RATE_MAX;
use crate::setup::VenueRequest;

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed, length and output of the run
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Starting position of the group
    #[serde(default)]
    pub world: WorldConfig,
    /// Venues acquired before the first week, in order
    #[serde(default)]
    pub venues: Vec<VenueRequest>,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::TomlError)
    }

    /// Serializes the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSerializeError)
    }

    /// Checks catalog ids and numeric ranges before a world is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.weeks == 0 {
            return Err(ConfigError::Invalid("simulation.weeks must be at least 1".into()));
        }
        if self.simulation.report_path.trim().is_empty() {
            return Err(ConfigError::Invalid("simulation.report_path is empty".into()));
        }

        let w = &self.world;
        if city(&w.home_city).is_none() {
            return Err(ConfigError::Invalid(format!("unknown city '{}'", w.home_city)));
        }
        if !w.starting_cash.is_finite() || w.starting_cash < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "world.starting_cash must be non-negative, got {}",
                w.starting_cash
            )));
        }
        if !(0.0..=TAX_RATE_MAX).contains(&w.tax_rate) {
            return Err(ConfigError::Invalid(format!(
                "world.tax_rate must be within 0..={}, got {}",
                TAX_RATE_MAX, w.tax_rate
            )));
        }
        for (name, value) in [
            ("world.reputation", w.reputation),
            ("world.owner_dependence", w.owner_dependence),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within 0..=100, got {value}"
                )));
            }
        }

        for (i, v) in self.venues.iter().enumerate() {
            if venue_type(&v.type_id).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "venues[{i}]: unknown venue type '{}'",
                    v.type_id
                )));
            }
            if concept(&v.concept_id).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "venues[{i}]: unknown concept '{}'",
                    v.concept_id
                )));
            }
            if !(0.0..=100.0).contains(&v.foot_traffic) {
                return Err(ConfigError::Invalid(format!(
                    "venues[{i}]: foot_traffic must be within 0..=100, got {}",
                    v.foot_traffic
                )));
            }
            if let Some(b) = &v.inherited {
                if !b.asking_price.is_finite() || b.asking_price < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "venues[{i}]: asking_price must be non-negative"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every random draw in the run
    pub seed: u64,
    /// Weeks to simulate
    pub weeks: u32,
    /// JSON Lines file receiving one report per week
    pub report_path: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            weeks: 52,
            report_path: "weekly_reports.jsonl".to_string(),
        }
    }
}

/// Starting position of the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub home_city: String,
    pub starting_cash: f64,
    pub tax_rate: f64,
    pub reputation: f64,
    pub owner_dependence: f64,
    pub dividend_policy: DividendPolicy,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            home_city: "perth".to_string(),
            starting_cash: 250_000.0,
            tax_rate: 0.25,
            reputation: 50.0,
            owner_dependence: 70.0,
            dividend_policy: DividendPolicy::Reinvest,
        }
    }
}

/// The default scenario as TOML, with one fresh bistro.
pub fn default_config_toml() -> Result<String, ConfigError> {
    let config = SimConfig {
        venues: vec![VenueRequest::default()],
        ..Default::default()
    };
    config.to_toml()
}
