//! Ledger settings loaded from config.toml
//!
//! The file is optional. Every field has a default, so an absent file or an
//! absent section simply yields the defaults. Owners listed under
//! `[[owners]]` are registered on startup if they do not exist yet.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Database URL; `DATABASE_URL` in the environment takes precedence
    pub database_url: Option<String>,
    /// Thresholds used by the daily checks and insights
    pub ledger: LedgerSettings,
    /// Owners to register on startup
    pub owners: Vec<OwnerSeed>,
}

/// Tunable thresholds for reminders, alerts and insights.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LedgerSettings {
    /// Budgets below this amount trigger a low-budget alert
    pub low_budget_threshold: f64,
    /// A bill due in exactly this many days gets a reminder
    pub reminder_lead_days: i64,
    /// Share of the budget spent this month that counts as nearly exhausted
    pub budget_alert_ratio: f64,
    /// Share of the budget spent on sport this month that counts as high
    pub sport_alert_ratio: f64,
    /// Number of entries returned by the recent spending listing
    pub recent_spending_limit: u64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            low_budget_threshold: 200.0,
            reminder_lead_days: 2,
            budget_alert_ratio: 0.9,
            sport_alert_ratio: 0.3,
            recent_spending_limit: 10,
        }
    }
}

/// An owner to register on startup
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct OwnerSeed {
    /// Identity key
    pub email: String,
    /// Name shown to the user
    pub display_name: String,
}

impl Config {
    /// Picks the database URL: the given environment value, then the file, then the default.
    #[must_use]
    pub fn database_url_with(&self, env_value: Option<String>) -> String {
        env_value
            .or_else(|| self.database_url.clone())
            .unwrap_or_else(|| super::database::DEFAULT_DATABASE_URL.to_string())
    }

    /// Picks the database URL, honouring `DATABASE_URL` from the environment.
    #[must_use]
    pub fn database_url(&self) -> String {
        self.database_url_with(std::env::var("DATABASE_URL").ok())
    }
}

/// Parses a configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from the default location (./config.toml), falling back
/// to defaults when the file does not exist.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_config(path)
    } else {
        info!("No config.toml found, using default ledger settings");
        Ok(Config::default())
    }
}
