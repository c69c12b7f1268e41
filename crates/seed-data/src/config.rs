//! Configuration types for dataset generation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SeedError;

/// Run parameters, loaded once at startup.
///
/// Ratios are percentages in `0..=100`; lengths and differences are days.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    // Connection
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub database_name: String,
    /// Full connection string; wins over the individual fields when set.
    pub database_url: Option<String>,

    /// Directory holding the reference CSV tables.
    pub data_dir: PathBuf,
    /// RNG seed for reproducible runs.
    pub seed: Option<u64>,

    // Users
    pub users_number: usize,
    pub enable_locale: bool,
    pub migration_ratio: f64,
    pub domestic_migration_ratio: f64,
    pub international_migration_ratio: f64,
    pub oldest_current_photo: i64,
    pub oldest_unverified_photo: i64,
    pub subscription_ratio: f64,
    pub auto_renewal_ratio: f64,

    // Administrators
    pub admins_number: usize,
    pub max_admin_hiring_difference: i64,

    // Moderation
    pub user_report_ratio: f64,
    pub report_ban_ratio: f64,
    pub max_report_ban_difference: i64,
    pub min_ban_length: i64,
    pub max_ban_length: i64,

    // Interactions
    pub max_user_swipes: usize,
    pub right_swipe_ratio: f64,
    pub max_match_length: i64,
    pub match_block_ratio: f64,
    pub max_match_block_difference: i64,
    pub user_block_ratio: f64,
    pub min_block_length: i64,
    pub max_block_length: i64,

    // Conversations
    pub max_conversation_length: usize,
    pub reply_ratio: f64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: "postgres".to_string(),
            password: None,
            database_name: "dating".to_string(),
            database_url: None,
            data_dir: PathBuf::from("data"),
            seed: None,
            users_number: 1000,
            enable_locale: true,
            migration_ratio: 90.0,
            domestic_migration_ratio: 10.0,
            international_migration_ratio: 2.0,
            oldest_current_photo: 365,
            oldest_unverified_photo: 30,
            subscription_ratio: 20.0,
            auto_renewal_ratio: 60.0,
            admins_number: 10,
            max_admin_hiring_difference: 365,
            user_report_ratio: 5.0,
            report_ban_ratio: 40.0,
            max_report_ban_difference: 7,
            min_ban_length: 1,
            max_ban_length: 90,
            max_user_swipes: 50,
            right_swipe_ratio: 50.0,
            max_match_length: 365,
            match_block_ratio: 5.0,
            max_match_block_difference: 30,
            user_block_ratio: 1.0,
            min_block_length: 1,
            max_block_length: 365,
            max_conversation_length: 40,
            reply_ratio: 15.0,
        }
    }
}

impl SeedConfig {
    /// Loads configuration from an optional file, then `SEED_*` environment
    /// variables, then the `DB_*` / `DATABASE_URL` connection overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, SeedError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("SEED").try_parsing(true))
            .build()?;

        let mut config: SeedConfig = settings.try_deserialize()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies connection overrides from the environment.
    ///
    /// Takes a lookup function so tests don't have to touch process state.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("DB_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("DB_PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(user) = lookup("DB_USER") {
            self.username = user;
        }
        if let Some(pass) = lookup("DB_PASS") {
            self.password = Some(pass);
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database_name = name;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
    }

    /// Connection string for the target database.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }
        match &self.password {
            Some(password) => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.username, password, self.host, self.port, self.database_name
            ),
            None => format!(
                "postgres://{}@{}:{}/{}",
                self.username, self.host, self.port, self.database_name
            ),
        }
    }

    /// Rejects ratios outside `0..=100` and inverted ranges.
    pub fn validate(&self) -> Result<(), SeedError> {
        let ratios = [
            ("migration_ratio", self.migration_ratio),
            ("domestic_migration_ratio", self.domestic_migration_ratio),
            (
                "international_migration_ratio",
                self.international_migration_ratio,
            ),
            ("subscription_ratio", self.subscription_ratio),
            ("auto_renewal_ratio", self.auto_renewal_ratio),
            ("user_report_ratio", self.user_report_ratio),
            ("report_ban_ratio", self.report_ban_ratio),
            ("right_swipe_ratio", self.right_swipe_ratio),
            ("match_block_ratio", self.match_block_ratio),
            ("user_block_ratio", self.user_block_ratio),
            ("reply_ratio", self.reply_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=100.0).contains(&value) {
                return Err(SeedError::InvalidConfig(format!(
                    "{name} must be within 0..=100, got {value}"
                )));
            }
        }

        let ranges = [
            ("ban length", self.min_ban_length, self.max_ban_length),
            ("block length", self.min_block_length, self.max_block_length),
        ];
        for (name, min, max) in ranges {
            if min < 0 || min > max {
                return Err(SeedError::InvalidConfig(format!(
                    "{name} range is invalid: {min}..={max}"
                )));
            }
        }

        let non_negative = [
            ("oldest_current_photo", self.oldest_current_photo),
            ("oldest_unverified_photo", self.oldest_unverified_photo),
            (
                "max_admin_hiring_difference",
                self.max_admin_hiring_difference,
            ),
            ("max_report_ban_difference", self.max_report_ban_difference),
            ("max_match_length", self.max_match_length),
            (
                "max_match_block_difference",
                self.max_match_block_difference,
            ),
        ];
        for (name, value) in non_negative {
            if value < 0 {
                return Err(SeedError::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        Ok(())
    }
}
