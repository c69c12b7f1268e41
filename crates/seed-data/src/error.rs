//! Error type shared by every phase of a seeding run.
//!
//! Every variant is fatal: a run either completes and commits, or aborts and
//! leaves the database untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Cannot sample from empty population: {0}")]
    EmptyPopulation(&'static str),

    #[error("Unique {pool} pool exhausted after {attempts} attempts")]
    ExhaustedUniquePool { pool: &'static str, attempts: usize },

    #[error("Constraint unsatisfiable: {0}")]
    ConstraintUnsatisfiable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] dating::auth::AuthError),

    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    #[error("Insert into {0} returned no id")]
    MissingId(&'static str),
}
