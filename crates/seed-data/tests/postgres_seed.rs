//! Seeding against a real PostgreSQL schema.
//!
//! To run these tests, you need:
//! 1. A PostgreSQL database with the dating schema applied
//! 2. DATABASE_URL environment variable set
//!
//! Run with: `DATABASE_URL=postgres://... cargo nextest run -p seed-data postgres`
//!
//! The run is never committed, so the database is left as it was.

use std::env;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use seed_data::builders::ScenarioBuilder;
use seed_data::db::PgGateway;
use seed_data::reference::ReferenceData;
use sqlx::{PgPool, postgres::PgPoolOptions};

/// Get database pool, skipping tests if DATABASE_URL is not set or the
/// schema is missing.
async fn get_test_pool() -> Option<PgPool> {
    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test: Failed to connect to database: {e}");
            return None;
        }
    };

    let has_schema: bool = sqlx::query_scalar("SELECT to_regclass('user_details') IS NOT NULL")
        .fetch_one(&pool)
        .await
        .unwrap_or(false);
    if !has_schema {
        eprintln!("Skipping test: dating schema not applied");
        return None;
    }

    Some(pool)
}

#[tokio::test]
async fn test_seed_small_dataset_and_roll_back() {
    let Some(pool) = get_test_pool().await else {
        return;
    };

    let reference = ReferenceData::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
        .expect("Failed to load reference data");
    let mut rng = StdRng::seed_from_u64(2024);
    let mut gateway = PgGateway::begin(&pool)
        .await
        .expect("Failed to open transaction");

    let result = ScenarioBuilder::new()
        .with_reference(reference)
        .with_users(25)
        .with_admins(2)
        .with_truncate(true)
        .build(&mut gateway, &mut rng)
        .await
        .expect("Failed to seed");

    assert_eq!(result.context.users.len(), 25);
    assert_eq!(result.context.admins.len(), 2);

    // Dropping the gateway rolls the transaction back.
    drop(gateway);
}
