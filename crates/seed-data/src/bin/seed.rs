//! Seeds the dating database.
//!
//! Run with:
//! ```
//! cargo run -p seed-data --bin seed -- --config crates/seed-data/config.yml
//! ```

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use seed_data::builders::{ScenarioBuilder, ScenarioResult};
use seed_data::config::SeedConfig;
use seed_data::db::{MemoryGateway, PgGateway};
use seed_data::reference::ReferenceData;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Fill the dating database with synthetic data")]
struct Args {
    /// YAML configuration file; missing files fall back to defaults.
    #[arg(long, default_value = "config.yml")]
    config: PathBuf,

    /// Directory with the reference CSV tables.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// RNG seed for a reproducible dataset.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of users to generate.
    #[arg(long)]
    users: Option<usize>,

    /// Generate into memory and print a summary instead of touching the database.
    #[arg(long)]
    dry_run: bool,

    /// Keep existing rows instead of truncating every table first.
    #[arg(long)]
    keep_existing: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = SeedConfig::load(Some(&args.config))?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(users) = args.users {
        config.users_number = users;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let reference = ReferenceData::load(&config.data_dir)?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let builder = ScenarioBuilder::new()
        .with_config(config.clone())
        .with_reference(reference)
        .with_truncate(!args.keep_existing)
        .with_metrics(true);

    if args.dry_run {
        let mut gateway = MemoryGateway::strict();
        let result = builder.build(&mut gateway, &mut rng).await?;
        tracing::info!("Dry run completed, {} statements", gateway.statements());
        if let Some(metrics) = &result.metrics {
            println!("{}", serde_json::to_string_pretty(metrics)?);
        }
        return Ok(());
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.connection_url())
        .await?;

    tracing::info!("Connected to database");

    let mut gateway = PgGateway::begin(&pool).await?;
    let result = builder.build(&mut gateway, &mut rng).await?;
    gateway.commit().await?;

    summarize(&result);
    Ok(())
}

fn summarize(result: &ScenarioResult) {
    let ctx = &result.context;
    tracing::info!("Seed completed!");
    tracing::info!("  Users: {}", ctx.users.len());
    tracing::info!("  Administrators: {}", ctx.admins.len());
    tracing::info!("  Reports: {}", ctx.reports.len());
    tracing::info!("  Bans: {}", ctx.bans.len());
    tracing::info!("  Swipes: {}", ctx.swipes.len());
    tracing::info!("  Matches: {}", ctx.matches.len());
    tracing::info!("  Blocks: {}", ctx.blocks.len());
    tracing::info!("  Conversations: {}", ctx.conversations.len());
    tracing::info!("  Messages: {}", ctx.message_count());
    if let Some(metrics) = &result.metrics {
        tracing::info!("  Took {} ms", metrics.total_time_ms);
    }
}
