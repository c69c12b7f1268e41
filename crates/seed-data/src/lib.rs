//! Synthetic data generation for the dating database.
//!
//! This crate fabricates accounts, profiles, subscriptions, administrators,
//! reports, bans, swipes, matches, blocks and conversations, and inserts them
//! in dependency order so every foreign key points at an existing row.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let config = SeedConfig::load(Some(Path::new("config.yml")))?;
//! let reference = ReferenceData::load(&config.data_dir)?;
//!
//! let mut gateway = PgGateway::begin(&pool).await?;
//! let result = ScenarioBuilder::new()
//!     .with_config(config)
//!     .with_reference(reference)
//!     .with_truncate(true)
//!     .build(&mut gateway, &mut rng)
//!     .await?;
//! gateway.commit().await?;
//! ```

pub mod builders;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod generators;
pub mod pipeline;
pub mod reference;
pub mod sampling;
pub mod temporal;

pub use dating::models::{ChatTheme, PaymentCycle};
pub use error::SeedError;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{ScenarioBuilder, ScenarioMetrics, ScenarioResult};
    pub use crate::config::SeedConfig;
    pub use crate::context::{Clock, SeedContext};
    pub use crate::db::{Gateway, MemoryGateway, PgGateway, Seeder};
    pub use crate::error::SeedError;
    pub use crate::generators::{
        AccountGenerator, AdminGenerator, ConversationGenerator, InteractionGenerator,
        ModerationGenerator, UserGenerator,
    };
    pub use crate::pipeline::Phase;
    pub use crate::reference::ReferenceData;
    pub use crate::{ChatTheme, PaymentCycle};
}
