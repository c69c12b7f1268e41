//! Fluent builder for complete seeding runs.

use std::collections::HashMap;
use std::time::Instant;

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::config::SeedConfig;
use crate::context::{
    AdminRecord, Clock, ConversationRecord, MatchRecord, MessageRecord, ReportRecord,
    SeedContext, UserRecord,
};
use crate::db::{Gateway, RowId, Seeder};
use crate::error::SeedError;
use crate::generators::{
    AccountGenConfig, AccountGenerator, AdminGenConfig, AdminGenerator, CityGenerator,
    ConversationGenConfig, ConversationGenerator, InteractionGenConfig, InteractionGenerator,
    ModerationGenConfig, ModerationGenerator, SubscriptionGenConfig, UserGenConfig, UserGenerator,
};
use crate::pipeline::Phase;
use crate::reference::ReferenceData;

const PROGRESS_INTERVAL: usize = 100;

/// Result of building and seeding a scenario.
#[derive(Debug)]
pub struct ScenarioResult {
    pub context: SeedContext,
    /// Populated if metrics tracking is enabled.
    pub metrics: Option<ScenarioMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseTiming {
    pub phase: String,
    pub elapsed_ms: u64,
}

/// Timing and row counts of a run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioMetrics {
    pub total_time_ms: u64,
    pub phases: Vec<PhaseTiming>,
    pub user_count: usize,
    pub subscription_count: usize,
    pub admin_count: usize,
    pub report_count: usize,
    pub ban_count: usize,
    pub swipe_count: usize,
    pub match_count: usize,
    pub block_count: usize,
    pub conversation_count: usize,
    pub message_count: usize,
}

impl ScenarioMetrics {
    fn collect(context: &SeedContext, phases: Vec<PhaseTiming>, total_time_ms: u64) -> Self {
        Self {
            total_time_ms,
            phases,
            user_count: context.users.len(),
            subscription_count: context
                .users
                .iter()
                .filter(|u| u.subscription_id.is_some())
                .count(),
            admin_count: context.admins.len(),
            report_count: context.reports.len(),
            ban_count: context.bans.len(),
            swipe_count: context.swipes.len(),
            match_count: context.matches.len(),
            block_count: context.blocks.len(),
            conversation_count: context.conversations.len(),
            message_count: context.message_count(),
        }
    }
}

/// Builder for complete seeding runs.
///
/// # Example
///
/// ```rust,ignore
/// let mut gateway = PgGateway::begin(&pool).await?;
/// let result = ScenarioBuilder::new()
///     .with_reference(ReferenceData::load(Path::new("data"))?)
///     .with_users(500)
///     .with_truncate(true)
///     .build(&mut gateway, &mut rng)
///     .await?;
/// gateway.commit().await?;
/// ```
pub struct ScenarioBuilder {
    config: SeedConfig,
    reference: ReferenceData,
    account_config: AccountGenConfig,
    clock: Option<Clock>,
    truncate: bool,
    track_metrics: bool,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioBuilder {
    /// Creates a builder with default settings and no reference data.
    pub fn new() -> Self {
        Self {
            config: SeedConfig::default(),
            reference: ReferenceData::default(),
            account_config: AccountGenConfig::default(),
            clock: None,
            truncate: false,
            track_metrics: false,
        }
    }

    /// Replaces every generation parameter.
    pub fn with_config(mut self, config: SeedConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_reference(mut self, reference: ReferenceData) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_users(mut self, count: usize) -> Self {
        self.config.users_number = count;
        self
    }

    pub fn with_admins(mut self, count: usize) -> Self {
        self.config.admins_number = count;
        self
    }

    pub fn with_account_config(mut self, config: AccountGenConfig) -> Self {
        self.account_config = config;
        self
    }

    /// Pins "now" instead of reading the system clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Empties every table before seeding.
    pub fn with_truncate(mut self, enabled: bool) -> Self {
        self.truncate = enabled;
        self
    }

    /// Enables metrics tracking for performance analysis.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.track_metrics = enabled;
        self
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Runs every phase against `gateway`.
    ///
    /// Nothing is committed here; the caller decides what happens to the
    /// gateway's writes.
    pub async fn build<G: Gateway>(
        &self,
        gateway: &mut G,
        rng: &mut impl Rng,
    ) -> Result<ScenarioResult, SeedError> {
        self.config.validate()?;
        Phase::validate_order(&Phase::ORDER).map_err(SeedError::InvalidConfig)?;

        let start = Instant::now();
        let mut ctx = SeedContext::new(self.clock.unwrap_or_else(Clock::system));
        let mut seeder = Seeder::new(gateway);
        let mut accounts = AccountGenerator::with_config(self.account_config.clone());

        if self.truncate {
            seeder.clear_all().await?;
        }

        let mut phases = Vec::with_capacity(Phase::ORDER.len());
        for phase in Phase::ORDER {
            let phase_start = Instant::now();
            info!("Running phase: {}", phase);

            match phase {
                Phase::ReferenceData => self.seed_reference(&mut seeder, &mut ctx, rng).await?,
                Phase::Users => {
                    self.seed_users(&mut seeder, &mut ctx, &mut accounts, rng)
                        .await?
                }
                Phase::Admins => {
                    self.seed_admins(&mut seeder, &mut ctx, &mut accounts, rng)
                        .await?
                }
                Phase::Moderation => self.seed_moderation(&mut seeder, &mut ctx, rng).await?,
                Phase::Interactions => self.seed_interactions(&mut seeder, &mut ctx, rng).await?,
                Phase::Conversations => {
                    self.seed_conversations(&mut seeder, &mut ctx, rng)
                        .await?
                }
            }

            phases.push(PhaseTiming {
                phase: phase.to_string(),
                elapsed_ms: phase_start.elapsed().as_millis() as u64,
            });
        }

        let metrics = self.track_metrics.then(|| {
            ScenarioMetrics::collect(&ctx, phases, start.elapsed().as_millis() as u64)
        });

        Ok(ScenarioResult {
            context: ctx,
            metrics,
        })
    }

    async fn seed_reference<G: Gateway>(
        &self,
        seeder: &mut Seeder<'_, G>,
        ctx: &mut SeedContext,
        rng: &mut impl Rng,
    ) -> Result<(), SeedError> {
        let city_gen = CityGenerator::new();
        let cities: Vec<Vec<String>> = self
            .reference
            .countries
            .iter()
            .map(|country| city_gen.generate(country.population, rng))
            .collect();

        ctx.catalog = seeder.seed_catalog(&self.reference, &cities).await?;
        Ok(())
    }

    async fn seed_users<G: Gateway>(
        &self,
        seeder: &mut Seeder<'_, G>,
        ctx: &mut SeedContext,
        accounts: &mut AccountGenerator,
        rng: &mut impl Rng,
    ) -> Result<(), SeedError> {
        let total = self.config.users_number;
        let user_gen = UserGenerator::with_config(self.user_config());
        info!("Seeding {} users...", total);

        for i in 0..total {
            let account = accounts.generate(ctx.clock.now, rng)?;
            let account_id = seeder.seed_account(&account).await?;

            let profile = user_gen.generate(&ctx.catalog, account.created_at, &ctx.clock, rng)?;
            let seeded = seeder.seed_profile(account_id, &profile).await?;

            ctx.add_user(UserRecord {
                id: seeded.user_id,
                account_id,
                created_at: account.created_at,
                sex_id: profile.sex_id,
                city_id: profile.city_id,
                subscription_id: seeded.subscription_id,
            });

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!("  Seeded {}/{} users", i + 1, total);
            }
        }

        info!("Seeded {} users", total);
        Ok(())
    }

    async fn seed_admins<G: Gateway>(
        &self,
        seeder: &mut Seeder<'_, G>,
        ctx: &mut SeedContext,
        accounts: &mut AccountGenerator,
        rng: &mut impl Rng,
    ) -> Result<(), SeedError> {
        let total = self.config.admins_number;
        let admin_gen = AdminGenerator::with_config(AdminGenConfig {
            max_hiring_difference: self.config.max_admin_hiring_difference,
        });
        info!("Seeding {} administrators...", total);

        for _ in 0..total {
            let account = accounts.generate(ctx.clock.now, rng)?;
            let account_id = seeder.seed_account(&account).await?;

            let admin = admin_gen.generate(account.created_at, ctx.clock.today, rng);
            let id = seeder.seed_admin(account_id, &admin).await?;

            ctx.admins.push(AdminRecord {
                id,
                account_id,
                created_at: account.created_at,
                hiring_date: admin.hiring_date,
                reports_handled: 0,
            });
        }

        info!(
            "Seeded {} administrators ({} accounts in total)",
            total,
            accounts.issued()
        );
        Ok(())
    }

    async fn seed_moderation<G: Gateway>(
        &self,
        seeder: &mut Seeder<'_, G>,
        ctx: &mut SeedContext,
        rng: &mut impl Rng,
    ) -> Result<(), SeedError> {
        let moderation_gen = ModerationGenerator::with_config(ModerationGenConfig {
            user_report_ratio: self.config.user_report_ratio,
            report_ban_ratio: self.config.report_ban_ratio,
            max_report_ban_difference: self.config.max_report_ban_difference,
            min_ban_length: self.config.min_ban_length,
            max_ban_length: self.config.max_ban_length,
        });
        let total = moderation_gen.report_count(ctx.users.len());
        info!("Seeding {} reports...", total);

        let mut handled: HashMap<RowId, i64> = HashMap::new();
        for i in 0..total {
            let report = moderation_gen.generate(
                &ctx.users,
                &ctx.admins,
                &ctx.catalog.report_reasons,
                &ctx.clock,
                rng,
            )?;
            let seeded = seeder.seed_report(&report).await?;

            // A report counts as handled once it ended in a ban.
            if let Some(ban) = &report.ban {
                ctx.bans.record(report.reported_user_id, ban.window);
                *handled.entry(report.administrator_id).or_default() += 1;
            }

            ctx.reports.push(ReportRecord {
                id: seeded.report_id,
                reporting_user_id: report.reporting_user_id,
                reported_user_id: report.reported_user_id,
                administrator_id: report.administrator_id,
                report_date: report.report_date,
                ban_id: seeded.ban_id,
            });

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!("  Seeded {}/{} reports", i + 1, total);
            }
        }

        for admin in &mut ctx.admins {
            admin.reports_handled = handled.get(&admin.id).copied().unwrap_or(0);
        }
        let counts: Vec<(RowId, i64)> = ctx
            .admins
            .iter()
            .map(|a| (a.id, a.reports_handled))
            .collect();
        if !counts.is_empty() {
            seeder.seed_reports_handled(&counts).await?;
        }

        info!("Seeded {} reports and {} bans", total, ctx.bans.len());
        Ok(())
    }

    async fn seed_interactions<G: Gateway>(
        &self,
        seeder: &mut Seeder<'_, G>,
        ctx: &mut SeedContext,
        rng: &mut impl Rng,
    ) -> Result<(), SeedError> {
        let interaction_gen = InteractionGenerator::with_config(self.interaction_config());
        let total = ctx.users.len();
        info!("Seeding swipes for {} users...", total);

        for i in 0..total {
            let swiper = ctx.users[i].clone();
            let swipes = interaction_gen.generate_swipes(&swiper, &ctx.users, &ctx.swipes, rng);

            for swipe in swipes {
                seeder.seed_swipe(&swipe).await?;
                if !ctx.swipes.record(&swipe) {
                    continue;
                }

                let other = ctx.user(swipe.swiped_user_id).ok_or_else(|| {
                    SeedError::UnknownReference(format!("user {}", swipe.swiped_user_id))
                })?;
                let generated =
                    interaction_gen.generate_match(&swiper, other, &ctx.bans, &ctx.clock, rng)?;
                let id = seeder.seed_match(&generated).await?;

                if let Some(block) = &generated.block {
                    seeder.seed_block(block).await?;
                    ctx.blocks.record(block);
                }
                ctx.matches.push(MatchRecord {
                    id,
                    person1_id: generated.person1_id,
                    person2_id: generated.person2_id,
                    date_formed: generated.date_formed,
                    date_ended: generated.date_ended,
                });
            }

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!("  Swiped for {}/{} users", i + 1, total);
            }
        }
        info!(
            "Seeded {} swipes and {} matches",
            ctx.swipes.len(),
            ctx.matches.len()
        );

        info!("Seeding blocks...");
        for i in 0..total {
            let blocks = interaction_gen.generate_blocks(
                &ctx.users[i],
                &ctx.users,
                &ctx.swipes,
                &ctx.blocks,
                &ctx.clock,
                rng,
            );
            for block in &blocks {
                seeder.seed_block(block).await?;
                ctx.blocks.record(block);
            }
        }
        info!("Seeded {} blocks", ctx.blocks.len());
        Ok(())
    }

    async fn seed_conversations<G: Gateway>(
        &self,
        seeder: &mut Seeder<'_, G>,
        ctx: &mut SeedContext,
        rng: &mut impl Rng,
    ) -> Result<(), SeedError> {
        let conversation_gen = ConversationGenerator::with_config(ConversationGenConfig {
            max_conversation_length: self.config.max_conversation_length,
            reply_ratio: self.config.reply_ratio,
        });
        let total = ctx.matches.len();
        info!("Seeding {} conversations...", total);

        for i in 0..total {
            let match_id = ctx.matches[i].id;
            let generated =
                conversation_gen.generate(&ctx.matches[i], &ctx.blocks, &ctx.clock, rng);
            let seeded = seeder.seed_conversation(match_id, &generated).await?;

            let messages = generated
                .messages
                .iter()
                .zip(&seeded.message_ids)
                .map(|(message, id)| MessageRecord {
                    id: *id,
                    sender_id: message.sender_id,
                    send_time: message.send_time,
                    reply_to: message
                        .reply_to
                        .and_then(|index| seeded.message_ids.get(index).copied()),
                })
                .collect();

            ctx.conversations.push(ConversationRecord {
                id: seeded.conversation_id,
                match_id,
                messages,
            });

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!("  Seeded {}/{} conversations", i + 1, total);
            }
        }

        info!(
            "Seeded {} conversations with {} messages",
            total,
            ctx.message_count()
        );
        Ok(())
    }

    fn user_config(&self) -> UserGenConfig {
        UserGenConfig {
            enable_locale: self.config.enable_locale,
            migration_ratio: self.config.migration_ratio,
            oldest_current_photo: self.config.oldest_current_photo,
            oldest_unverified_photo: self.config.oldest_unverified_photo,
            subscription_ratio: self.config.subscription_ratio,
            subscription: SubscriptionGenConfig {
                auto_renewal_ratio: self.config.auto_renewal_ratio,
                domestic_migration_ratio: self.config.domestic_migration_ratio,
                international_migration_ratio: self.config.international_migration_ratio,
            },
        }
    }

    fn interaction_config(&self) -> InteractionGenConfig {
        InteractionGenConfig {
            max_user_swipes: self.config.max_user_swipes,
            right_swipe_ratio: self.config.right_swipe_ratio,
            max_match_length: self.config.max_match_length,
            match_block_ratio: self.config.match_block_ratio,
            max_match_block_difference: self.config.max_match_block_difference,
            user_block_ratio: self.config.user_block_ratio,
            min_block_length: self.config.min_block_length,
            max_block_length: self.config.max_block_length,
        }
    }
}

/// Preset scenarios for common testing needs.
impl ScenarioBuilder {
    /// Few users who like everyone they see.
    ///
    /// - 20 users, every swipe a like
    /// - Many matches, each with a conversation
    pub fn matchmaking_test() -> Self {
        let config = SeedConfig {
            users_number: 20,
            admins_number: 1,
            max_user_swipes: 19,
            right_swipe_ratio: 100.0,
            ..SeedConfig::default()
        };
        Self::new().with_config(config)
    }

    /// A heavily moderated population.
    ///
    /// - 100 users, half of them reported
    /// - Most reports end in a ban
    pub fn moderation_test() -> Self {
        let config = SeedConfig {
            users_number: 100,
            admins_number: 3,
            user_report_ratio: 50.0,
            report_ban_ratio: 80.0,
            max_user_swipes: 20,
            ..SeedConfig::default()
        };
        Self::new().with_config(config)
    }

    /// Every feature at default ratios, with metrics.
    pub fn comprehensive_test() -> Self {
        Self::new()
            .with_users(300)
            .with_admins(5)
            .with_truncate(true)
            .with_metrics(true)
    }
}
