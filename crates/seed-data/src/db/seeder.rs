//! Maps generated entities onto table rows.

use tracing::{debug, info};

use crate::context::{Catalog, CountryEntry, PlanEntry, SexEntry};
use crate::db::gateway::{Gateway, Row, RowId, Value};
use crate::db::tables;
use crate::error::SeedError;
use crate::generators::{
    GeneratedAccount, GeneratedAdmin, GeneratedAffinity, GeneratedBlock, GeneratedConversation,
    GeneratedMatch, GeneratedProfile, GeneratedReport, GeneratedSubscription, GeneratedSwipe,
};
use crate::reference::ReferenceData;

/// Ids assigned to a stored profile.
#[derive(Debug, Clone, Copy)]
pub struct SeededProfile {
    pub user_id: RowId,
    pub subscription_id: Option<RowId>,
}

/// Ids assigned to a stored report.
#[derive(Debug, Clone, Copy)]
pub struct SeededReport {
    pub report_id: RowId,
    pub ban_id: Option<RowId>,
}

/// Ids assigned to a stored conversation, messages in generation order.
#[derive(Debug, Clone)]
pub struct SeededConversation {
    pub conversation_id: RowId,
    pub message_ids: Vec<RowId>,
}

/// Database seeder for inserting generated data through a [`Gateway`].
pub struct Seeder<'g, G: Gateway> {
    gateway: &'g mut G,
}

impl<'g, G: Gateway> Seeder<'g, G> {
    pub fn new(gateway: &'g mut G) -> Self {
        Self { gateway }
    }

    /// Empties every table, children first.
    pub async fn clear_all(&mut self) -> Result<(), SeedError> {
        info!("Clearing {} tables...", tables::ALL.len());
        for table in tables::ALL.iter().rev() {
            self.gateway.truncate(table).await?;
        }
        Ok(())
    }

    /// Seeds the reference tables and the fabricated cities.
    ///
    /// `cities[i]` holds the city names of `reference.countries[i]`.
    pub async fn seed_catalog(
        &mut self,
        reference: &ReferenceData,
        cities: &[Vec<String>],
    ) -> Result<Catalog, SeedError> {
        info!("Seeding {} countries...", reference.countries.len());
        let rows: Vec<Row> = reference
            .countries
            .iter()
            .map(|c| {
                Row::new()
                    .with("name", c.name.as_str())
                    .with("iso_code", c.iso_code.as_str())
                    .with("population", c.population)
                    .with_opt("locale", c.locale.as_deref())
            })
            .collect();
        let country_ids = self
            .gateway
            .insert(&tables::COUNTRY, &rows, Some(&["name", "iso_code"]))
            .await?;

        let mut countries = Vec::with_capacity(country_ids.len());
        for ((record, id), names) in reference.countries.iter().zip(country_ids).zip(cities) {
            let rows: Vec<Row> = names
                .iter()
                .map(|name| {
                    Row::new()
                        .with("name", name.as_str())
                        .with("fk_country_id", id)
                })
                .collect();
            let city_ids = self.gateway.insert(&tables::CITY, &rows, None).await?;
            countries.push(CountryEntry {
                id,
                name: record.name.clone(),
                population: record.population,
                locale: record.locale.clone(),
                city_ids,
            });
        }
        info!(
            "Seeded {} countries with {} cities",
            countries.len(),
            countries.iter().map(|c| c.city_ids.len()).sum::<usize>()
        );

        let rows: Vec<Row> = reference
            .sexes
            .iter()
            .map(|s| {
                Row::new()
                    .with("name", s.name.as_str())
                    .with("frequency", s.frequency)
            })
            .collect();
        let sex_ids = self
            .gateway
            .insert(&tables::SEX, &rows, Some(&["name"]))
            .await?;
        let sexes = reference
            .sexes
            .iter()
            .zip(sex_ids)
            .map(|(record, id)| SexEntry {
                id,
                record: record.clone(),
            })
            .collect();

        let rows: Vec<Row> = reference
            .interests
            .iter()
            .map(|i| Row::new().with("name", i.name.as_str()))
            .collect();
        let interest_ids = self.gateway.insert(&tables::INTEREST, &rows, None).await?;

        let rows: Vec<Row> = reference
            .plans
            .iter()
            .map(|p| {
                Row::new()
                    .with("name", p.name.as_str())
                    .with("price", p.price)
                    .with("payment_cycle", p.payment_cycle.as_str())
                    .with("benefits", p.benefits.as_str())
                    .with("users", p.users)
            })
            .collect();
        let plan_ids = self
            .gateway
            .insert(
                &tables::SUBSCRIPTION_PLAN,
                &rows,
                Some(&["name", "price", "payment_cycle", "benefits"]),
            )
            .await?;
        let plans = reference
            .plans
            .iter()
            .zip(plan_ids)
            .map(|(record, id)| PlanEntry {
                id,
                record: record.clone(),
            })
            .collect();

        info!(
            "Seeded {} sexes, {} interests, {} plans",
            reference.sexes.len(),
            interest_ids.len(),
            reference.plans.len()
        );

        Ok(Catalog {
            countries,
            sexes,
            interest_ids,
            plans,
            report_reasons: reference.report_reasons.clone(),
        })
    }

    pub async fn seed_account(&mut self, account: &GeneratedAccount) -> Result<RowId, SeedError> {
        let row = Row::new()
            .with("username", account.username.as_str())
            .with("email", account.email.as_str())
            .with("password_hash", account.password_hash.as_str())
            .with("created_at", account.created_at);
        self.gateway.insert_one(&tables::ACCOUNT, row).await
    }

    /// Stores a profile with everything hanging off it.
    ///
    /// The subscription chain needs the user to exist first, so its id is
    /// written back to `user_details` afterwards.
    pub async fn seed_profile(
        &mut self,
        account_id: RowId,
        profile: &GeneratedProfile,
    ) -> Result<SeededProfile, SeedError> {
        let preference = &profile.search_preference;
        let preference_id = self
            .gateway
            .insert_one(
                &tables::SEARCH_PREFERENCE,
                Row::new().with("search_description", preference.description.as_str()),
            )
            .await?;

        let rows: Vec<Row> = preference
            .sex_ids
            .iter()
            .enumerate()
            .map(|(i, sex_id)| {
                Row::new()
                    .with("fk_search_preference_id", preference_id)
                    .with("fk_sex_id", *sex_id)
                    .with("priority", (i + 1) as i64)
            })
            .collect();
        self.gateway
            .insert(&tables::SEARCH_PREFERENCE_SEX, &rows, None)
            .await?;

        let rows = affinity_rows("fk_search_preference_id", preference_id, &preference.interests);
        self.gateway
            .insert(&tables::SEARCH_PREFERENCE_INTEREST, &rows, None)
            .await?;

        let user_id = self
            .gateway
            .insert_one(
                &tables::USER_DETAILS,
                Row::new()
                    .with("name", profile.name.as_str())
                    .with("surname", profile.surname.as_str())
                    .with("fk_user_id", account_id)
                    .with("fk_city_id", profile.city_id)
                    .with("fk_sex_id", profile.sex_id)
                    .with("fk_search_preference_id", preference_id),
            )
            .await?;

        let rows = affinity_rows("fk_user_details_id", user_id, &profile.interests);
        self.gateway
            .insert(&tables::USER_INTEREST, &rows, None)
            .await?;

        let rows: Vec<Row> = profile
            .images
            .iter()
            .map(|image| {
                Row::new()
                    .with("file_path", image.file_path.as_str())
                    .with("uploaded_at", image.uploaded_at)
                    .with("file_size_bytes", image.file_size_bytes)
                    .with("is_current", image.is_current)
                    .with("is_verified", image.is_verified)
                    .with("fk_user_details_id", user_id)
            })
            .collect();
        self.gateway.insert(&tables::IMAGE, &rows, None).await?;

        let subscription_id = match &profile.subscription {
            Some(subscription) => {
                let id = self.seed_subscription(subscription).await?;
                self.gateway
                    .update(
                        &tables::USER_DETAILS,
                        &[(user_id, Value::Id(id))],
                        "id",
                        "fk_subscription_id",
                    )
                    .await?;
                Some(id)
            }
            None => None,
        };

        debug!("Seeded user {} for account {}", user_id, account_id);
        Ok(SeededProfile {
            user_id,
            subscription_id,
        })
    }

    async fn seed_subscription(
        &mut self,
        subscription: &GeneratedSubscription,
    ) -> Result<RowId, SeedError> {
        let address = &subscription.billing_address;
        let address_id = self
            .gateway
            .insert_one(
                &tables::BILLING_ADDRESS,
                Row::new()
                    .with("fk_city_id", address.city_id)
                    .with("street", address.street.as_str())
                    .with("postal_code", address.postal_code.as_str()),
            )
            .await?;

        let payment_id = self
            .gateway
            .insert_one(
                &tables::PAYMENT_DATA,
                Row::new()
                    .with("token", subscription.payment_token.as_str())
                    .with("fk_billing_address_id", address_id),
            )
            .await?;

        self.gateway
            .insert_one(
                &tables::SUBSCRIPTION,
                Row::new()
                    .with("expiration_date", subscription.expiration_date)
                    .with("last_renewal", subscription.last_renewal)
                    .with("is_active", subscription.is_active)
                    .with("auto_renewal", subscription.auto_renewal)
                    .with("fk_subscription_plan_id", subscription.plan_id)
                    .with("fk_payment_data_id", payment_id),
            )
            .await
    }

    pub async fn seed_admin(
        &mut self,
        account_id: RowId,
        admin: &GeneratedAdmin,
    ) -> Result<RowId, SeedError> {
        let row = Row::new()
            .with("fk_user_id", account_id)
            .with("hiring_date", admin.hiring_date);
        self.gateway.insert_one(&tables::ADMINISTRATOR, row).await
    }

    /// Stores a report and, if it led to one, its ban.
    pub async fn seed_report(&mut self, report: &GeneratedReport) -> Result<SeededReport, SeedError> {
        let report_id = self
            .gateway
            .insert_one(
                &tables::REPORT,
                Row::new()
                    .with("reason", report.reason.as_str())
                    .with("report_date", report.report_date)
                    .with("fk_reporting_user_id", report.reporting_user_id)
                    .with("fk_reported_user_id", report.reported_user_id)
                    .with("fk_administrator_id", report.administrator_id),
            )
            .await?;

        let ban_id = match &report.ban {
            Some(ban) => Some(
                self.gateway
                    .insert_one(
                        &tables::BAN,
                        Row::new()
                            .with("fk_user_id", report.reported_user_id)
                            .with("fk_report_id", report_id)
                            .with("start_date", ban.window.start)
                            .with("period_days", (ban.window.end - ban.window.start).whole_days())
                            .with("is_active", ban.is_active),
                    )
                    .await?,
            ),
            None => None,
        };

        Ok(SeededReport { report_id, ban_id })
    }

    /// Writes the handled-report count of every administrator in one call.
    pub async fn seed_reports_handled(&mut self, counts: &[(RowId, i64)]) -> Result<(), SeedError> {
        let values: Vec<(RowId, Value)> = counts
            .iter()
            .map(|(admin_id, count)| (*admin_id, Value::Int(*count)))
            .collect();
        self.gateway
            .update(&tables::ADMINISTRATOR, &values, "id", "reports_handled")
            .await
    }

    pub async fn seed_swipe(&mut self, swipe: &GeneratedSwipe) -> Result<RowId, SeedError> {
        let row = Row::new()
            .with("fk_swiping_user_details_id", swipe.swiping_user_id)
            .with("fk_swiped_user_details_id", swipe.swiped_user_id)
            .with("result", swipe.is_like);
        self.gateway.insert_one(&tables::SWIPE, row).await
    }

    /// Stores the match itself; a follow-up block goes through [`Self::seed_block`].
    pub async fn seed_match(&mut self, matched: &GeneratedMatch) -> Result<RowId, SeedError> {
        let row = Row::new()
            .with("fk_person1_id", matched.person1_id)
            .with("fk_person2_id", matched.person2_id)
            .with("date_formed", matched.date_formed)
            .with_opt("date_ended", matched.date_ended);
        self.gateway.insert_one(&tables::MATCH, row).await
    }

    pub async fn seed_block(&mut self, block: &GeneratedBlock) -> Result<(), SeedError> {
        let row = Row::new()
            .with("fk_blocking_user_id", block.blocking_user_id)
            .with("fk_blocked_user_id", block.blocked_user_id)
            .with("start_date", block.window.start)
            .with("is_active", block.is_active);
        self.gateway.insert(&tables::BLOCK, &[row], None).await?;
        Ok(())
    }

    /// Stores a conversation and its messages in send order, so replies
    /// always point at an already stored message.
    pub async fn seed_conversation(
        &mut self,
        match_id: RowId,
        conversation: &GeneratedConversation,
    ) -> Result<SeededConversation, SeedError> {
        let conversation_id = self
            .gateway
            .insert_one(
                &tables::CONVERSATION,
                Row::new()
                    .with("fk_match_id", match_id)
                    .with("chat_theme", conversation.theme.as_str())
                    .with("chat_reaction", conversation.chat_reaction),
            )
            .await?;

        let mut message_ids: Vec<RowId> = Vec::with_capacity(conversation.messages.len());
        for message in &conversation.messages {
            let reply_to = message
                .reply_to
                .and_then(|index| message_ids.get(index).copied());
            let row = Row::new()
                .with("send_time", message.send_time)
                .with("contents", message.contents.as_str())
                .with("reaction", message.reaction)
                .with("fk_sender_id", message.sender_id)
                .with("fk_conversation_id", conversation_id)
                .with_opt("fk_replying_to_message_id", reply_to);
            message_ids.push(self.gateway.insert_one(&tables::MESSAGE, row).await?);
        }

        Ok(SeededConversation {
            conversation_id,
            message_ids,
        })
    }
}

fn affinity_rows(owner_field: &'static str, owner_id: RowId, affinities: &[GeneratedAffinity]) -> Vec<Row> {
    affinities
        .iter()
        .map(|a| {
            Row::new()
                .with(owner_field, owner_id)
                .with("fk_interest_id", a.interest_id)
                .with("level_of_interest", a.level)
                .with("is_positive", a.is_positive)
        })
        .collect()
}
