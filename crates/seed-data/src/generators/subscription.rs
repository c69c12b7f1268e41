//! Subscriptions, billing addresses and payment data.

use dating::models::PaymentCycle;
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, StreetName, ZipCode};
use fake::faker::creditcard::en::CreditCardNumber;
use rand::Rng;
use sha2::{Digest, Sha256};
use time::Date;
use time::macros::date;

use crate::context::Catalog;
use crate::db::RowId;
use crate::error::SeedError;
use crate::sampling::{percent_under, uniform_choice, weighted_choice};
use crate::temporal::{add_days, random_date_between};

/// Expiration date stored for lifetime plans.
pub const LIFETIME_EXPIRATION: Date = date!(2038 - 01 - 19);

#[derive(Debug, Clone)]
pub struct GeneratedBillingAddress {
    pub city_id: RowId,
    pub street: String,
    pub postal_code: String,
}

/// Generated subscription chain ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedSubscription {
    pub plan_id: RowId,
    pub last_renewal: Date,
    pub expiration_date: Date,
    pub is_active: bool,
    pub auto_renewal: bool,
    pub billing_address: GeneratedBillingAddress,
    pub payment_token: String,
}

/// Configuration for subscription generation.
#[derive(Debug, Clone)]
pub struct SubscriptionGenConfig {
    pub auto_renewal_ratio: f64,
    /// Chance the billing city is another city of the user's country.
    pub domestic_migration_ratio: f64,
    /// Chance the billing city is in a random country.
    pub international_migration_ratio: f64,
}

impl Default for SubscriptionGenConfig {
    fn default() -> Self {
        Self {
            auto_renewal_ratio: 60.0,
            domestic_migration_ratio: 10.0,
            international_migration_ratio: 2.0,
        }
    }
}

pub struct SubscriptionGenerator {
    config: SubscriptionGenConfig,
}

impl SubscriptionGenerator {
    pub fn new() -> Self {
        Self {
            config: SubscriptionGenConfig::default(),
        }
    }

    pub fn with_config(config: SubscriptionGenConfig) -> Self {
        Self { config }
    }

    /// Generates a subscription for a user living in `city_id` of
    /// `catalog.countries[country_index]`.
    pub fn generate(
        &self,
        catalog: &Catalog,
        country_index: usize,
        city_id: RowId,
        created: Date,
        today: Date,
        rng: &mut impl Rng,
    ) -> Result<GeneratedSubscription, SeedError> {
        let plan = weighted_choice(rng, &catalog.plans, |p| p.record.users, "subscription plans")?;
        let cycle = plan.record.payment_cycle;

        let last_renewal = random_date_between(rng, created, today);
        let expiration_date = cycle
            .period_days()
            .map_or(LIFETIME_EXPIRATION, |days| add_days(last_renewal, days));
        let is_active = today < expiration_date;
        let auto_renewal = is_active
            && cycle != PaymentCycle::OneTime
            && percent_under(rng, self.config.auto_renewal_ratio);

        let billing_address = self.generate_billing_address(catalog, country_index, city_id, rng)?;

        let card_number: String = CreditCardNumber().fake_with_rng(rng);

        Ok(GeneratedSubscription {
            plan_id: plan.id,
            last_renewal,
            expiration_date,
            is_active,
            auto_renewal,
            billing_address,
            payment_token: payment_token(&card_number),
        })
    }

    fn generate_billing_address(
        &self,
        catalog: &Catalog,
        country_index: usize,
        city_id: RowId,
        rng: &mut impl Rng,
    ) -> Result<GeneratedBillingAddress, SeedError> {
        let mut billing_city = city_id;

        if percent_under(rng, self.config.domestic_migration_ratio) {
            let country = catalog
                .countries
                .get(country_index)
                .ok_or(SeedError::EmptyPopulation("countries"))?;
            billing_city = *uniform_choice(rng, &country.city_ids, "cities")?;
        }
        if percent_under(rng, self.config.international_migration_ratio) {
            let country = uniform_choice(rng, &catalog.countries, "countries")?;
            billing_city = *uniform_choice(rng, &country.city_ids, "cities")?;
        }

        let number: String = BuildingNumber().fake_with_rng(rng);
        let street: String = StreetName().fake_with_rng(rng);

        Ok(GeneratedBillingAddress {
            city_id: billing_city,
            street: format!("{number} {street}"),
            postal_code: ZipCode().fake_with_rng(rng),
        })
    }
}

impl Default for SubscriptionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque payment token derived from a card number.
pub fn payment_token(card_number: &str) -> String {
    hex::encode(Sha256::digest(card_number.as_bytes()))
}
