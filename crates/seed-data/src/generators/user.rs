//! User profiles: identity, search preference, interests and photos.

use fake::Fake;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::{EN, FR_FR, JA_JP, PT_BR, ZH_TW};
use rand::Rng;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::context::{Catalog, Clock, SexEntry};
use crate::db::RowId;
use crate::error::SeedError;
use crate::generators::subscription::{
    GeneratedSubscription, SubscriptionGenConfig, SubscriptionGenerator,
};
use crate::sampling::{
    BellCurve, PREFERRED_SEX_COUNT_WEIGHTS, int_range, percent_under, uniform_choice,
    weighted_choice, weighted_index,
};
use crate::temporal::random_datetime_between;

const MIN_PHOTO_BYTES: i64 = 500 * 1024;
const MAX_PHOTO_BYTES: i64 = 5 * 1024 * 1024;

/// Locales names can be generated in. Unknown tags use English.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameLocale {
    English,
    French,
    Portuguese,
    Japanese,
    Chinese,
}

impl NameLocale {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "fr_FR" => NameLocale::French,
            "pt_BR" => NameLocale::Portuguese,
            "ja_JP" => NameLocale::Japanese,
            "zh_TW" => NameLocale::Chinese,
            _ => NameLocale::English,
        }
    }

    pub fn first_name(self, rng: &mut impl Rng) -> String {
        match self {
            NameLocale::English => FirstName(EN).fake_with_rng(rng),
            NameLocale::French => FirstName(FR_FR).fake_with_rng(rng),
            NameLocale::Portuguese => FirstName(PT_BR).fake_with_rng(rng),
            NameLocale::Japanese => FirstName(JA_JP).fake_with_rng(rng),
            NameLocale::Chinese => FirstName(ZH_TW).fake_with_rng(rng),
        }
    }

    pub fn last_name(self, rng: &mut impl Rng) -> String {
        match self {
            NameLocale::English => LastName(EN).fake_with_rng(rng),
            NameLocale::French => LastName(FR_FR).fake_with_rng(rng),
            NameLocale::Portuguese => LastName(PT_BR).fake_with_rng(rng),
            NameLocale::Japanese => LastName(JA_JP).fake_with_rng(rng),
            NameLocale::Chinese => LastName(ZH_TW).fake_with_rng(rng),
        }
    }
}

/// An interest liked or disliked with some intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAffinity {
    pub interest_id: RowId,
    /// Intensity in `1..=10`.
    pub level: i64,
    pub is_positive: bool,
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub file_path: String,
    pub uploaded_at: PrimitiveDateTime,
    pub file_size_bytes: i64,
    pub is_current: bool,
    pub is_verified: bool,
}

#[derive(Debug, Clone)]
pub struct GeneratedSearchPreference {
    pub description: String,
    /// Desired sexes, highest priority first.
    pub sex_ids: Vec<RowId>,
    pub interests: Vec<GeneratedAffinity>,
}

/// Generated profile data ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedProfile {
    pub name: String,
    pub surname: String,
    pub sex_id: RowId,
    pub city_id: RowId,
    pub locale: NameLocale,
    pub search_preference: GeneratedSearchPreference,
    pub interests: Vec<GeneratedAffinity>,
    pub images: Vec<GeneratedImage>,
    pub subscription: Option<GeneratedSubscription>,
}

/// Configuration for profile generation.
#[derive(Debug, Clone)]
pub struct UserGenConfig {
    /// Whether names follow the user's country locale at all.
    pub enable_locale: bool,
    /// Chance a user gets a local name when locales are enabled.
    pub migration_ratio: f64,
    /// Photos older than a draw in `0..=oldest_current_photo` days are not current.
    pub oldest_current_photo: i64,
    /// Photos younger than a draw in `0..=oldest_unverified_photo` days are unverified.
    pub oldest_unverified_photo: i64,
    pub subscription_ratio: f64,
    pub subscription: SubscriptionGenConfig,
}

impl Default for UserGenConfig {
    fn default() -> Self {
        Self {
            enable_locale: true,
            migration_ratio: 90.0,
            oldest_current_photo: 365,
            oldest_unverified_photo: 30,
            subscription_ratio: 20.0,
            subscription: SubscriptionGenConfig::default(),
        }
    }
}

/// Generates complete profiles for already created accounts.
pub struct UserGenerator {
    config: UserGenConfig,
    subscriptions: SubscriptionGenerator,
}

impl UserGenerator {
    pub fn new() -> Self {
        Self::with_config(UserGenConfig::default())
    }

    pub fn with_config(config: UserGenConfig) -> Self {
        let subscriptions = SubscriptionGenerator::with_config(config.subscription.clone());
        Self {
            config,
            subscriptions,
        }
    }

    /// Generates a profile for an account created at `created_at`.
    pub fn generate(
        &self,
        catalog: &Catalog,
        created_at: PrimitiveDateTime,
        clock: &Clock,
        rng: &mut impl Rng,
    ) -> Result<GeneratedProfile, SeedError> {
        let country_index = weighted_index(
            rng,
            catalog.countries.iter().map(|c| c.population as f64),
            "countries",
        )?;
        let country = &catalog.countries[country_index];
        let city_id = *uniform_choice(rng, &country.city_ids, "cities")?;

        let locale = match &country.locale {
            Some(tag)
                if self.config.enable_locale && percent_under(rng, self.config.migration_ratio) =>
            {
                NameLocale::from_tag(tag)
            }
            _ => NameLocale::English,
        };
        let name = locale.first_name(rng);
        let surname = locale.last_name(rng);

        let sex = weighted_choice(rng, &catalog.sexes, |s| s.record.frequency, "sexes")?;

        let search_preference = GeneratedSearchPreference {
            description: Sentence(3..8).fake_with_rng(rng),
            sex_ids: self.generate_preferred_sexes(catalog, sex, rng)?,
            interests: self.generate_affinities(
                catalog,
                BellCurve::PREFERENCE_INTEREST_COUNT,
                rng,
            )?,
        };
        let interests = self.generate_affinities(catalog, BellCurve::INTEREST_COUNT, rng)?;
        let images = self.generate_images(created_at, clock, rng)?;

        let subscription = if percent_under(rng, self.config.subscription_ratio) {
            Some(self.subscriptions.generate(
                catalog,
                country_index,
                city_id,
                created_at.date(),
                clock.today,
                rng,
            )?)
        } else {
            None
        };

        Ok(GeneratedProfile {
            name,
            surname,
            sex_id: sex.id,
            city_id,
            locale,
            search_preference,
            interests,
            images,
            subscription,
        })
    }

    /// Desired sexes weighted by how they attract users of `own` sex.
    /// Repeated draws collapse, so the list may be shorter than drawn.
    fn generate_preferred_sexes(
        &self,
        catalog: &Catalog,
        own: &SexEntry,
        rng: &mut impl Rng,
    ) -> Result<Vec<RowId>, SeedError> {
        let count = weighted_index(rng, PREFERRED_SEX_COUNT_WEIGHTS, "preferred sex count")?;
        let code = own.record.preference_code;

        let mut chosen = Vec::with_capacity(count);
        for _ in 0..count {
            let sex = weighted_choice(
                rng,
                &catalog.sexes,
                |s| s.record.affinity_for(code),
                "preferred sexes",
            )?;
            if !chosen.contains(&sex.id) {
                chosen.push(sex.id);
            }
        }
        Ok(chosen)
    }

    fn generate_affinities(
        &self,
        catalog: &Catalog,
        curve: BellCurve,
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedAffinity>, SeedError> {
        let count = curve.sample(rng)?;

        let mut affinities: Vec<GeneratedAffinity> = Vec::with_capacity(count);
        for _ in 0..count {
            let interest_id = *uniform_choice(rng, &catalog.interest_ids, "interests")?;
            let level = int_range(rng, 1, 10);
            let is_positive = rng.gen_bool(0.5);
            if affinities.iter().any(|a| a.interest_id == interest_id) {
                continue;
            }
            affinities.push(GeneratedAffinity {
                interest_id,
                level,
                is_positive,
            });
        }
        Ok(affinities)
    }

    fn generate_images(
        &self,
        created_at: PrimitiveDateTime,
        clock: &Clock,
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedImage>, SeedError> {
        let count = BellCurve::INTEREST_COUNT.sample(rng)?;

        let images = (0..count)
            .map(|_| {
                let uploaded_at = random_datetime_between(rng, created_at, clock.now);
                let age_days = (clock.now - uploaded_at).whole_days();
                let id = Uuid::from_u128(rng.r#gen());
                GeneratedImage {
                    file_path: format!("images/{}.jpg", id.simple()),
                    uploaded_at,
                    file_size_bytes: int_range(rng, MIN_PHOTO_BYTES, MAX_PHOTO_BYTES),
                    is_current: int_range(rng, 0, self.config.oldest_current_photo) > age_days,
                    is_verified: int_range(rng, 0, self.config.oldest_unverified_photo) < age_days,
                }
            })
            .collect();
        Ok(images)
    }
}

impl Default for UserGenerator {
    fn default() -> Self {
        Self::new()
    }
}
