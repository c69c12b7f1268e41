//! Administrator records derived from generated accounts.

use rand::Rng;
use time::{Date, PrimitiveDateTime};

use crate::sampling::int_range;
use crate::temporal::add_days;

/// Generated administrator data ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedAdmin {
    pub hiring_date: Date,
}

/// Configuration for administrator generation.
#[derive(Debug, Clone)]
pub struct AdminGenConfig {
    /// Latest hiring date, in days after account creation.
    pub max_hiring_difference: i64,
}

impl Default for AdminGenConfig {
    fn default() -> Self {
        Self {
            max_hiring_difference: 365,
        }
    }
}

pub struct AdminGenerator {
    config: AdminGenConfig,
}

impl AdminGenerator {
    pub fn new() -> Self {
        Self {
            config: AdminGenConfig::default(),
        }
    }

    pub fn with_config(config: AdminGenConfig) -> Self {
        Self { config }
    }

    /// Hires an administrator some days after the account was created, never after today.
    pub fn generate(
        &self,
        account_created_at: PrimitiveDateTime,
        today: Date,
        rng: &mut impl Rng,
    ) -> GeneratedAdmin {
        let offset = int_range(rng, 0, self.config.max_hiring_difference);
        let hiring_date = add_days(account_created_at.date(), offset).min(today);
        GeneratedAdmin { hiring_date }
    }
}

impl Default for AdminGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use time::macros::{date, datetime};

    #[test]
    fn test_hiring_after_creation() {
        let admin_gen = AdminGenerator::with_config(AdminGenConfig {
            max_hiring_difference: 30,
        });
        let mut rng = StdRng::seed_from_u64(4);
        let created = datetime!(2020-03-10 08:30);

        for _ in 0..100 {
            let admin = admin_gen.generate(created, date!(2025 - 01 - 01), &mut rng);
            assert!(admin.hiring_date >= date!(2020 - 03 - 10));
            assert!(admin.hiring_date <= date!(2020 - 04 - 09));
        }
    }

    #[test]
    fn test_hiring_clipped_to_today() {
        let admin_gen = AdminGenerator::new();
        let mut rng = StdRng::seed_from_u64(4);
        let today = date!(2025 - 01 - 01);

        for _ in 0..50 {
            let admin = admin_gen.generate(datetime!(2024-12-31 23:00), today, &mut rng);
            assert!(admin.hiring_date <= today);
        }
    }
}
