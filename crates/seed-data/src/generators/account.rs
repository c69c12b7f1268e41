//! Login credentials and account timestamps.

use std::collections::HashSet;

use dating::auth::{HashCost, hash_password_with};
use fake::Fake;
use fake::faker::internet::en::{Password, SafeEmail, Username};
use rand::Rng;
use time::PrimitiveDateTime;
use time::macros::datetime;

use crate::error::SeedError;
use crate::temporal::random_datetime_between;

/// Generated account data ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: PrimitiveDateTime,
}

/// Configuration for account generation.
#[derive(Debug, Clone)]
pub struct AccountGenConfig {
    /// Earliest possible account creation time.
    pub epoch: PrimitiveDateTime,
    /// Draws allowed per unique value before the pool counts as exhausted.
    pub max_unique_attempts: usize,
    pub hash_cost: HashCost,
}

impl Default for AccountGenConfig {
    fn default() -> Self {
        Self {
            epoch: datetime!(2004-09-05 13:00),
            max_unique_attempts: 1000,
            hash_cost: HashCost::Seeding,
        }
    }
}

/// Generates accounts whose usernames and emails are unique for the whole run.
///
/// One instance must be shared by every phase that creates accounts.
pub struct AccountGenerator {
    config: AccountGenConfig,
    usernames: HashSet<String>,
    emails: HashSet<String>,
}

impl AccountGenerator {
    pub fn new() -> Self {
        Self::with_config(AccountGenConfig::default())
    }

    pub fn with_config(config: AccountGenConfig) -> Self {
        Self {
            config,
            usernames: HashSet::new(),
            emails: HashSet::new(),
        }
    }

    /// Generates a single account created between the epoch and `now`.
    pub fn generate(
        &mut self,
        now: PrimitiveDateTime,
        rng: &mut impl Rng,
    ) -> Result<GeneratedAccount, SeedError> {
        let attempts = self.config.max_unique_attempts;
        let username = draw_unique(&mut self.usernames, "username", attempts, || {
            Username().fake_with_rng(rng)
        })?;
        let email = draw_unique(&mut self.emails, "email", attempts, || {
            SafeEmail().fake_with_rng(rng)
        })?;

        let password: String = Password(8..16).fake_with_rng(rng);
        let password_hash = hash_password_with(&password, self.config.hash_cost)?;

        let created_at = random_datetime_between(rng, self.config.epoch, now);

        Ok(GeneratedAccount {
            username,
            email,
            password_hash,
            created_at,
        })
    }

    /// Number of accounts handed out so far.
    pub fn issued(&self) -> usize {
        self.usernames.len()
    }
}

impl Default for AccountGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_unique(
    used: &mut HashSet<String>,
    pool: &'static str,
    attempts: usize,
    mut draw: impl FnMut() -> String,
) -> Result<String, SeedError> {
    for _ in 0..attempts {
        let candidate = draw();
        if used.insert(candidate.clone()) {
            return Ok(candidate);
        }
    }
    Err(SeedError::ExhaustedUniquePool { pool, attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_account() {
        let mut account_gen = AccountGenerator::new();
        let mut rng = StdRng::seed_from_u64(1);
        let now = datetime!(2025-06-01 12:00);

        let account = account_gen.generate(now, &mut rng).unwrap();

        assert!(!account.username.is_empty());
        assert!(account.email.contains('@'));
        assert!(account.password_hash.starts_with("$argon2id$"));
        assert!(account.created_at >= datetime!(2004-09-05 13:00));
        assert!(account.created_at <= now);
    }

    #[test]
    fn test_accounts_are_unique() {
        let mut account_gen = AccountGenerator::new();
        let mut rng = StdRng::seed_from_u64(2);
        let now = datetime!(2025-06-01 12:00);

        let accounts: Vec<_> = (0..50)
            .map(|_| account_gen.generate(now, &mut rng).unwrap())
            .collect();

        let usernames: HashSet<_> = accounts.iter().map(|a| &a.username).collect();
        let emails: HashSet<_> = accounts.iter().map(|a| &a.email).collect();
        assert_eq!(usernames.len(), 50);
        assert_eq!(emails.len(), 50);
        assert_eq!(account_gen.issued(), 50);
    }

    #[test]
    fn test_exhausted_pool() {
        let mut used = HashSet::new();
        used.insert("taken".to_string());
        let result = draw_unique(&mut used, "username", 5, || "taken".to_string());
        assert!(matches!(
            result,
            Err(SeedError::ExhaustedUniquePool {
                pool: "username",
                attempts: 5
            })
        ));
    }
}
