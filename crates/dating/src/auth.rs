use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),
}

/// Work factor used when hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashCost {
    /// Argon2 defaults, as used for interactive sign-ups.
    #[default]
    Standard,
    /// Minimal memory and a single pass. Only for bulk-generated accounts.
    Seeding,
}

// 1 MiB, one iteration, one lane.
const SEEDING_M_COST: u32 = 1024;

fn hasher(cost: HashCost) -> Result<Argon2<'static>, AuthError> {
    match cost {
        HashCost::Standard => Ok(Argon2::default()),
        HashCost::Seeding => {
            let params = Params::new(SEEDING_M_COST, 1, 1, None)
                .map_err(|e| AuthError::Hash(e.to_string()))?;
            Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
        }
    }
}

pub fn hash_password_with(password: &str, cost: HashCost) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(cost)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies a password against a PHC string. Parameters are read from the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| AuthError::InvalidHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
