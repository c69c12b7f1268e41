//! Shared domain types for the dating application.
//!
//! The seeding crate and the application agree on these enums and on the
//! password hashing scheme, so they live in one place.

pub mod auth;
pub mod models;
