//! Database integration for seeding generated data.
//!
//! The [`Seeder`] turns generated entities into rows and writes them through
//! a [`Gateway`]: [`PgGateway`] for a real database, [`MemoryGateway`] for
//! tests and dry runs.

mod gateway;
mod memory;
mod postgres;
mod seeder;
pub mod tables;

pub use gateway::{Gateway, Row, RowId, Value};
pub use memory::{MemoryGateway, StoredRow};
pub use postgres::PgGateway;
pub use seeder::{SeededConversation, SeededProfile, SeededReport, Seeder};
pub use tables::Table;
