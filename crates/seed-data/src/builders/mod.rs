//! Fluent builder APIs for seeding runs.
//!
//! The [`ScenarioBuilder`] runs every generation phase in dependency order
//! against a [`Gateway`](crate::db::Gateway).

mod scenario;

pub use scenario::{PhaseTiming, ScenarioBuilder, ScenarioMetrics, ScenarioResult};
