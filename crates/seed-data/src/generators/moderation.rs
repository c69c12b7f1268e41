//! Reports against users and the bans they lead to.

use std::collections::HashMap;

use rand::Rng;
use time::Date;

use crate::context::{AdminRecord, Clock, UserRecord};
use crate::db::RowId;
use crate::error::SeedError;
use crate::reference::ReportReason;
use crate::sampling::{int_range, percent_under, uniform_choice, weighted_choice};
use crate::temporal::{TemporalWindow, add_days, random_datetime_between};

/// Ban windows per user.
#[derive(Debug, Clone)]
pub struct BanRegistry {
    today: Date,
    windows: HashMap<RowId, Vec<TemporalWindow>>,
}

impl BanRegistry {
    pub fn new(today: Date) -> Self {
        Self {
            today,
            windows: HashMap::new(),
        }
    }

    pub fn record(&mut self, user_id: RowId, window: TemporalWindow) {
        self.windows.entry(user_id).or_default().push(window);
    }

    pub fn windows(&self, user_id: RowId) -> &[TemporalWindow] {
        self.windows.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_banned(&self, user_id: RowId, date: Date) -> bool {
        self.windows(user_id).iter().any(|w| w.contains(date))
    }

    /// Earliest start among the windows covering `date`, or today if none do.
    pub fn earliest_unbanned_date(&self, user_id: RowId, date: Date) -> Date {
        self.windows(user_id)
            .iter()
            .filter(|w| w.contains(date))
            .map(|w| w.start)
            .min()
            .unwrap_or(self.today)
    }

    /// Total number of recorded bans.
    pub fn len(&self) -> usize {
        self.windows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedBan {
    pub window: TemporalWindow,
    pub is_active: bool,
}

/// Generated report ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub reporting_user_id: RowId,
    pub reported_user_id: RowId,
    pub administrator_id: RowId,
    pub reason: String,
    pub report_date: Date,
    pub ban: Option<GeneratedBan>,
}

/// Configuration for moderation generation.
#[derive(Debug, Clone)]
pub struct ModerationGenConfig {
    /// Reports filed per hundred users.
    pub user_report_ratio: f64,
    /// Chance a report ends in a ban.
    pub report_ban_ratio: f64,
    /// Latest ban start, in days after the report.
    pub max_report_ban_difference: i64,
    pub min_ban_length: i64,
    pub max_ban_length: i64,
}

impl Default for ModerationGenConfig {
    fn default() -> Self {
        Self {
            user_report_ratio: 5.0,
            report_ban_ratio: 40.0,
            max_report_ban_difference: 7,
            min_ban_length: 1,
            max_ban_length: 90,
        }
    }
}

pub struct ModerationGenerator {
    config: ModerationGenConfig,
}

impl ModerationGenerator {
    pub fn new() -> Self {
        Self {
            config: ModerationGenConfig::default(),
        }
    }

    pub fn with_config(config: ModerationGenConfig) -> Self {
        Self { config }
    }

    /// Number of reports to file for `user_count` users.
    pub fn report_count(&self, user_count: usize) -> usize {
        (user_count as f64 * self.config.user_report_ratio / 100.0).round() as usize
    }

    /// Generates one report between two distinct users, possibly with a ban.
    pub fn generate(
        &self,
        users: &[UserRecord],
        admins: &[AdminRecord],
        reasons: &[ReportReason],
        clock: &Clock,
        rng: &mut impl Rng,
    ) -> Result<GeneratedReport, SeedError> {
        if users.len() < 2 {
            return Err(SeedError::ConstraintUnsatisfiable(format!(
                "a report needs two distinct users, found {}",
                users.len()
            )));
        }

        let reporting = rng.gen_range(0..users.len());
        let mut reported = rng.gen_range(0..users.len() - 1);
        if reported >= reporting {
            reported += 1;
        }
        let reporting = &users[reporting];
        let reported = &users[reported];

        let reason = weighted_choice(rng, reasons, |r| r.frequency, "report reasons")?;
        let admin = uniform_choice(rng, admins, "administrators")?;

        let earliest = reporting.created_at.max(reported.created_at);
        let report_date = random_datetime_between(rng, earliest, clock.now).date();

        let ban = if percent_under(rng, self.config.report_ban_ratio) {
            Some(self.generate_ban(report_date, clock.today, rng))
        } else {
            None
        };

        Ok(GeneratedReport {
            reporting_user_id: reporting.id,
            reported_user_id: reported.id,
            administrator_id: admin.id,
            reason: reason.reason.clone(),
            report_date,
            ban,
        })
    }

    fn generate_ban(&self, report_date: Date, today: Date, rng: &mut impl Rng) -> GeneratedBan {
        let offset = int_range(rng, 0, self.config.max_report_ban_difference);
        let start = add_days(report_date, offset).min(today);
        let length = int_range(rng, self.config.min_ban_length, self.config.max_ban_length);
        let window = TemporalWindow::new(start, length);

        GeneratedBan {
            window,
            is_active: window.is_active(today),
        }
    }
}

impl Default for ModerationGenerator {
    fn default() -> Self {
        Self::new()
    }
}
