//! State threaded through the generation phases.
//!
//! The orchestrator owns one [`SeedContext`] per run and lends it to each
//! phase in turn. Later phases only read what earlier phases recorded.

use std::collections::HashMap;

use time::{Date, PrimitiveDateTime};

use crate::db::RowId;
use crate::generators::interaction::{BlockRegistry, SwipeLedger};
use crate::generators::moderation::BanRegistry;
use crate::reference::{PlanRecord, ReportReason, SexRecord};
use crate::temporal::now_utc;

/// Fixed "now" for a run, so every phase agrees on what today is.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    pub now: PrimitiveDateTime,
    pub today: Date,
}

impl Clock {
    pub fn system() -> Self {
        Self::fixed(now_utc())
    }

    pub fn fixed(now: PrimitiveDateTime) -> Self {
        Self {
            now,
            today: now.date(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CountryEntry {
    pub id: RowId,
    pub name: String,
    pub population: i64,
    pub locale: Option<String>,
    pub city_ids: Vec<RowId>,
}

#[derive(Debug, Clone)]
pub struct SexEntry {
    pub id: RowId,
    pub record: SexRecord,
}

#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub id: RowId,
    pub record: PlanRecord,
}

/// Reference rows as stored, with their database ids.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub countries: Vec<CountryEntry>,
    pub sexes: Vec<SexEntry>,
    pub interest_ids: Vec<RowId>,
    pub plans: Vec<PlanEntry>,
    pub report_reasons: Vec<ReportReason>,
}

/// A stored user (`user_details` row) and what later phases need to know about it.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: RowId,
    pub account_id: RowId,
    pub created_at: PrimitiveDateTime,
    pub sex_id: RowId,
    pub city_id: RowId,
    pub subscription_id: Option<RowId>,
}

#[derive(Debug, Clone)]
pub struct AdminRecord {
    pub id: RowId,
    pub account_id: RowId,
    pub created_at: PrimitiveDateTime,
    pub hiring_date: Date,
    pub reports_handled: i64,
}

#[derive(Debug, Clone)]
pub struct ReportRecord {
    pub id: RowId,
    pub reporting_user_id: RowId,
    pub reported_user_id: RowId,
    pub administrator_id: RowId,
    pub report_date: Date,
    pub ban_id: Option<RowId>,
}

#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub id: RowId,
    pub person1_id: RowId,
    pub person2_id: RowId,
    pub date_formed: Date,
    /// `None` while the match is still active.
    pub date_ended: Option<Date>,
}

#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: RowId,
    pub sender_id: RowId,
    pub send_time: PrimitiveDateTime,
    pub reply_to: Option<RowId>,
}

#[derive(Debug, Clone)]
pub struct ConversationRecord {
    pub id: RowId,
    pub match_id: RowId,
    pub messages: Vec<MessageRecord>,
}

/// Everything generated so far in a run.
#[derive(Debug)]
pub struct SeedContext {
    pub clock: Clock,
    pub catalog: Catalog,
    pub users: Vec<UserRecord>,
    user_index: HashMap<RowId, usize>,
    pub admins: Vec<AdminRecord>,
    pub reports: Vec<ReportRecord>,
    pub bans: BanRegistry,
    pub swipes: SwipeLedger,
    pub matches: Vec<MatchRecord>,
    pub blocks: BlockRegistry,
    pub conversations: Vec<ConversationRecord>,
}

impl SeedContext {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            catalog: Catalog::default(),
            users: Vec::new(),
            user_index: HashMap::new(),
            admins: Vec::new(),
            reports: Vec::new(),
            bans: BanRegistry::new(clock.today),
            swipes: SwipeLedger::default(),
            matches: Vec::new(),
            blocks: BlockRegistry::default(),
            conversations: Vec::new(),
        }
    }

    pub fn add_user(&mut self, user: UserRecord) {
        self.user_index.insert(user.id, self.users.len());
        self.users.push(user);
    }

    pub fn user(&self, id: RowId) -> Option<&UserRecord> {
        self.user_index.get(&id).map(|&i| &self.users[i])
    }

    pub fn message_count(&self) -> usize {
        self.conversations.iter().map(|c| c.messages.len()).sum()
    }
}
