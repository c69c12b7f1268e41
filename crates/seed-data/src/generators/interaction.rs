//! Swipes, matches and blocks between users.

use std::collections::HashMap;

use rand::Rng;
use time::Date;

use crate::context::{Clock, UserRecord};
use crate::db::RowId;
use crate::error::SeedError;
use crate::generators::moderation::BanRegistry;
use crate::sampling::{int_range, percent_under};
use crate::temporal::{TemporalWindow, add_days, random_date_between};

/// End-date draws tried before falling back to the ban boundary.
pub const MAX_END_DATE_ATTEMPTS: usize = 64;

/// Block attempts made per user in the block pass.
pub const BLOCK_ATTEMPTS_PER_USER: usize = 100;

/// Swipe results keyed by `(swiper, swiped)`.
#[derive(Debug, Clone, Default)]
pub struct SwipeLedger {
    swipes: HashMap<(RowId, RowId), bool>,
}

impl SwipeLedger {
    /// Records a swipe and reports whether it completed a mutual like.
    pub fn record(&mut self, swipe: &GeneratedSwipe) -> bool {
        self.swipes
            .insert((swipe.swiping_user_id, swipe.swiped_user_id), swipe.is_like);
        swipe.is_like && self.result(swipe.swiped_user_id, swipe.swiping_user_id) == Some(true)
    }

    pub fn result(&self, swiper: RowId, swiped: RowId) -> Option<bool> {
        self.swipes.get(&(swiper, swiped)).copied()
    }

    pub fn has_swiped(&self, swiper: RowId, swiped: RowId) -> bool {
        self.swipes.contains_key(&(swiper, swiped))
    }

    /// Both users liked each other, i.e. they matched.
    pub fn is_mutual_like(&self, a: RowId, b: RowId) -> bool {
        self.result(a, b) == Some(true) && self.result(b, a) == Some(true)
    }

    pub fn len(&self) -> usize {
        self.swipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swipes.is_empty()
    }
}

/// Block windows keyed by `(blocker, blocked)`.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: HashMap<(RowId, RowId), TemporalWindow>,
}

impl BlockRegistry {
    pub fn record(&mut self, block: &GeneratedBlock) {
        self.blocks
            .insert((block.blocking_user_id, block.blocked_user_id), block.window);
    }

    pub fn contains(&self, blocker: RowId, blocked: RowId) -> bool {
        self.blocks.contains_key(&(blocker, blocked))
    }

    pub fn window(&self, blocker: RowId, blocked: RowId) -> Option<TemporalWindow> {
        self.blocks.get(&(blocker, blocked)).copied()
    }

    /// First day on or after `since` on which either user blocks the other.
    pub fn first_blocked_date(&self, a: RowId, b: RowId, since: Date) -> Option<Date> {
        [self.window(a, b), self.window(b, a)]
            .into_iter()
            .flatten()
            .filter(|w| w.end >= since)
            .map(|w| w.start.max(since))
            .min()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSwipe {
    pub swiping_user_id: RowId,
    pub swiped_user_id: RowId,
    pub is_like: bool,
}

#[derive(Debug, Clone)]
pub struct GeneratedBlock {
    pub blocking_user_id: RowId,
    pub blocked_user_id: RowId,
    pub window: TemporalWindow,
    pub is_active: bool,
}

/// Generated match ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedMatch {
    pub person1_id: RowId,
    pub person2_id: RowId,
    pub date_formed: Date,
    /// `None` while the match is still going on.
    pub date_ended: Option<Date>,
    /// Block from `person1` to `person2` following the match.
    pub block: Option<GeneratedBlock>,
}

/// Configuration for interaction generation.
#[derive(Debug, Clone)]
pub struct InteractionGenConfig {
    pub max_user_swipes: usize,
    pub right_swipe_ratio: f64,
    pub max_match_length: i64,
    pub match_block_ratio: f64,
    pub max_match_block_difference: i64,
    pub user_block_ratio: f64,
    pub min_block_length: i64,
    pub max_block_length: i64,
}

impl Default for InteractionGenConfig {
    fn default() -> Self {
        Self {
            max_user_swipes: 50,
            right_swipe_ratio: 50.0,
            max_match_length: 365,
            match_block_ratio: 5.0,
            max_match_block_difference: 30,
            user_block_ratio: 1.0,
            min_block_length: 1,
            max_block_length: 365,
        }
    }
}

pub struct InteractionGenerator {
    config: InteractionGenConfig,
}

impl InteractionGenerator {
    pub fn new() -> Self {
        Self {
            config: InteractionGenConfig::default(),
        }
    }

    pub fn with_config(config: InteractionGenConfig) -> Self {
        Self { config }
    }

    /// Draws up to `max_user_swipes` swipes for `swiper`, each on a different
    /// user it has not swiped before.
    pub fn generate_swipes(
        &self,
        swiper: &UserRecord,
        users: &[UserRecord],
        ledger: &SwipeLedger,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedSwipe> {
        let count = int_range(rng, 0, self.config.max_user_swipes as i64) as usize;

        let mut remaining: Vec<RowId> = users
            .iter()
            .map(|u| u.id)
            .filter(|&id| id != swiper.id && !ledger.has_swiped(swiper.id, id))
            .collect();

        let mut swipes = Vec::with_capacity(count.min(remaining.len()));
        for _ in 0..count {
            if remaining.is_empty() {
                break;
            }
            let target = remaining.swap_remove(rng.gen_range(0..remaining.len()));
            swipes.push(GeneratedSwipe {
                swiping_user_id: swiper.id,
                swiped_user_id: target,
                is_like: percent_under(rng, self.config.right_swipe_ratio),
            });
        }
        swipes
    }

    /// Dates a match between `person1` and `person2` and decides whether it
    /// ends in a block.
    pub fn generate_match(
        &self,
        person1: &UserRecord,
        person2: &UserRecord,
        bans: &BanRegistry,
        clock: &Clock,
        rng: &mut impl Rng,
    ) -> Result<GeneratedMatch, SeedError> {
        let (date_formed, date_ended) = resolve_match_dates(
            person1,
            person2,
            bans,
            clock.today,
            self.config.max_match_length,
            rng,
        )?;

        let block = if percent_under(rng, self.config.match_block_ratio) {
            let anchor = date_ended.unwrap_or(date_formed);
            let max_difference = int_range(rng, 0, self.config.max_match_block_difference);
            Some(self.generate_block(
                person1.id,
                person2.id,
                anchor,
                Some(max_difference),
                clock.today,
                rng,
            ))
        } else {
            None
        };

        Ok(GeneratedMatch {
            person1_id: person1.id,
            person2_id: person2.id,
            date_formed,
            date_ended,
            block,
        })
    }

    /// Block-pass attempts for one user: each attempt fires with
    /// `user_block_ratio` and targets someone the user has neither blocked
    /// nor matched with.
    pub fn generate_blocks(
        &self,
        blocker: &UserRecord,
        users: &[UserRecord],
        swipes: &SwipeLedger,
        blocks: &BlockRegistry,
        clock: &Clock,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedBlock> {
        let mut generated: Vec<GeneratedBlock> = Vec::new();
        if users.is_empty() {
            return generated;
        }

        for _ in 0..BLOCK_ATTEMPTS_PER_USER {
            if !percent_under(rng, self.config.user_block_ratio) {
                continue;
            }

            let target = (0..users.len())
                .map(|_| &users[rng.gen_range(0..users.len())])
                .find(|candidate| {
                    candidate.id != blocker.id
                        && !blocks.contains(blocker.id, candidate.id)
                        && !generated.iter().any(|b| b.blocked_user_id == candidate.id)
                        && !swipes.is_mutual_like(blocker.id, candidate.id)
                });
            let Some(target) = target else {
                continue;
            };

            let anchor = blocker.created_at.max(target.created_at).date();
            generated.push(self.generate_block(
                blocker.id,
                target.id,
                anchor,
                None,
                clock.today,
                rng,
            ));
        }
        generated
    }

    /// A block starting between `anchor` and `anchor + max_difference`
    /// (or today when unbounded), never after today.
    fn generate_block(
        &self,
        blocking_user_id: RowId,
        blocked_user_id: RowId,
        anchor: Date,
        max_difference: Option<i64>,
        today: Date,
        rng: &mut impl Rng,
    ) -> GeneratedBlock {
        let latest = max_difference.map_or(today, |days| add_days(anchor, days).min(today));
        let start = random_date_between(rng, anchor, latest);
        let length = int_range(rng, self.config.min_block_length, self.config.max_block_length);
        let window = TemporalWindow::new(start, length);

        GeneratedBlock {
            blocking_user_id,
            blocked_user_id,
            window,
            is_active: window.is_active(today),
        }
    }
}

impl Default for InteractionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks start and end dates for a match between two users.
///
/// The start lies between the later account creation and today on a day
/// neither user is banned, when such a day is found. The end is `None`
/// when it would fall after today.
pub fn resolve_match_dates(
    u1: &UserRecord,
    u2: &UserRecord,
    bans: &BanRegistry,
    today: Date,
    max_match_length: i64,
    rng: &mut impl Rng,
) -> Result<(Date, Option<Date>), SeedError> {
    let banned = |date: Date| bans.is_banned(u1.id, date) || bans.is_banned(u2.id, date);
    let earliest_unbanned = |date: Date| {
        bans.earliest_unbanned_date(u1.id, date)
            .min(bans.earliest_unbanned_date(u2.id, date))
    };

    let min_date = u1.created_at.max(u2.created_at).date();
    let attempts = (today - min_date).whole_days().max(1);

    let mut start = None;
    for _ in 0..attempts {
        let candidate = random_date_between(rng, min_date, today);
        if !banned(candidate) {
            start = Some(candidate);
            break;
        }
    }
    let start = start.unwrap_or_else(|| min_date.max(earliest_unbanned(min_date)));

    if start > today {
        return Err(SeedError::ConstraintUnsatisfiable(format!(
            "match between users {} and {} would start on {start}, after {today}",
            u1.id, u2.id
        )));
    }

    let mut end = start;
    let mut found = false;
    for _ in 0..MAX_END_DATE_ATTEMPTS {
        end = add_days(start, int_range(rng, 0, max_match_length));
        if !banned(end) {
            found = true;
            break;
        }
    }
    if !found {
        end = earliest_unbanned(end).max(start);
    }

    Ok((start, (end <= today).then_some(end)))
}
