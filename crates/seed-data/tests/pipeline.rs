//! End-to-end seeding runs against the in-memory gateway.
//!
//! Every run uses a strict gateway, so an insert that references a row not
//! yet written fails the run itself.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use seed_data::builders::{ScenarioBuilder, ScenarioResult};
use seed_data::config::SeedConfig;
use seed_data::context::Clock;
use seed_data::db::{MemoryGateway, Row, RowId, Value, tables};
use seed_data::reference::ReferenceData;
use seed_data::temporal::{add_days, midnight};
use time::macros::datetime;
use time::{Date, PrimitiveDateTime};

fn reference() -> ReferenceData {
    ReferenceData::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
        .expect("shipped reference data loads")
}

fn clock() -> Clock {
    Clock::fixed(datetime!(2025-06-01 12:00))
}

fn config(users: usize) -> SeedConfig {
    SeedConfig {
        users_number: users,
        admins_number: 3,
        user_report_ratio: 20.0,
        report_ban_ratio: 60.0,
        max_user_swipes: 15,
        right_swipe_ratio: 70.0,
        match_block_ratio: 30.0,
        user_block_ratio: 2.0,
        max_conversation_length: 10,
        ..SeedConfig::default()
    }
}

async fn run(gateway: &mut MemoryGateway, config: SeedConfig, seed: u64) -> ScenarioResult {
    let mut rng = StdRng::seed_from_u64(seed);
    ScenarioBuilder::new()
        .with_config(config)
        .with_reference(reference())
        .with_clock(clock())
        .with_truncate(true)
        .with_metrics(true)
        .build(gateway, &mut rng)
        .await
        .expect("scenario builds")
}

fn id(row: &Row, field: &str) -> RowId {
    match row.get(field) {
        Some(Value::Id(id)) => *id,
        other => panic!("{field} is not an id: {other:?}"),
    }
}

fn date(row: &Row, field: &str) -> Option<Date> {
    match row.get(field) {
        Some(Value::Date(d)) => Some(*d),
        None => None,
        other => panic!("{field} is not a date: {other:?}"),
    }
}

fn timestamp(row: &Row, field: &str) -> PrimitiveDateTime {
    match row.get(field) {
        Some(Value::Timestamp(t)) => *t,
        other => panic!("{field} is not a timestamp: {other:?}"),
    }
}

fn boolean(row: &Row, field: &str) -> bool {
    match row.get(field) {
        Some(Value::Bool(b)) => *b,
        other => panic!("{field} is not a bool: {other:?}"),
    }
}

/// Account creation time per `user_details` id.
fn creation_times(gateway: &MemoryGateway) -> HashMap<RowId, PrimitiveDateTime> {
    gateway
        .rows(&tables::USER_DETAILS)
        .iter()
        .map(|stored| {
            let account = gateway
                .find(&tables::ACCOUNT, id(&stored.row, "fk_user_id"))
                .expect("account exists");
            (stored.id.unwrap(), timestamp(account, "created_at"))
        })
        .collect()
}

#[tokio::test]
async fn test_no_dangling_foreign_keys() {
    let mut gateway = MemoryGateway::strict();
    let result = run(&mut gateway, config(60), 1).await;

    assert!(gateway.dangling_references().is_empty());
    assert_eq!(gateway.count(&tables::USER_DETAILS), 60);
    assert_eq!(gateway.count(&tables::ADMINISTRATOR), 3);
    assert_eq!(gateway.count(&tables::REPORT), 12);
    assert_eq!(result.context.users.len(), 60);
}

#[tokio::test]
async fn test_match_dates_respect_account_creation() {
    let mut gateway = MemoryGateway::strict();
    run(&mut gateway, config(60), 2).await;
    let created = creation_times(&gateway);
    let today = clock().today;

    assert!(gateway.count(&tables::MATCH) > 0);
    for stored in gateway.rows(&tables::MATCH) {
        let p1 = id(&stored.row, "fk_person1_id");
        let p2 = id(&stored.row, "fk_person2_id");
        let formed = date(&stored.row, "date_formed").unwrap();
        let earliest = created[&p1].max(created[&p2]).date();

        assert!(formed >= earliest, "match formed {formed} before {earliest}");
        assert!(formed <= today);
        if let Some(ended) = date(&stored.row, "date_ended") {
            assert!(ended >= formed);
            assert!(ended <= today);
        }
    }
}

#[tokio::test]
async fn test_message_times_within_match() {
    let mut gateway = MemoryGateway::strict();
    run(&mut gateway, config(60), 3).await;
    let now = clock().now;

    let windows: HashMap<RowId, (PrimitiveDateTime, PrimitiveDateTime)> = gateway
        .rows(&tables::CONVERSATION)
        .iter()
        .map(|conversation| {
            let matched = gateway
                .find(&tables::MATCH, id(&conversation.row, "fk_match_id"))
                .unwrap();
            let start = midnight(date(matched, "date_formed").unwrap());
            let end = date(matched, "date_ended").map_or(now, midnight);
            (conversation.id.unwrap(), (start, end))
        })
        .collect();

    assert!(gateway.count(&tables::MESSAGE) > 0);
    for message in gateway.rows(&tables::MESSAGE) {
        let (start, end) = windows[&id(&message.row, "fk_conversation_id")];
        let sent = timestamp(&message.row, "send_time");
        assert!(sent >= start && sent <= end, "{sent} outside {start}..={end}");

        if message.row.get("fk_replying_to_message_id").is_some() {
            let replied = id(&message.row, "fk_replying_to_message_id");
            assert!(replied < message.id.unwrap());
        }
    }
}

#[tokio::test]
async fn test_match_iff_mutual_like() {
    let mut gateway = MemoryGateway::strict();
    run(&mut gateway, config(40), 4).await;

    let likes: HashSet<(RowId, RowId)> = gateway
        .rows(&tables::SWIPE)
        .iter()
        .filter(|s| boolean(&s.row, "result"))
        .map(|s| {
            (
                id(&s.row, "fk_swiping_user_details_id"),
                id(&s.row, "fk_swiped_user_details_id"),
            )
        })
        .collect();
    let mutual: HashSet<(RowId, RowId)> = likes
        .iter()
        .filter(|(a, b)| likes.contains(&(*b, *a)))
        .map(|(a, b)| (*a.min(b), *a.max(b)))
        .collect();

    let matched: Vec<(RowId, RowId)> = gateway
        .rows(&tables::MATCH)
        .iter()
        .map(|m| {
            let a = id(&m.row, "fk_person1_id");
            let b = id(&m.row, "fk_person2_id");
            (a.min(b), a.max(b))
        })
        .collect();
    let matched_set: HashSet<_> = matched.iter().copied().collect();

    assert_eq!(matched.len(), matched_set.len(), "duplicate matches");
    assert_eq!(matched_set, mutual);
}

#[tokio::test]
async fn test_three_users_liking_everyone() {
    let config = SeedConfig {
        users_number: 3,
        admins_number: 0,
        user_report_ratio: 0.0,
        max_user_swipes: 2,
        right_swipe_ratio: 100.0,
        ..SeedConfig::default()
    };

    for seed in 0..20 {
        let mut gateway = MemoryGateway::strict();
        run(&mut gateway, config.clone(), seed).await;

        let swiped: HashSet<(RowId, RowId)> = gateway
            .rows(&tables::SWIPE)
            .iter()
            .map(|s| {
                (
                    id(&s.row, "fk_swiping_user_details_id"),
                    id(&s.row, "fk_swiped_user_details_id"),
                )
            })
            .collect();
        let expected = swiped
            .iter()
            .filter(|(a, b)| a < b && swiped.contains(&(*b, *a)))
            .count();

        assert!(gateway.count(&tables::SWIPE) <= 6);
        assert_eq!(gateway.count(&tables::MATCH), expected, "seed {seed}");
    }
}

#[tokio::test]
async fn test_bans_follow_reports() {
    let mut gateway = MemoryGateway::strict();
    run(&mut gateway, config(80), 5).await;
    let today = clock().today;

    assert!(gateway.count(&tables::BAN) > 0);
    for ban in gateway.rows(&tables::BAN) {
        let report = gateway
            .find(&tables::REPORT, id(&ban.row, "fk_report_id"))
            .unwrap();
        assert_eq!(
            id(&ban.row, "fk_user_id"),
            id(report, "fk_reported_user_id")
        );

        let start = date(&ban.row, "start_date").unwrap();
        assert!(start >= date(report, "report_date").unwrap());
        assert!(start <= today);

        let period = match ban.row.get("period_days") {
            Some(Value::Int(days)) => *days,
            other => panic!("period_days: {other:?}"),
        };
        assert_eq!(
            boolean(&ban.row, "is_active"),
            add_days(start, period) >= today
        );
    }
}

#[tokio::test]
async fn test_subscriptions_back_filled() {
    let config = SeedConfig {
        subscription_ratio: 50.0,
        ..config(40)
    };
    let mut gateway = MemoryGateway::strict();
    let result = run(&mut gateway, config, 6).await;

    let subscribed: Vec<_> = result
        .context
        .users
        .iter()
        .filter(|u| u.subscription_id.is_some())
        .collect();
    assert!(!subscribed.is_empty());
    assert_eq!(gateway.count(&tables::SUBSCRIPTION), subscribed.len());
    assert_eq!(gateway.count(&tables::PAYMENT_DATA), subscribed.len());

    for user in subscribed {
        let row = gateway.find(&tables::USER_DETAILS, user.id).unwrap();
        assert_eq!(
            row.get("fk_subscription_id"),
            Some(&Value::Id(user.subscription_id.unwrap()))
        );
    }
}

#[tokio::test]
async fn test_truncate_and_rerun() {
    let mut gateway = MemoryGateway::strict();
    run(&mut gateway, config(30), 7).await;
    let second = run(&mut gateway, config(30), 8).await;

    assert!(gateway.dangling_references().is_empty());
    assert_eq!(gateway.count(&tables::USER_DETAILS), 30);
    assert_eq!(gateway.count(&tables::ACCOUNT), 33);
    assert_eq!(
        gateway.count(&tables::MATCH),
        second.context.matches.len()
    );
    // Ids keep counting across the truncate.
    assert!(second.context.users.iter().all(|u| u.id > 30));
}

#[tokio::test]
async fn test_same_seed_same_dataset() {
    let mut first = MemoryGateway::strict();
    let mut second = MemoryGateway::strict();
    let a = run(&mut first, config(30), 9).await;
    let b = run(&mut second, config(30), 9).await;

    let created_a: Vec<_> = a.context.users.iter().map(|u| u.created_at).collect();
    let created_b: Vec<_> = b.context.users.iter().map(|u| u.created_at).collect();
    assert_eq!(created_a, created_b);
    assert_eq!(a.context.matches.len(), b.context.matches.len());
    assert_eq!(a.context.message_count(), b.context.message_count());
}

#[tokio::test]
async fn test_blocks_never_target_matches_in_block_pass() {
    let config = SeedConfig {
        match_block_ratio: 0.0,
        user_block_ratio: 10.0,
        ..config(40)
    };
    let mut gateway = MemoryGateway::strict();
    let result = run(&mut gateway, config, 10).await;
    let ctx = &result.context;

    assert!(gateway.count(&tables::BLOCK) > 0);
    for block in gateway.rows(&tables::BLOCK) {
        let blocker = id(&block.row, "fk_blocking_user_id");
        let blocked = id(&block.row, "fk_blocked_user_id");
        assert_ne!(blocker, blocked);
        assert!(!ctx.swipes.is_mutual_like(blocker, blocked));
    }
}

#[tokio::test]
async fn test_no_messages_while_pair_blocked() {
    let config = SeedConfig {
        max_user_swipes: 39,
        right_swipe_ratio: 100.0,
        match_block_ratio: 100.0,
        max_match_length: 3650,
        max_conversation_length: 20,
        ..config(40)
    };
    let mut gateway = MemoryGateway::strict();
    let result = run(&mut gateway, config, 11).await;
    let ctx = &result.context;

    let open_blocked = ctx
        .matches
        .iter()
        .filter(|m| m.date_ended.is_none() && ctx.blocks.contains(m.person1_id, m.person2_id))
        .count();
    assert!(open_blocked > 0);
    assert!(ctx.message_count() > 0);

    for conversation in &ctx.conversations {
        let matched = ctx
            .matches
            .iter()
            .find(|m| m.id == conversation.match_id)
            .unwrap();
        let windows: Vec<_> = [
            ctx.blocks.window(matched.person1_id, matched.person2_id),
            ctx.blocks.window(matched.person2_id, matched.person1_id),
        ]
        .into_iter()
        .flatten()
        .collect();

        for message in &conversation.messages {
            let day = message.send_time.date();
            assert!(
                windows.iter().all(|w| !w.contains(day)),
                "message {} sent on {day} while match {} was blocked",
                message.id,
                matched.id
            );
        }
    }
}
