//! Conversations between matched users.

use dating::models::ChatTheme;
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use rand::Rng;
use time::{Duration, PrimitiveDateTime};

use crate::context::{Clock, MatchRecord};
use crate::db::RowId;
use crate::generators::interaction::BlockRegistry;
use crate::sampling::{int_range, percent_under};
use crate::temporal::midnight;

#[derive(Debug, Clone)]
pub struct GeneratedMessage {
    pub sender_id: RowId,
    pub contents: String,
    pub reaction: i64,
    pub send_time: PrimitiveDateTime,
    /// Index of an earlier message in the same conversation.
    pub reply_to: Option<usize>,
}

/// Generated conversation ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedConversation {
    pub theme: ChatTheme,
    pub chat_reaction: i64,
    pub messages: Vec<GeneratedMessage>,
}

/// Configuration for conversation generation.
#[derive(Debug, Clone)]
pub struct ConversationGenConfig {
    pub max_conversation_length: usize,
    /// Chance a message replies to an earlier one.
    pub reply_ratio: f64,
}

impl Default for ConversationGenConfig {
    fn default() -> Self {
        Self {
            max_conversation_length: 40,
            reply_ratio: 15.0,
        }
    }
}

pub struct ConversationGenerator {
    config: ConversationGenConfig,
}

impl ConversationGenerator {
    pub fn new() -> Self {
        Self {
            config: ConversationGenConfig::default(),
        }
    }

    pub fn with_config(config: ConversationGenConfig) -> Self {
        Self { config }
    }

    /// Generates the conversation of a match.
    ///
    /// Messages are spread evenly from the day the match formed to the day
    /// it ended, or to now for matches still going on. A block between the
    /// pair ends the conversation the day before it starts.
    pub fn generate(
        &self,
        matched: &MatchRecord,
        blocks: &BlockRegistry,
        clock: &Clock,
        rng: &mut impl Rng,
    ) -> GeneratedConversation {
        let theme = if rng.gen_range(0..11) == 0 {
            ChatTheme::Dark
        } else {
            ChatTheme::Light
        };
        let chat_reaction = int_range(rng, -1, 5);

        let mut count = int_range(rng, 0, self.config.max_conversation_length as i64) as usize;
        let start = midnight(matched.date_formed);
        let mut end = matched.date_ended.map_or(clock.now, midnight);
        if let Some(blocked) =
            blocks.first_blocked_date(matched.person1_id, matched.person2_id, matched.date_formed)
        {
            end = end.min(midnight(blocked));
            if end <= start {
                count = 0;
            }
        }
        let span = (end - start).max(Duration::ZERO);

        let mut messages: Vec<GeneratedMessage> = Vec::with_capacity(count);
        for i in 0..count {
            let sender_id = if rng.gen_bool(0.5) {
                matched.person1_id
            } else {
                matched.person2_id
            };
            let reply_to = if i > 0 && percent_under(rng, self.config.reply_ratio) {
                Some(rng.gen_range(0..i))
            } else {
                None
            };

            messages.push(GeneratedMessage {
                sender_id,
                contents: Sentence(1..12).fake_with_rng(rng),
                reaction: int_range(rng, 0, 5),
                send_time: start + span * i as f64 / count as f64,
                reply_to,
            });
        }

        GeneratedConversation {
            theme,
            chat_reaction,
            messages,
        }
    }
}

impl Default for ConversationGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::interaction::GeneratedBlock;
    use crate::temporal::TemporalWindow;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use time::macros::{date, datetime};

    fn matched(ended: Option<time::Date>) -> MatchRecord {
        MatchRecord {
            id: 1,
            person1_id: 10,
            person2_id: 20,
            date_formed: date!(2024 - 01 - 01),
            date_ended: ended,
        }
    }

    #[test]
    fn test_send_times_within_match() {
        let conversation_gen = ConversationGenerator::with_config(ConversationGenConfig {
            max_conversation_length: 30,
            reply_ratio: 50.0,
        });
        let mut rng = StdRng::seed_from_u64(1);
        let clock = Clock::fixed(datetime!(2025-01-01 12:00));
        let m = matched(Some(date!(2024 - 02 - 01)));

        for _ in 0..50 {
            let conversation =
                conversation_gen.generate(&m, &BlockRegistry::default(), &clock, &mut rng);
            assert!((-1..=5).contains(&conversation.chat_reaction));
            for (i, message) in conversation.messages.iter().enumerate() {
                assert!(message.send_time >= datetime!(2024-01-01 00:00));
                assert!(message.send_time <= datetime!(2024-02-01 00:00));
                assert!([10, 20].contains(&message.sender_id));
                assert!((0..=5).contains(&message.reaction));
                if let Some(reply) = message.reply_to {
                    assert!(reply < i);
                }
            }
            let times: Vec<_> = conversation.messages.iter().map(|m| m.send_time).collect();
            assert!(times.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_open_match_runs_until_now() {
        let conversation_gen = ConversationGenerator::with_config(ConversationGenConfig {
            max_conversation_length: 20,
            reply_ratio: 0.0,
        });
        let mut rng = StdRng::seed_from_u64(2);
        let clock = Clock::fixed(datetime!(2024-01-03 06:00));

        for _ in 0..20 {
            let conversation = conversation_gen
                .generate(&matched(None), &BlockRegistry::default(), &clock, &mut rng);
            for message in &conversation.messages {
                assert!(message.send_time >= datetime!(2024-01-01 00:00));
                assert!(message.send_time <= clock.now);
                assert!(message.reply_to.is_none());
            }
        }
    }

    fn block(blocker: RowId, blocked: RowId, start: time::Date) -> BlockRegistry {
        let mut registry = BlockRegistry::default();
        registry.record(&GeneratedBlock {
            blocking_user_id: blocker,
            blocked_user_id: blocked,
            window: TemporalWindow::new(start, 30),
            is_active: true,
        });
        registry
    }

    #[test]
    fn test_block_ends_open_conversation() {
        let conversation_gen = ConversationGenerator::with_config(ConversationGenConfig {
            max_conversation_length: 30,
            reply_ratio: 0.0,
        });
        let mut rng = StdRng::seed_from_u64(4);
        let clock = Clock::fixed(datetime!(2025-01-01 12:00));
        let blocks = block(20, 10, date!(2024 - 01 - 10));

        let mut sent = 0;
        for _ in 0..20 {
            let conversation =
                conversation_gen.generate(&matched(None), &blocks, &clock, &mut rng);
            for message in &conversation.messages {
                assert!(message.send_time >= datetime!(2024-01-01 00:00));
                assert!(message.send_time < datetime!(2024-01-10 00:00));
            }
            sent += conversation.messages.len();
        }
        assert!(sent > 0);
    }

    #[test]
    fn test_block_on_match_day_leaves_no_messages() {
        let conversation_gen = ConversationGenerator::with_config(ConversationGenConfig {
            max_conversation_length: 30,
            reply_ratio: 0.0,
        });
        let mut rng = StdRng::seed_from_u64(5);
        let clock = Clock::fixed(datetime!(2025-01-01 12:00));
        let blocks = block(10, 20, date!(2024 - 01 - 01));

        for _ in 0..20 {
            let conversation =
                conversation_gen.generate(&matched(None), &blocks, &clock, &mut rng);
            assert!(conversation.messages.is_empty());
        }
    }

    #[test]
    fn test_first_message_at_match_start() {
        let conversation_gen = ConversationGenerator::with_config(ConversationGenConfig {
            max_conversation_length: 10,
            reply_ratio: 100.0,
        });
        let mut rng = StdRng::seed_from_u64(3);
        let clock = Clock::fixed(datetime!(2025-01-01 12:00));

        for _ in 0..20 {
            let conversation = conversation_gen
                .generate(&matched(None), &BlockRegistry::default(), &clock, &mut rng);
            if let Some(first) = conversation.messages.first() {
                assert_eq!(first.send_time, datetime!(2024-01-01 00:00));
                assert!(first.reply_to.is_none());
            }
            for message in conversation.messages.iter().skip(1) {
                assert!(message.reply_to.is_some());
            }
        }
    }
}
