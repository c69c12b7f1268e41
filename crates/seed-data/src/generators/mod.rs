//! Entity generators for the dating dataset.
//!
//! - [`AccountGenerator`]: Unique logins with hashed passwords
//! - [`UserGenerator`]: Profiles with search preferences, interests and photos
//! - [`SubscriptionGenerator`]: Plans, billing addresses and payment tokens
//! - [`AdminGenerator`]: Administrator hiring dates
//! - [`ModerationGenerator`]: Reports and bans
//! - [`InteractionGenerator`]: Swipes, matches and blocks
//! - [`ConversationGenerator`]: Conversations and messages of a match
//!
//! Generators only touch the RNG. They produce `Generated*` values that the
//! [`Seeder`](crate::db::Seeder) turns into rows.

pub mod account;
pub mod admin;
pub mod conversation;
pub mod geo;
pub mod interaction;
pub mod moderation;
pub mod subscription;
pub mod user;

pub use account::{AccountGenConfig, AccountGenerator, GeneratedAccount};
pub use admin::{AdminGenConfig, AdminGenerator, GeneratedAdmin};
pub use conversation::{
    ConversationGenConfig, ConversationGenerator, GeneratedConversation, GeneratedMessage,
};
pub use geo::{CityGenConfig, CityGenerator};
pub use interaction::{
    BlockRegistry, GeneratedBlock, GeneratedMatch, GeneratedSwipe, InteractionGenConfig,
    InteractionGenerator, SwipeLedger, resolve_match_dates,
};
pub use moderation::{
    BanRegistry, GeneratedBan, GeneratedReport, ModerationGenConfig, ModerationGenerator,
};
pub use subscription::{
    GeneratedBillingAddress, GeneratedSubscription, SubscriptionGenConfig, SubscriptionGenerator,
};
pub use user::{
    GeneratedAffinity, GeneratedImage, GeneratedProfile, GeneratedSearchPreference, NameLocale,
    UserGenConfig, UserGenerator,
};
