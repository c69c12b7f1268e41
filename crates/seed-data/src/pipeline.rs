//! Generation phases and the entities they exchange.

use std::fmt;

/// Families of rows passed from one phase to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Countries,
    Cities,
    Sexes,
    Interests,
    Plans,
    Accounts,
    Users,
    Subscriptions,
    Admins,
    Reports,
    Bans,
    Swipes,
    Matches,
    Blocks,
    Conversations,
    Messages,
}

/// One step of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    ReferenceData,
    Users,
    Admins,
    Moderation,
    Interactions,
    Conversations,
}

impl Phase {
    /// Execution order.
    pub const ORDER: [Phase; 6] = [
        Phase::ReferenceData,
        Phase::Users,
        Phase::Admins,
        Phase::Moderation,
        Phase::Interactions,
        Phase::Conversations,
    ];

    pub fn reads(&self) -> &'static [Entity] {
        match self {
            Phase::ReferenceData => &[],
            Phase::Users => &[
                Entity::Countries,
                Entity::Cities,
                Entity::Sexes,
                Entity::Interests,
                Entity::Plans,
            ],
            Phase::Admins => &[],
            Phase::Moderation => &[Entity::Users, Entity::Admins],
            Phase::Interactions => &[Entity::Users, Entity::Bans],
            Phase::Conversations => &[Entity::Matches],
        }
    }

    pub fn produces(&self) -> &'static [Entity] {
        match self {
            Phase::ReferenceData => &[
                Entity::Countries,
                Entity::Cities,
                Entity::Sexes,
                Entity::Interests,
                Entity::Plans,
            ],
            Phase::Users => &[Entity::Accounts, Entity::Users, Entity::Subscriptions],
            Phase::Admins => &[Entity::Accounts, Entity::Admins],
            Phase::Moderation => &[Entity::Reports, Entity::Bans],
            Phase::Interactions => &[Entity::Swipes, Entity::Matches, Entity::Blocks],
            Phase::Conversations => &[Entity::Conversations, Entity::Messages],
        }
    }

    /// Checks that every phase only reads entities produced before it runs.
    pub fn validate_order(order: &[Phase]) -> Result<(), String> {
        let mut available: Vec<Entity> = Vec::new();
        for phase in order {
            if let Some(missing) = phase.reads().iter().find(|e| !available.contains(e)) {
                return Err(format!("{phase} reads {missing:?} before it is produced"));
            }
            available.extend_from_slice(phase.produces());
        }
        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::ReferenceData => "reference data",
            Phase::Users => "users",
            Phase::Admins => "administrators",
            Phase::Moderation => "moderation",
            Phase::Interactions => "interactions",
            Phase::Conversations => "conversations",
        };
        f.write_str(name)
    }
}
