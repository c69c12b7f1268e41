use serde::{Deserialize, Serialize};

/// Billing cycle of a subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentCycle {
    OneTime,
    Yearly,
    Monthly,
}

impl PaymentCycle {
    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentCycle::OneTime => "OneTime",
            PaymentCycle::Yearly => "Yearly",
            PaymentCycle::Monthly => "Monthly",
        }
    }

    /// Days a single payment keeps the subscription alive, `None` for lifetime plans.
    pub fn period_days(&self) -> Option<i64> {
        match self {
            PaymentCycle::OneTime => None,
            PaymentCycle::Yearly => Some(365),
            PaymentCycle::Monthly => Some(30),
        }
    }
}

/// Colour scheme of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatTheme {
    Light,
    Dark,
}

impl ChatTheme {
    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatTheme::Light => "light",
            ChatTheme::Dark => "dark",
        }
    }
}
