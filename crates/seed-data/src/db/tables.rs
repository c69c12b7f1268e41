//! Tables the generator writes to and how they reference each other.

/// A target table. `keyed` tables have a serial `id` that inserts return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Table {
    pub name: &'static str,
    pub keyed: bool,
}

impl Table {
    pub const fn keyed(name: &'static str) -> Self {
        Self { name, keyed: true }
    }

    pub const fn unkeyed(name: &'static str) -> Self {
        Self { name, keyed: false }
    }
}

pub const COUNTRY: Table = Table::keyed("country");
pub const CITY: Table = Table::keyed("city");
pub const SEX: Table = Table::keyed("sex");
pub const INTEREST: Table = Table::keyed("interest");
pub const SUBSCRIPTION_PLAN: Table = Table::keyed("subscription_plan");

/// Login accounts. Quoted because `user` is reserved.
pub const ACCOUNT: Table = Table::keyed("\"user\"");
pub const SEARCH_PREFERENCE: Table = Table::keyed("search_preference");
pub const SEARCH_PREFERENCE_SEX: Table = Table::keyed("search_preference_sex");
pub const SEARCH_PREFERENCE_INTEREST: Table = Table::keyed("search_preference_interest");
pub const USER_DETAILS: Table = Table::keyed("user_details");
pub const USER_INTEREST: Table = Table::keyed("user_interest");
pub const IMAGE: Table = Table::keyed("image");
pub const BILLING_ADDRESS: Table = Table::keyed("billing_address");
pub const PAYMENT_DATA: Table = Table::keyed("payment_data");
pub const SUBSCRIPTION: Table = Table::keyed("subscription");

pub const ADMINISTRATOR: Table = Table::keyed("administrator");
pub const REPORT: Table = Table::keyed("\"report\"");
pub const BAN: Table = Table::keyed("ban");

pub const SWIPE: Table = Table::keyed("swipe");
pub const MATCH: Table = Table::keyed("\"match\"");
pub const BLOCK: Table = Table::unkeyed("block");

pub const CONVERSATION: Table = Table::keyed("conversation");
pub const MESSAGE: Table = Table::keyed("message");

/// Every table, parents before children.
pub const ALL: [Table; 23] = [
    COUNTRY,
    CITY,
    SEX,
    INTEREST,
    SUBSCRIPTION_PLAN,
    ACCOUNT,
    SEARCH_PREFERENCE,
    SEARCH_PREFERENCE_SEX,
    SEARCH_PREFERENCE_INTEREST,
    BILLING_ADDRESS,
    PAYMENT_DATA,
    SUBSCRIPTION,
    USER_DETAILS,
    USER_INTEREST,
    IMAGE,
    ADMINISTRATOR,
    REPORT,
    BAN,
    SWIPE,
    MATCH,
    BLOCK,
    CONVERSATION,
    MESSAGE,
];

/// A column holding the id of a row in another table.
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub table: Table,
    pub column: &'static str,
    pub references: Table,
}

const fn fk(table: Table, column: &'static str, references: Table) -> ForeignKey {
    ForeignKey {
        table,
        column,
        references,
    }
}

pub const FOREIGN_KEYS: &[ForeignKey] = &[
    fk(CITY, "fk_country_id", COUNTRY),
    fk(SEARCH_PREFERENCE_SEX, "fk_search_preference_id", SEARCH_PREFERENCE),
    fk(SEARCH_PREFERENCE_SEX, "fk_sex_id", SEX),
    fk(SEARCH_PREFERENCE_INTEREST, "fk_search_preference_id", SEARCH_PREFERENCE),
    fk(SEARCH_PREFERENCE_INTEREST, "fk_interest_id", INTEREST),
    fk(USER_DETAILS, "fk_user_id", ACCOUNT),
    fk(USER_DETAILS, "fk_city_id", CITY),
    fk(USER_DETAILS, "fk_sex_id", SEX),
    fk(USER_DETAILS, "fk_search_preference_id", SEARCH_PREFERENCE),
    fk(USER_DETAILS, "fk_subscription_id", SUBSCRIPTION),
    fk(USER_INTEREST, "fk_user_details_id", USER_DETAILS),
    fk(USER_INTEREST, "fk_interest_id", INTEREST),
    fk(IMAGE, "fk_user_details_id", USER_DETAILS),
    fk(BILLING_ADDRESS, "fk_city_id", CITY),
    fk(PAYMENT_DATA, "fk_billing_address_id", BILLING_ADDRESS),
    fk(SUBSCRIPTION, "fk_subscription_plan_id", SUBSCRIPTION_PLAN),
    fk(SUBSCRIPTION, "fk_payment_data_id", PAYMENT_DATA),
    fk(ADMINISTRATOR, "fk_user_id", ACCOUNT),
    fk(REPORT, "fk_reporting_user_id", USER_DETAILS),
    fk(REPORT, "fk_reported_user_id", USER_DETAILS),
    fk(REPORT, "fk_administrator_id", ADMINISTRATOR),
    fk(BAN, "fk_user_id", USER_DETAILS),
    fk(BAN, "fk_report_id", REPORT),
    fk(SWIPE, "fk_swiping_user_details_id", USER_DETAILS),
    fk(SWIPE, "fk_swiped_user_details_id", USER_DETAILS),
    fk(MATCH, "fk_person1_id", USER_DETAILS),
    fk(MATCH, "fk_person2_id", USER_DETAILS),
    fk(BLOCK, "fk_blocking_user_id", USER_DETAILS),
    fk(BLOCK, "fk_blocked_user_id", USER_DETAILS),
    fk(CONVERSATION, "fk_match_id", MATCH),
    fk(MESSAGE, "fk_conversation_id", CONVERSATION),
    fk(MESSAGE, "fk_sender_id", USER_DETAILS),
    fk(MESSAGE, "fk_replying_to_message_id", MESSAGE),
];

/// Foreign keys declared on `table`.
pub fn foreign_keys_of(table: &Table) -> impl Iterator<Item = &'static ForeignKey> + '_ {
    FOREIGN_KEYS.iter().filter(move |fk| fk.table == *table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(table: &Table) -> usize {
        ALL.iter()
            .position(|t| t == table)
            .unwrap_or_else(|| panic!("{} missing from ALL", table.name))
    }

    #[test]
    fn test_parents_listed_before_children() {
        for fk in FOREIGN_KEYS {
            if fk.table == fk.references {
                continue;
            }
            assert!(
                position(&fk.references) < position(&fk.table),
                "{}.{} references a later table",
                fk.table.name,
                fk.column
            );
        }
    }

    #[test]
    fn test_only_block_is_unkeyed() {
        let unkeyed: Vec<_> = ALL.iter().filter(|t| !t.keyed).collect();
        assert_eq!(unkeyed, vec![&BLOCK]);
    }

    #[test]
    fn test_foreign_keys_of() {
        let columns: Vec<_> = foreign_keys_of(&MESSAGE).map(|fk| fk.column).collect();
        assert_eq!(
            columns,
            vec!["fk_conversation_id", "fk_sender_id", "fk_replying_to_message_id"]
        );
    }
}
