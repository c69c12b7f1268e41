//! PostgreSQL gateway running the whole seed inside one transaction.

use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row as _, Transaction};
use tracing::debug;

use crate::db::gateway::{Gateway, Row, RowId, Value};
use crate::db::tables::Table;
use crate::error::SeedError;

/// Writes through a single transaction; nothing is visible until [`commit`](Self::commit).
///
/// Dropping the gateway without committing rolls everything back.
pub struct PgGateway {
    tx: Transaction<'static, Postgres>,
}

impl PgGateway {
    pub async fn begin(pool: &PgPool) -> Result<Self, SeedError> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    pub async fn commit(self) -> Result<(), SeedError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn insert(
        &mut self,
        table: &Table,
        rows: &[Row],
        fields: Option<&[&str]>,
    ) -> Result<Vec<RowId>, SeedError> {
        let mut ids = Vec::with_capacity(if table.keyed { rows.len() } else { 0 });

        for row in rows {
            let row = row.project(fields);
            let names: Vec<&str> = row.fields().iter().map(|(name, _)| *name).collect();
            let sql = insert_sql(table, &names);

            let mut query = sqlx::query(&sql);
            for (_, value) in row.fields() {
                query = bind_value(query, value);
            }

            if table.keyed {
                let record = query.fetch_one(&mut *self.tx).await?;
                ids.push(record.try_get::<RowId, _>("id")?);
            } else {
                query.execute(&mut *self.tx).await?;
            }
        }

        debug!("Inserted {} rows into {}", rows.len(), table.name);
        Ok(ids)
    }

    async fn update(
        &mut self,
        table: &Table,
        values: &[(RowId, Value)],
        key_field: &'static str,
        value_field: &'static str,
    ) -> Result<(), SeedError> {
        let sql = update_sql(table, key_field, value_field);

        for (key, value) in values {
            bind_value(sqlx::query(&sql), value)
                .bind(*key)
                .execute(&mut *self.tx)
                .await?;
        }

        debug!("Updated {} rows of {}", values.len(), table.name);
        Ok(())
    }

    async fn truncate(&mut self, table: &Table) -> Result<(), SeedError> {
        sqlx::query(&format!("TRUNCATE TABLE {} CASCADE", table.name))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Int(v) => query.bind(*v),
        Value::Id(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Bool(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.as_str()),
        Value::Date(v) => query.bind(*v),
        Value::Timestamp(v) => query.bind(*v),
    }
}

fn insert_sql(table: &Table, columns: &[&str]) -> String {
    let returning = if table.keyed { " RETURNING id" } else { "" };

    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES{}", table.name, returning);
    }

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}){}",
        table.name,
        columns.join(", "),
        placeholders.join(", "),
        returning
    )
}

fn update_sql(table: &Table, key_field: &str, value_field: &str) -> String {
    format!(
        "UPDATE {} SET {} = $1 WHERE {} = $2",
        table.name, value_field, key_field
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tables::{ACCOUNT, BLOCK, USER_DETAILS};

    #[test]
    fn test_insert_sql_keyed() {
        assert_eq!(
            insert_sql(&ACCOUNT, &["username", "email"]),
            "INSERT INTO \"user\" (username, email) VALUES ($1, $2) RETURNING id"
        );
    }

    #[test]
    fn test_insert_sql_unkeyed() {
        assert_eq!(
            insert_sql(&BLOCK, &["fk_blocking_user_id", "fk_blocked_user_id"]),
            "INSERT INTO block (fk_blocking_user_id, fk_blocked_user_id) VALUES ($1, $2)"
        );
    }

    #[test]
    fn test_insert_sql_default_values() {
        assert_eq!(
            insert_sql(&USER_DETAILS, &[]),
            "INSERT INTO user_details DEFAULT VALUES RETURNING id"
        );
    }

    #[test]
    fn test_update_sql() {
        assert_eq!(
            update_sql(&USER_DETAILS, "id", "fk_subscription_id"),
            "UPDATE user_details SET fk_subscription_id = $1 WHERE id = $2"
        );
    }
}
