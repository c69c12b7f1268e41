//! In-process gateway for tests and dry runs.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::db::gateway::{Gateway, Row, RowId, Value};
use crate::db::tables::{ALL, ForeignKey, Table, foreign_keys_of};
use crate::error::SeedError;

/// A stored row and the id it was given, if its table is keyed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: Option<RowId>,
    pub row: Row,
}

#[derive(Debug, Default)]
struct TableState {
    last_id: RowId,
    rows: Vec<StoredRow>,
}

/// Keeps tables in memory and hands out serial ids per table.
///
/// In strict mode every foreign key written must point at an existing row,
/// which makes insertion-order bugs fail loudly.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: HashMap<&'static str, TableState>,
    strict: bool,
    statements: usize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway that rejects dangling foreign keys.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn rows(&self, table: &Table) -> &[StoredRow] {
        self.tables
            .get(table.name)
            .map(|t| t.rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn count(&self, table: &Table) -> usize {
        self.rows(table).len()
    }

    pub fn find(&self, table: &Table, id: RowId) -> Option<&Row> {
        self.rows(table)
            .iter()
            .find(|stored| stored.id == Some(id))
            .map(|stored| &stored.row)
    }

    /// Number of insert and update statements executed, one per row.
    pub fn statements(&self) -> usize {
        self.statements
    }

    /// Every foreign key value in the store that points at a missing row.
    pub fn dangling_references(&self) -> Vec<String> {
        let mut dangling = Vec::new();
        for table in ALL.iter() {
            for stored in self.rows(table) {
                for fk in foreign_keys_of(table) {
                    if let Err(err) = self.check_reference(fk, &stored.row) {
                        dangling.push(err.to_string());
                    }
                }
            }
        }
        dangling
    }

    fn check_reference(&self, fk: &ForeignKey, row: &Row) -> Result<(), SeedError> {
        match row.get(fk.column) {
            None => Ok(()),
            Some(Value::Id(id)) if self.find(&fk.references, *id).is_some() => Ok(()),
            Some(value) => Err(SeedError::UnknownReference(format!(
                "{}.{} = {:?} has no row in {}",
                fk.table.name, fk.column, value, fk.references.name
            ))),
        }
    }

    fn check_row(&self, table: &Table, row: &Row) -> Result<(), SeedError> {
        if !self.strict {
            return Ok(());
        }
        foreign_keys_of(table).try_for_each(|fk| self.check_reference(fk, row))
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn insert(
        &mut self,
        table: &Table,
        rows: &[Row],
        fields: Option<&[&str]>,
    ) -> Result<Vec<RowId>, SeedError> {
        let mut ids = Vec::new();

        for row in rows {
            let row = row.project(fields);
            self.check_row(table, &row)?;

            let state = self.tables.entry(table.name).or_default();
            let id = if table.keyed {
                state.last_id += 1;
                ids.push(state.last_id);
                Some(state.last_id)
            } else {
                None
            };
            state.rows.push(StoredRow { id, row });
            self.statements += 1;
        }

        Ok(ids)
    }

    async fn update(
        &mut self,
        table: &Table,
        values: &[(RowId, Value)],
        key_field: &'static str,
        value_field: &'static str,
    ) -> Result<(), SeedError> {
        for (key, value) in values {
            let probe = Row::new().with(value_field, value.clone());
            if let Some(fk) = foreign_keys_of(table).find(|fk| fk.column == value_field)
                && self.strict
            {
                self.check_reference(fk, &probe)?;
            }

            let state = self.tables.entry(table.name).or_default();
            let mut matched = 0;
            for stored in state.rows.iter_mut() {
                let hit = if key_field == "id" {
                    stored.id == Some(*key)
                } else {
                    stored.row.get(key_field) == Some(&Value::Id(*key))
                };
                if hit {
                    stored.row.set(value_field, value.clone());
                    matched += 1;
                }
            }

            if matched == 0 && self.strict {
                return Err(SeedError::UnknownReference(format!(
                    "no row of {} has {} = {}",
                    table.name, key_field, key
                )));
            }
            self.statements += 1;
        }
        Ok(())
    }

    async fn truncate(&mut self, table: &Table) -> Result<(), SeedError> {
        // Serial counters survive, as they do in PostgreSQL without RESTART IDENTITY.
        if let Some(state) = self.tables.get_mut(table.name) {
            state.rows.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tables::{BLOCK, CITY, COUNTRY, USER_DETAILS};

    #[tokio::test]
    async fn test_serial_ids_per_table() {
        let mut gateway = MemoryGateway::new();
        let rows = vec![Row::new().with("name", "A"), Row::new().with("name", "B")];

        let ids = gateway.insert(&COUNTRY, &rows, None).await.unwrap();
        assert_eq!(ids, vec![1, 2]);

        let id = gateway
            .insert_one(&CITY, Row::new().with("fk_country_id", 2))
            .await
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(gateway.count(&COUNTRY), 2);
        assert_eq!(gateway.statements(), 3);
    }

    #[tokio::test]
    async fn test_unkeyed_table_returns_no_ids() {
        let mut gateway = MemoryGateway::new();
        let ids = gateway
            .insert(&BLOCK, &[Row::new().with("is_active", true)], None)
            .await
            .unwrap();
        assert!(ids.is_empty());
        assert_eq!(gateway.count(&BLOCK), 1);
    }

    #[tokio::test]
    async fn test_strict_rejects_dangling_reference() {
        let mut gateway = MemoryGateway::strict();
        let result = gateway
            .insert_one(&CITY, Row::new().with("fk_country_id", 42))
            .await;
        assert!(matches!(result, Err(SeedError::UnknownReference(_))));
        assert_eq!(gateway.count(&CITY), 0);
    }

    #[tokio::test]
    async fn test_insert_projects_fields() {
        let mut gateway = MemoryGateway::new();
        let row = Row::new()
            .with("name", "Poland")
            .with("iso_code", "PL")
            .with("population", 38_000_000i64);

        let ids = gateway
            .insert(&COUNTRY, &[row], Some(&["name", "iso_code"]))
            .await
            .unwrap();

        let stored = gateway.find(&COUNTRY, ids[0]).unwrap();
        assert!(stored.get("population").is_none());
        assert_eq!(stored.get("iso_code"), Some(&Value::Text("PL".to_string())));
    }

    #[tokio::test]
    async fn test_update_by_id() {
        let mut gateway = MemoryGateway::strict();
        let id = gateway
            .insert_one(&USER_DETAILS, Row::new().with("name", "Ala"))
            .await
            .unwrap();

        gateway
            .update(&USER_DETAILS, &[(id, Value::from("Ola"))], "id", "name")
            .await
            .unwrap();
        assert_eq!(
            gateway.find(&USER_DETAILS, id).unwrap().get("name"),
            Some(&Value::Text("Ola".to_string()))
        );

        let missing = gateway
            .update(&USER_DETAILS, &[(99, Value::from("X"))], "id", "name")
            .await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_strict_update_checks_reference() {
        let mut gateway = MemoryGateway::strict();
        let id = gateway
            .insert_one(&USER_DETAILS, Row::new().with("name", "Ala"))
            .await
            .unwrap();

        let result = gateway
            .update(&USER_DETAILS, &[(id, Value::Id(5))], "id", "fk_subscription_id")
            .await;
        assert!(matches!(result, Err(SeedError::UnknownReference(_))));
    }

    #[tokio::test]
    async fn test_truncate_keeps_counter() {
        let mut gateway = MemoryGateway::new();
        gateway.insert_one(&COUNTRY, Row::new()).await.unwrap();
        gateway.truncate(&COUNTRY).await.unwrap();
        assert_eq!(gateway.count(&COUNTRY), 0);

        let id = gateway.insert_one(&COUNTRY, Row::new()).await.unwrap();
        assert_eq!(id, 2);
        assert!(gateway.dangling_references().is_empty());
    }
}
