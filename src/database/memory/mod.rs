mod policy;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Access, OnConflict, Record, Store};
use crate::database::table::Table;
use crate::filter::Filter;

/// In-process store used by tests and local runs without Postgres.
///
/// Writes are serialized behind one mutex. Unique keys and row-level policies
/// are enforced the same way the Postgres schema enforces them.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, Vec<Record>>>,
    selects: Mutex<HashMap<Table, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of select calls issued against `table`.
    pub async fn select_calls(&self, table: Table) -> usize {
        self.selects.lock().await.get(&table).copied().unwrap_or(0)
    }

    /// Raw row count, ignoring policies.
    pub async fn row_count(&self, table: Table) -> usize {
        self.tables.lock().await.get(&table).map(Vec::len).unwrap_or(0)
    }

    fn apply_defaults(table: Table, record: &mut Record) -> Result<(), DatabaseError> {
        if let Some(column) = record.keys().find(|c| !table.has_column(c)) {
            return Err(DatabaseError::QueryError(format!(
                "column \"{}\" of relation \"{}\" does not exist",
                column, table
            )));
        }

        let now = Value::String(Utc::now().to_rfc3339());
        let mut defaults: Vec<(&str, Value)> = vec![
            ("id", Value::String(Uuid::new_v4().to_string())),
            ("created_at", now.clone()),
            ("updated_at", now.clone()),
            ("scanned_at", now),
        ];
        match table {
            Table::Tenants => {
                defaults.push(("is_active", json!(true)));
                defaults.push(("branding", json!({})));
            }
            Table::Profiles => {
                defaults.push(("role", json!("visitor")));
                defaults.push(("completion_status", json!("in_progress")));
                defaults.push(("is_super_admin", json!(false)));
            }
            Table::Animals => {
                defaults.push(("is_active", json!(true)));
                defaults.push(("order_index", json!(0)));
            }
            Table::Redemptions => {
                defaults.push(("redeemed", json!(false)));
            }
            Table::Memberships | Table::UserProgress => {}
        }

        for (column, value) in defaults {
            if table.has_column(column) && record.get(column).map_or(true, Value::is_null) {
                record.insert(column.to_string(), value);
            }
        }
        for (column, _) in table.columns() {
            record.entry(column.to_string()).or_insert(Value::Null);
        }
        Ok(())
    }

    /// Name of the first unique key `candidate` collides with, if any.
    fn conflicting_key(table: Table, rows: &[Record], candidate: &Record, skip: Option<usize>) -> Option<String> {
        let same = |row: &Record, columns: &[&str]| {
            columns.iter().all(|c| match (row.get(*c), candidate.get(*c)) {
                (Some(a), Some(b)) => !b.is_null() && a == b,
                _ => false,
            })
        };

        for (index, row) in rows.iter().enumerate() {
            if Some(index) == skip {
                continue;
            }
            if same(row, &["id"]) {
                return Some(format!("{}_pkey", table));
            }
            if let Some(key) = table.unique_keys().iter().find(|key| same(row, key.columns)) {
                return Some(key.name.to_string());
            }
        }
        None
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, access: Access, table: Table, filter: &Filter) -> Result<Vec<Record>, DatabaseError> {
        *self.selects.lock().await.entry(table).or_insert(0) += 1;

        let tables = self.tables.lock().await;
        let rows: Vec<Record> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| policy::can_read(access, table, row) && filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(filter.apply_window(rows))
    }

    async fn count(&self, access: Access, table: Table, filter: &Filter) -> Result<i64, DatabaseError> {
        let tables = self.tables.lock().await;
        let count = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| policy::can_read(access, table, row) && filter.matches(row))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as i64)
    }

    async fn insert(
        &self,
        access: Access,
        table: Table,
        mut record: Record,
        on_conflict: OnConflict,
    ) -> Result<Option<Record>, DatabaseError> {
        Self::apply_defaults(table, &mut record)?;
        policy::check_insert(access, table, &record)?;

        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table).or_default();
        if let Some(constraint) = Self::conflicting_key(table, rows, &record, None) {
            return match on_conflict {
                OnConflict::Ignore => Ok(None),
                OnConflict::Error => Err(DatabaseError::UniqueViolation { constraint }),
            };
        }
        rows.push(record.clone());
        Ok(Some(record))
    }

    async fn update(
        &self,
        access: Access,
        table: Table,
        filter: &Filter,
        changes: Record,
    ) -> Result<Vec<Record>, DatabaseError> {
        policy::check_modify(access, table, "update")?;
        if let Some(column) = changes.keys().find(|c| !table.has_column(c) || c.as_str() == "id") {
            return Err(DatabaseError::QueryError(format!("column \"{}\" cannot be updated", column)));
        }

        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table).or_default();
        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| filter.matches(row))
            .map(|(index, _)| index)
            .collect();

        let now = Value::String(Utc::now().to_rfc3339());
        let mut updated = Vec::with_capacity(targets.len());
        for index in targets {
            let mut next = rows[index].clone();
            for (column, value) in &changes {
                next.insert(column.clone(), value.clone());
            }
            if table.has_column("updated_at") && !changes.contains_key("updated_at") {
                next.insert("updated_at".to_string(), now.clone());
            }
            if let Some(constraint) = Self::conflicting_key(table, rows, &next, Some(index)) {
                return Err(DatabaseError::UniqueViolation { constraint });
            }
            rows[index] = next.clone();
            updated.push(next);
        }
        Ok(updated)
    }

    async fn delete(&self, access: Access, table: Table, filter: &Filter) -> Result<u64, DatabaseError> {
        policy::check_modify(access, table, "delete")?;

        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|row| !filter.matches(row));
        Ok((before - rows.len()) as u64)
    }
}
