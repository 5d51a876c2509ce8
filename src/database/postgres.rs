use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Access, OnConflict, Record, Store};
use crate::database::table::{ColumnKind, Table};
use crate::filter::{Filter, FilterOrder, FilterWhere, SqlParam};

/// Postgres-backed store. Every call runs in its own transaction; non-elevated
/// access switches to the RLS-subject role and publishes the caller's id as
/// `app.user_id` so the policies in the migrations apply.
pub struct PgStore {
    pool: PgPool,
    rls_role: String,
    log_queries: bool,
}

impl PgStore {
    pub fn new(pool: PgPool, rls_role: impl Into<String>, log_queries: bool) -> Result<Self, DatabaseError> {
        let rls_role = rls_role.into();
        if rls_role.is_empty() || !rls_role.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DatabaseError::QueryError(format!("invalid RLS role name '{}'", rls_role)));
        }
        Ok(Self { pool, rls_role, log_queries })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin(&self, access: Access) -> Result<Transaction<'static, Postgres>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        match access {
            Access::Elevated => {}
            Access::Anonymous => {
                sqlx::query(&format!("SET LOCAL ROLE \"{}\"", self.rls_role)).execute(&mut *tx).await?;
            }
            Access::User(user_id) => {
                sqlx::query(&format!("SET LOCAL ROLE \"{}\"", self.rls_role)).execute(&mut *tx).await?;
                sqlx::query("SELECT set_config('app.user_id', $1, true)")
                    .bind(user_id.to_string())
                    .execute(&mut *tx)
                    .await?;
            }
        }
        Ok(tx)
    }

    fn log(&self, sql: &str) {
        if self.log_queries {
            debug!("sql: {}", sql);
        }
    }

    fn where_clause(
        table: Table,
        filter: &Filter,
        start: usize,
        qualifier: Option<&str>,
        args: &mut PgArguments,
    ) -> Result<String, DatabaseError> {
        let (sql, params) = FilterWhere::generate(filter, start, qualifier)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        for param in &params {
            bind_param(args, table, param)?;
        }
        Ok(sql)
    }

    fn check_columns<'a>(table: Table, columns: impl Iterator<Item = &'a String>) -> Result<Vec<&'a String>, DatabaseError> {
        columns
            .map(|c| {
                if table.has_column(c) {
                    Ok(c)
                } else {
                    Err(DatabaseError::QueryError(format!("column \"{}\" of relation \"{}\" does not exist", c, table)))
                }
            })
            .collect()
    }
}

/// Bind a predicate value using the SQL type of the column it is compared to.
fn bind_param(args: &mut PgArguments, table: Table, param: &SqlParam) -> Result<(), DatabaseError> {
    let kind = table
        .column_kind(&param.column)
        .ok_or_else(|| DatabaseError::QueryError(format!("unknown column {}.{}", table, param.column)))?;
    let invalid = || DatabaseError::QueryError(format!("invalid value for {}.{}: {}", table, param.column, param.value));
    let value = &param.value;

    match kind {
        ColumnKind::Uuid => {
            let v: Option<Uuid> = match value {
                Value::Null => None,
                Value::String(s) => Some(Uuid::parse_str(s).map_err(|_| invalid())?),
                _ => return Err(invalid()),
            };
            args.add(v);
        }
        ColumnKind::Text => {
            let v: Option<String> = match value {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            };
            args.add(v);
        }
        ColumnKind::Bool => {
            let v: Option<bool> = match value {
                Value::Null => None,
                Value::Bool(b) => Some(*b),
                Value::String(s) => Some(s.parse().map_err(|_| invalid())?),
                _ => return Err(invalid()),
            };
            args.add(v);
        }
        ColumnKind::Int => {
            let v: Option<i64> = match value {
                Value::Null => None,
                Value::Number(n) => Some(n.as_i64().ok_or_else(invalid)?),
                Value::String(s) => Some(s.parse().map_err(|_| invalid())?),
                _ => return Err(invalid()),
            };
            args.add(v);
        }
        ColumnKind::Timestamp => {
            let v: Option<DateTime<Utc>> = match value {
                Value::Null => None,
                Value::String(s) => Some(
                    DateTime::parse_from_rfc3339(s)
                        .map_err(|_| invalid())?
                        .with_timezone(&Utc),
                ),
                _ => return Err(invalid()),
            };
            args.add(v);
        }
        ColumnKind::Json => {
            args.add(sqlx::types::Json(value.clone()));
        }
    }
    Ok(())
}

fn map_error(table: Table, operation: &'static str, err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => {
                return DatabaseError::UniqueViolation {
                    constraint: db.constraint().unwrap_or_default().to_string(),
                }
            }
            Some("42501") => return DatabaseError::PolicyViolation { table: table.name(), operation },
            _ => {}
        }
    }
    DatabaseError::Sqlx(err)
}

fn into_record(value: Value) -> Result<Record, DatabaseError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!("row_to_json returned {}", other))),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn select(&self, access: Access, table: Table, filter: &Filter) -> Result<Vec<Record>, DatabaseError> {
        let mut args = PgArguments::default();
        let where_sql = Self::where_clause(table, filter, 0, None, &mut args)?;
        let order_sql = FilterOrder::generate(filter.order()).map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let mut sql = format!("SELECT \"{}\".* FROM \"{}\" WHERE {} {}", table, table, where_sql, order_sql);
        if let Some(limit) = filter.limit_value() {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = filter.offset_value() {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        let sql = format!("SELECT row_to_json(t) FROM ({}) t", sql);
        self.log(&sql);

        let mut tx = self.begin(access).await?;
        let rows: Vec<Value> = sqlx::query_scalar_with(&sql, args)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_error(table, "select", e))?;
        tx.commit().await?;

        rows.into_iter().map(into_record).collect()
    }

    async fn count(&self, access: Access, table: Table, filter: &Filter) -> Result<i64, DatabaseError> {
        let mut args = PgArguments::default();
        let where_sql = Self::where_clause(table, filter, 0, None, &mut args)?;
        let sql = format!("SELECT COUNT(*) FROM \"{}\" WHERE {}", table, where_sql);
        self.log(&sql);

        let mut tx = self.begin(access).await?;
        let count: i64 = sqlx::query_scalar_with(&sql, args)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_error(table, "select", e))?;
        tx.commit().await?;
        Ok(count)
    }

    async fn insert(
        &self,
        access: Access,
        table: Table,
        record: Record,
        on_conflict: OnConflict,
    ) -> Result<Option<Record>, DatabaseError> {
        let columns: Vec<String> = Self::check_columns(table, record.keys())?
            .into_iter()
            .map(|c| format!("\"{}\"", c))
            .collect();
        let column_list = columns.join(", ");
        let conflict = match on_conflict {
            OnConflict::Error => "",
            OnConflict::Ignore => " ON CONFLICT DO NOTHING",
        };
        let sql = format!(
            "INSERT INTO \"{t}\" AS r ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::\"{t}\", $1){conflict} RETURNING row_to_json(r)",
            t = table,
            cols = column_list,
            conflict = conflict,
        );
        self.log(&sql);

        let mut args = PgArguments::default();
        args.add(sqlx::types::Json(Value::Object(record)));

        let mut tx = self.begin(access).await?;
        let row: Option<Value> = sqlx::query_scalar_with(&sql, args)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_error(table, "insert", e))?;
        tx.commit().await?;

        row.map(into_record).transpose()
    }

    async fn update(
        &self,
        access: Access,
        table: Table,
        filter: &Filter,
        changes: Record,
    ) -> Result<Vec<Record>, DatabaseError> {
        let mut assignments: Vec<String> = Self::check_columns(table, changes.keys())?
            .into_iter()
            .map(|c| format!("\"{c}\" = p.\"{c}\"", c = c))
            .collect();
        if changes.contains_key("id") {
            return Err(DatabaseError::QueryError("column \"id\" cannot be updated".to_string()));
        }
        if table.has_column("updated_at") && !changes.contains_key("updated_at") {
            assignments.push("\"updated_at\" = now()".to_string());
        }
        if assignments.is_empty() {
            return Ok(vec![]);
        }

        let mut args = PgArguments::default();
        args.add(sqlx::types::Json(Value::Object(changes)));
        let where_sql = Self::where_clause(table, filter, 1, Some("r"), &mut args)?;
        let sql = format!(
            "UPDATE \"{t}\" AS r SET {set} FROM jsonb_populate_record(NULL::\"{t}\", $1) AS p WHERE {w} RETURNING row_to_json(r)",
            t = table,
            set = assignments.join(", "),
            w = where_sql,
        );
        self.log(&sql);

        let mut tx = self.begin(access).await?;
        let rows: Vec<Value> = sqlx::query_scalar_with(&sql, args)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_error(table, "update", e))?;
        tx.commit().await?;

        rows.into_iter().map(into_record).collect()
    }

    async fn delete(&self, access: Access, table: Table, filter: &Filter) -> Result<u64, DatabaseError> {
        let mut args = PgArguments::default();
        let where_sql = Self::where_clause(table, filter, 0, None, &mut args)?;
        let sql = format!("DELETE FROM \"{}\" WHERE {}", table, where_sql);
        self.log(&sql);

        let mut tx = self.begin(access).await?;
        let result = sqlx::query_with(&sql, args)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_error(table, "delete", e))?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        crate::database::manager::DatabaseManager::health_check(&self.pool).await
    }
}
