use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewRedemption, Redemption};
use crate::database::repository::Repository;
use crate::database::store::{Db, OnConflict, Record};
use crate::database::table::Table;
use crate::filter::Filter;
use crate::types::TenantId;

fn repo(db: &Db, tenant_id: TenantId) -> Repository<Redemption> {
    Repository::new(db, Table::Redemptions, tenant_id)
}

pub async fn find_by_user(db: &Db, tenant_id: TenantId, user_id: Uuid) -> Result<Option<Redemption>, DatabaseError> {
    repo(db, tenant_id).select_one(Filter::new().eq("user_id", user_id.to_string())).await
}

pub async fn find_by_code(db: &Db, tenant_id: TenantId, code: &str) -> Result<Option<Redemption>, DatabaseError> {
    repo(db, tenant_id).select_one(Filter::new().eq("redemption_code", code)).await
}

/// Unique violations are returned as-is so the caller can tell a
/// (user, tenant) race from a code collision by constraint name.
pub async fn insert(db: &Db, tenant_id: TenantId, user_id: Uuid, code: &str) -> Result<Redemption, DatabaseError> {
    let row = NewRedemption { user_id, tenant_id, redemption_code: code.to_string() };
    repo(db, tenant_id)
        .insert(&row, OnConflict::Error)
        .await?
        .ok_or_else(|| DatabaseError::QueryError("insert returned no row".to_string()))
}

/// Flip an unredeemed row to redeemed. `None` when it was already redeemed
/// (or does not exist in this tenant).
pub async fn mark_redeemed(db: &Db, tenant_id: TenantId, id: Uuid) -> Result<Option<Redemption>, DatabaseError> {
    let mut changes = Record::new();
    changes.insert("redeemed".to_string(), Value::Bool(true));
    changes.insert("redeemed_at".to_string(), Value::String(Utc::now().to_rfc3339()));
    let rows = repo(db, tenant_id)
        .update(Filter::new().eq("id", id.to_string()).eq("redeemed", false), changes)
        .await?;
    Ok(rows.into_iter().next())
}
