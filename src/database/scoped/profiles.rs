use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProfile, Profile};
use crate::database::repository::Repository;
use crate::database::store::{Db, OnConflict, Record};
use crate::database::table::Table;
use crate::filter::{Filter, SortDirection};
use crate::sanitize::SanitizedSearch;
use crate::types::{CompletionStatus, ProfileRole, TenantId};

fn repo(db: &Db, tenant_id: TenantId) -> Repository<Profile> {
    Repository::new(db, Table::Profiles, tenant_id)
}

pub async fn get(db: &Db, tenant_id: TenantId, user_id: Uuid) -> Result<Option<Profile>, DatabaseError> {
    repo(db, tenant_id).select_one(Filter::new().eq("user_id", user_id.to_string())).await
}

/// Every profile row a principal owns, across tenants. Role resolution reads
/// these to decide the global super-admin flag.
pub async fn for_principal(db: &Db, user_id: Uuid) -> Result<Vec<Profile>, DatabaseError> {
    db.select(Table::Profiles, &Filter::new().eq("user_id", user_id.to_string()))
        .await
}

/// Visitor profile for (user, tenant), created on first use. Setting
/// `is_super_admin` requires an elevated handle.
pub async fn ensure(
    db: &Db,
    tenant_id: TenantId,
    user_id: Uuid,
    email: Option<String>,
    is_super_admin: bool,
) -> Result<Profile, DatabaseError> {
    if let Some(profile) = get(db, tenant_id, user_id).await? {
        return Ok(profile);
    }
    let row = NewProfile { user_id, tenant_id, email, full_name: None, is_super_admin };
    if let Some(profile) = repo(db, tenant_id).insert(&row, OnConflict::Ignore).await? {
        return Ok(profile);
    }
    // Lost a race with a concurrent insert.
    get(db, tenant_id, user_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("profile".to_string()))
}

/// Visitors of a tenant, newest first, optionally narrowed by a sanitized
/// search over name and email.
pub async fn list_visitors(
    db: &Db,
    tenant_id: TenantId,
    search: Option<&SanitizedSearch>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Profile>, DatabaseError> {
    let mut filter = Filter::new()
        .eq("role", ProfileRole::Visitor.as_str())
        .order_by("created_at", SortDirection::Desc)
        .limit(limit)
        .offset(offset);

    if let Some(term) = search.filter(|s| !s.is_empty()) {
        let term = term.as_str();
        filter = filter
            .or_expression(&format!("full_name.ilike.%{}%,email.ilike.%{}%", term, term))
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
    }

    repo(db, tenant_id).select_any(filter).await
}

pub async fn set_completion(
    db: &Db,
    tenant_id: TenantId,
    user_id: Uuid,
    status: CompletionStatus,
) -> Result<Option<Profile>, DatabaseError> {
    let mut changes = Record::new();
    changes.insert("completion_status".to_string(), Value::String(status.as_str().to_string()));
    let rows = repo(db, tenant_id)
        .update(Filter::new().eq("user_id", user_id.to_string()), changes)
        .await?;
    Ok(rows.into_iter().next())
}
