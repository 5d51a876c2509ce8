use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Membership, NewMembership};
use crate::database::repository::Repository;
use crate::database::store::{Db, OnConflict, Record};
use crate::database::table::Table;
use crate::filter::{Filter, SortDirection};
use crate::types::{MembershipRole, TenantId};

fn repo(db: &Db, tenant_id: TenantId) -> Repository<Membership> {
    Repository::new(db, Table::Memberships, tenant_id)
}

pub async fn list(db: &Db, tenant_id: TenantId) -> Result<Vec<Membership>, DatabaseError> {
    repo(db, tenant_id)
        .select_any(Filter::new().order_by("created_at", SortDirection::Asc))
        .await
}

pub async fn find(db: &Db, tenant_id: TenantId, user_id: Uuid) -> Result<Option<Membership>, DatabaseError> {
    repo(db, tenant_id).select_one(Filter::new().eq("user_id", user_id.to_string())).await
}

/// Memberships of one principal, across tenants unless `tenant_id` narrows it.
/// Used only by role resolution, which runs before a tenant may be known.
pub async fn for_principal(
    db: &Db,
    user_id: Uuid,
    tenant_id: Option<TenantId>,
) -> Result<Vec<Membership>, DatabaseError> {
    match tenant_id {
        Some(tenant_id) => repo(db, tenant_id).select_any(Filter::new().eq("user_id", user_id.to_string())).await,
        None => {
            db.select(Table::Memberships, &Filter::new().eq("user_id", user_id.to_string()))
                .await
        }
    }
}

/// Fails with `UniqueViolation` when the user already belongs to the tenant.
pub async fn insert(
    db: &Db,
    tenant_id: TenantId,
    user_id: Uuid,
    role: MembershipRole,
) -> Result<Membership, DatabaseError> {
    let row = NewMembership { user_id, tenant_id, role };
    repo(db, tenant_id)
        .insert(&row, OnConflict::Error)
        .await?
        .ok_or_else(|| DatabaseError::QueryError("insert returned no row".to_string()))
}

pub async fn delete(db: &Db, tenant_id: TenantId, user_id: Uuid) -> Result<u64, DatabaseError> {
    repo(db, tenant_id).delete(Filter::new().eq("user_id", user_id.to_string())).await
}

pub async fn set_role(
    db: &Db,
    tenant_id: TenantId,
    user_id: Uuid,
    role: MembershipRole,
) -> Result<Option<Membership>, DatabaseError> {
    let mut changes = Record::new();
    changes.insert("role".to_string(), Value::String(role.as_str().to_string()));
    let rows = repo(db, tenant_id)
        .update(Filter::new().eq("user_id", user_id.to_string()), changes)
        .await?;
    Ok(rows.into_iter().next())
}
