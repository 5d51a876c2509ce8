use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Animal, AnimalChanges, NewAnimal};
use crate::database::repository::Repository;
use crate::database::store::{to_record, Db, OnConflict};
use crate::database::table::Table;
use crate::filter::{Filter, SortDirection};
use crate::types::TenantId;

fn repo(db: &Db, tenant_id: TenantId) -> Repository<Animal> {
    Repository::new(db, Table::Animals, tenant_id)
}

/// Active stations in hunt order.
pub async fn list_active(db: &Db, tenant_id: TenantId) -> Result<Vec<Animal>, DatabaseError> {
    repo(db, tenant_id)
        .select_any(Filter::new().eq("is_active", true).order_by("order_index", SortDirection::Asc))
        .await
}

pub async fn list_all(db: &Db, tenant_id: TenantId) -> Result<Vec<Animal>, DatabaseError> {
    repo(db, tenant_id)
        .select_any(Filter::new().order_by("order_index", SortDirection::Asc))
        .await
}

/// Active station carrying `qr_token` in this tenant. A token belonging to
/// another tenant resolves to `None`.
pub async fn find_by_qr_token(db: &Db, tenant_id: TenantId, qr_token: &str) -> Result<Option<Animal>, DatabaseError> {
    repo(db, tenant_id)
        .select_one(Filter::new().eq("qr_token", qr_token).eq("is_active", true))
        .await
}

pub async fn find_by_id(db: &Db, tenant_id: TenantId, id: Uuid) -> Result<Option<Animal>, DatabaseError> {
    repo(db, tenant_id).select_one(Filter::new().eq("id", id.to_string())).await
}

pub async fn create(db: &Db, tenant_id: TenantId, animal: &NewAnimal) -> Result<Animal, DatabaseError> {
    repo(db, tenant_id)
        .insert(animal, OnConflict::Error)
        .await?
        .ok_or_else(|| DatabaseError::QueryError("insert returned no row".to_string()))
}

pub async fn update(
    db: &Db,
    tenant_id: TenantId,
    id: Uuid,
    changes: &AnimalChanges,
) -> Result<Option<Animal>, DatabaseError> {
    let rows = repo(db, tenant_id)
        .update(Filter::new().eq("id", id.to_string()), to_record(changes)?)
        .await?;
    Ok(rows.into_iter().next())
}

pub async fn delete(db: &Db, tenant_id: TenantId, id: Uuid) -> Result<bool, DatabaseError> {
    let deleted = repo(db, tenant_id).delete(Filter::new().eq("id", id.to_string())).await?;
    Ok(deleted > 0)
}
