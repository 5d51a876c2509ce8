use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProgress, Progress};
use crate::database::repository::Repository;
use crate::database::store::{Db, OnConflict};
use crate::database::table::Table;
use crate::filter::{Filter, SortDirection};
use crate::types::TenantId;

fn repo(db: &Db, tenant_id: TenantId) -> Repository<Progress> {
    Repository::new(db, Table::UserProgress, tenant_id)
}

/// Insert a scan; `None` means the (user, station, tenant) row already existed.
pub async fn record(db: &Db, tenant_id: TenantId, row: &NewProgress) -> Result<Option<Progress>, DatabaseError> {
    repo(db, tenant_id).insert(row, OnConflict::Ignore).await
}

pub async fn list_for_user(db: &Db, tenant_id: TenantId, user_id: Uuid) -> Result<Vec<Progress>, DatabaseError> {
    repo(db, tenant_id)
        .select_any(
            Filter::new()
                .eq("user_id", user_id.to_string())
                .order_by("scanned_at", SortDirection::Asc),
        )
        .await
}
