use serde::Serialize;

use crate::database::manager::DatabaseError;
use crate::database::models::{Profile, Redemption};
use crate::database::repository::Repository;
use crate::database::store::Db;
use crate::database::table::Table;
use crate::filter::Filter;
use crate::types::{CompletionStatus, ProfileRole, TenantId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantStats {
    pub visitors: i64,
    pub completed: i64,
    pub codes_issued: i64,
    pub codes_redeemed: i64,
}

fn visitors(db: &Db, tenant_id: TenantId) -> Repository<Profile> {
    Repository::new(db, Table::Profiles, tenant_id)
}

fn redemptions(db: &Db, tenant_id: TenantId) -> Repository<Redemption> {
    Repository::new(db, Table::Redemptions, tenant_id)
}

pub async fn visitor_count(db: &Db, tenant_id: TenantId) -> Result<i64, DatabaseError> {
    visitors(db, tenant_id)
        .count(Filter::new().eq("role", ProfileRole::Visitor.as_str()))
        .await
}

pub async fn completed_count(db: &Db, tenant_id: TenantId) -> Result<i64, DatabaseError> {
    visitors(db, tenant_id)
        .count(
            Filter::new()
                .eq("role", ProfileRole::Visitor.as_str())
                .eq("completion_status", CompletionStatus::Completed.as_str()),
        )
        .await
}

pub async fn issued_count(db: &Db, tenant_id: TenantId) -> Result<i64, DatabaseError> {
    redemptions(db, tenant_id).count(Filter::new()).await
}

pub async fn redeemed_count(db: &Db, tenant_id: TenantId) -> Result<i64, DatabaseError> {
    redemptions(db, tenant_id).count(Filter::new().eq("redeemed", true)).await
}

pub async fn dashboard(db: &Db, tenant_id: TenantId) -> Result<TenantStats, DatabaseError> {
    let (visitors, completed, codes_issued, codes_redeemed) = futures::try_join!(
        visitor_count(db, tenant_id),
        completed_count(db, tenant_id),
        issued_count(db, tenant_id),
        redeemed_count(db, tenant_id),
    )?;
    Ok(TenantStats { visitors, completed, codes_issued, codes_redeemed })
}
