use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{Animal, NewProgress, Profile, Progress};
use crate::database::scoped::{animals, profiles, progress};
use crate::database::{DatabaseError, Db};
use crate::error::ApiError;
use crate::identity;
use crate::types::{ScanOutcome, TenantId};

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub outcome: ScanOutcome,
    pub animal: Animal,
    pub letters_found: usize,
    pub total_stations: usize,
}

/// Visitor profile for the caller in this tenant, created on first use.
/// A super admin's flag is carried onto the new row so their profile rows
/// never disagree.
pub async fn ensure_visitor_profile(
    db: &Db,
    principal: &Principal,
    tenant_id: TenantId,
) -> Result<Profile, DatabaseError> {
    if let Some(profile) = profiles::get(db, tenant_id, principal.id).await? {
        return Ok(profile);
    }
    if identity::super_admin_flag(db, principal.id).await?.is_granted() {
        profiles::ensure(&db.elevate(), tenant_id, principal.id, principal.email.clone(), true).await
    } else {
        profiles::ensure(db, tenant_id, principal.id, principal.email.clone(), false).await
    }
}

/// Record that the caller scanned a station. Repeated scans are no-ops.
pub async fn record_scan(
    db: &Db,
    principal: &Principal,
    tenant_id: TenantId,
    animal_id: Uuid,
    letter: &str,
) -> Result<ScanOutcome, DatabaseError> {
    ensure_visitor_profile(db, principal, tenant_id).await?;

    let row = NewProgress {
        user_id: principal.id,
        tenant_id,
        animal_id,
        letter: letter.to_string(),
    };
    match progress::record(db, tenant_id, &row).await? {
        Some(_) => {
            info!("User {} scanned station {} in tenant {}", principal.id, animal_id, tenant_id);
            Ok(ScanOutcome::Recorded)
        }
        None => Ok(ScanOutcome::AlreadyScanned),
    }
}

/// Resolve a QR token inside the request's tenant and record the scan.
/// Tokens from other tenants are indistinguishable from unknown tokens.
pub async fn scan_by_token(
    db: &Db,
    principal: &Principal,
    tenant_id: TenantId,
    qr_token: &str,
) -> Result<ScanResult, ApiError> {
    let animal = animals::find_by_qr_token(db, tenant_id, qr_token)
        .await?
        .ok_or_else(|| ApiError::not_found("Station not found"))?;

    let outcome = record_scan(db, principal, tenant_id, animal.id, &animal.letter).await?;
    let (found, stations) = futures::try_join!(
        progress::list_for_user(db, tenant_id, principal.id),
        animals::list_active(db, tenant_id),
    )?;

    Ok(ScanResult {
        outcome,
        animal,
        letters_found: found.len(),
        total_stations: stations.len(),
    })
}

pub async fn progress_for(db: &Db, principal: &Principal, tenant_id: TenantId) -> Result<Vec<Progress>, DatabaseError> {
    progress::list_for_user(db, tenant_id, principal.id).await
}
