use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RedemptionConfig;
use crate::database::models::Redemption;
use crate::database::scoped::redemptions;
use crate::database::table::{REDEMPTIONS_TENANT_CODE_KEY, REDEMPTIONS_USER_TENANT_KEY};
use crate::database::{DatabaseError, Db};
use crate::error::ApiError;
use crate::redemption::{code, is_valid_code, normalize_code};
use crate::types::TenantId;

/// Issue the caller's redemption code for a tenant, at most once.
///
/// An existing row wins. A concurrent issuer that inserts first is detected
/// through the (user, tenant) unique key and its code is returned. A clash on
/// (tenant, code) draws a new code, up to `max_issue_attempts` times.
/// `db` must be elevated.
pub async fn issue_code(
    db: &Db,
    tenant_id: TenantId,
    user_id: Uuid,
    config: &RedemptionConfig,
) -> Result<Redemption, DatabaseError> {
    issue_code_with(db, tenant_id, user_id, config, &mut OsRng).await
}

pub async fn issue_code_with<R: RngCore + Send>(
    db: &Db,
    tenant_id: TenantId,
    user_id: Uuid,
    config: &RedemptionConfig,
    rng: &mut R,
) -> Result<Redemption, DatabaseError> {
    for attempt in 1..=config.max_issue_attempts.max(1) {
        if let Some(existing) = redemptions::find_by_user(db, tenant_id, user_id).await? {
            return Ok(existing);
        }

        let candidate = code::generate_code_with(rng);
        match redemptions::insert(db, tenant_id, user_id, &candidate).await {
            Ok(row) => {
                info!("Issued redemption code for user {} in tenant {}", user_id, tenant_id);
                return Ok(row);
            }
            Err(DatabaseError::UniqueViolation { constraint }) if constraint == REDEMPTIONS_USER_TENANT_KEY => {
                debug!("Concurrent issuance for user {}; re-reading", user_id);
                if let Some(existing) = redemptions::find_by_user(db, tenant_id, user_id).await? {
                    return Ok(existing);
                }
            }
            Err(DatabaseError::UniqueViolation { constraint }) if constraint == REDEMPTIONS_TENANT_CODE_KEY => {
                debug!("Redemption code collision on attempt {}", attempt);
            }
            Err(e) => return Err(e),
        }
    }

    warn!("Gave up issuing a redemption code for user {} in tenant {}", user_id, tenant_id);
    Err(DatabaseError::QueryError("could not issue a unique redemption code".to_string()))
}

/// Look up a typed code. Malformed input is treated as unknown.
pub async fn verify(db: &Db, tenant_id: TenantId, input: &str) -> Result<Option<Redemption>, DatabaseError> {
    let code = normalize_code(input);
    if !is_valid_code(&code) {
        return Ok(None);
    }
    redemptions::find_by_code(db, tenant_id, &code).await
}

/// Mark a code redeemed. A second redeem is reported as a conflict.
pub async fn redeem(db: &Db, tenant_id: TenantId, input: &str) -> Result<Redemption, ApiError> {
    let found = verify(db, tenant_id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Code not found"))?;
    if found.redeemed {
        return Err(ApiError::conflict("Code already redeemed"));
    }
    redemptions::mark_redeemed(db, tenant_id, found.id)
        .await?
        .ok_or_else(|| ApiError::conflict("Code already redeemed"))
}
