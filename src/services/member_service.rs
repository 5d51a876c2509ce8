//! Tenant membership management. Callers authorize first and pass an
//! elevated handle; membership rows are not writable from user sessions.

use tracing::info;
use uuid::Uuid;

use crate::database::models::Membership;
use crate::database::scoped::memberships;
use crate::database::{DatabaseError, Db};
use crate::error::ApiError;
use crate::types::{MembershipRole, TenantId};

pub async fn list_members(db: &Db, tenant_id: TenantId) -> Result<Vec<Membership>, ApiError> {
    Ok(memberships::list(db, tenant_id).await?)
}

pub async fn invite(
    db: &Db,
    tenant_id: TenantId,
    user_id: Uuid,
    role: MembershipRole,
) -> Result<Membership, ApiError> {
    match memberships::insert(db, tenant_id, user_id, role).await {
        Ok(membership) => {
            info!("Added {} as {} of tenant {}", user_id, role.as_str(), tenant_id);
            Ok(membership)
        }
        Err(DatabaseError::UniqueViolation { .. }) => Err(ApiError::conflict("User is already a member")),
        Err(e) => Err(e.into()),
    }
}

/// Remove a staff membership. Admin memberships are left to platform operators.
pub async fn revoke(db: &Db, tenant_id: TenantId, user_id: Uuid) -> Result<(), ApiError> {
    let membership = memberships::find(db, tenant_id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;
    if membership.role == MembershipRole::Admin {
        return Err(ApiError::forbidden("Admin memberships cannot be revoked here"));
    }
    memberships::delete(db, tenant_id, user_id).await?;
    info!("Revoked membership of {} in tenant {}", user_id, tenant_id);
    Ok(())
}

/// Platform assignment: creates the membership or changes its role.
pub async fn assign(
    db: &Db,
    tenant_id: TenantId,
    user_id: Uuid,
    role: MembershipRole,
) -> Result<Membership, ApiError> {
    if let Some(updated) = memberships::set_role(db, tenant_id, user_id, role).await? {
        return Ok(updated);
    }
    match memberships::insert(db, tenant_id, user_id, role).await {
        Ok(membership) => Ok(membership),
        // Inserted concurrently; apply the role to that row.
        Err(DatabaseError::UniqueViolation { .. }) => memberships::set_role(db, tenant_id, user_id, role)
            .await?
            .ok_or_else(|| ApiError::internal_server_error("Membership update failed")),
        Err(e) => Err(e.into()),
    }
}
