//! Caller role resolution.
//!
//! Staff and admin roles come from per-tenant membership rows. The
//! super-admin flag belongs to the user but is stored on each of the user's
//! profile rows; [`super_admin_flag`] reads all of them and treats a
//! disagreement as "not a super admin".

use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::Profile;
use crate::database::scoped::{memberships, profiles};
use crate::database::{DatabaseError, Db, Record, Table};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::types::{MembershipRole, Role, TenantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleResolution {
    Unauthenticated,
    Forbidden,
    Authorized(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    pub principal: Principal,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperAdminFlag {
    Granted,
    Absent,
    /// Profile rows disagree. Treated as absent.
    Divergent,
}

impl SuperAdminFlag {
    pub fn is_granted(&self) -> bool {
        matches!(self, SuperAdminFlag::Granted)
    }
}

pub async fn super_admin_flag(db: &Db, user_id: Uuid) -> Result<SuperAdminFlag, DatabaseError> {
    let rows = profiles::for_principal(db, user_id).await?;
    let granted = rows.iter().filter(|p| p.is_super_admin).count();

    Ok(match granted {
        0 => SuperAdminFlag::Absent,
        n if n == rows.len() => SuperAdminFlag::Granted,
        n => {
            warn!(
                "User {} has divergent super-admin flags ({} of {} profile rows set); denying",
                user_id,
                n,
                rows.len()
            );
            SuperAdminFlag::Divergent
        }
    })
}

/// Grant or revoke the flag on every profile row the user owns, keeping the
/// rows in agreement. Requires an elevated handle.
pub async fn set_super_admin(db: &Db, user_id: Uuid, granted: bool) -> Result<u64, DatabaseError> {
    let mut changes = Record::new();
    changes.insert("is_super_admin".to_string(), Value::Bool(granted));
    let rows: Vec<Profile> = db
        .update(Table::Profiles, &Filter::new().eq("user_id", user_id.to_string()), changes)
        .await?;
    Ok(rows.len() as u64)
}

/// Membership first, then the global super-admin flag. With no tenant and
/// several memberships, admin outranks staff.
pub async fn resolve_role(
    db: &Db,
    principal: Option<&Principal>,
    tenant_id: Option<TenantId>,
) -> Result<RoleResolution, DatabaseError> {
    let principal = match principal {
        Some(p) => p,
        None => return Ok(RoleResolution::Unauthenticated),
    };

    let rows = memberships::for_principal(db, principal.id, tenant_id).await?;
    if !rows.is_empty() {
        let role = if rows.iter().any(|m| m.role == MembershipRole::Admin) {
            MembershipRole::Admin
        } else {
            MembershipRole::Staff
        };
        return Ok(RoleResolution::Authorized(role.into()));
    }

    if super_admin_flag(db, principal.id).await?.is_granted() {
        return Ok(RoleResolution::Authorized(Role::SuperAdmin));
    }

    Ok(RoleResolution::Forbidden)
}

pub fn require_authenticated(principal: Option<&Principal>) -> Result<Principal, ApiError> {
    principal
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

pub async fn require_role(
    db: &Db,
    principal: Option<&Principal>,
    tenant_id: Option<TenantId>,
) -> Result<Authorized, ApiError> {
    match resolve_role(db, principal, tenant_id).await? {
        RoleResolution::Unauthenticated => Err(ApiError::unauthorized("Authentication required")),
        RoleResolution::Forbidden => Err(ApiError::forbidden("Insufficient permissions")),
        RoleResolution::Authorized(role) => {
            let principal = require_authenticated(principal)?;
            Ok(Authorized { principal, role })
        }
    }
}

/// Platform-level check, independent of any tenant.
pub async fn require_super_admin(db: &Db, principal: Option<&Principal>) -> Result<Principal, ApiError> {
    let principal = require_authenticated(principal)?;
    if super_admin_flag(db, principal.id).await?.is_granted() {
        Ok(principal)
    } else {
        Err(ApiError::forbidden("Super admin access required"))
    }
}
