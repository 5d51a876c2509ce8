use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{MembershipRole, TenantId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMembership {
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub role: MembershipRole,
}
