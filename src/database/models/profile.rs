use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{CompletionStatus, ProfileRole, TenantId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: ProfileRole,
    pub completion_status: CompletionStatus,
    pub is_super_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New visitor profile. Role and completion status are left to column
/// defaults; `is_super_admin` is only ever true when copied from the user's
/// existing rows by an elevated caller.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub is_super_admin: bool,
}
