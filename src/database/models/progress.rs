use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TenantId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub animal_id: Uuid,
    pub letter: String,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProgress {
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub animal_id: Uuid,
    pub letter: String,
}
