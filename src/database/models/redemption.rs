use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TenantId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub redemption_code: String,
    pub redeemed: bool,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRedemption {
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub redemption_code: String,
}
