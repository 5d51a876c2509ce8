use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TenantId;

/// A scannable station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub name: String,
    pub letter: String,
    pub order_index: i32,
    pub qr_token: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnimal {
    pub tenant_id: TenantId,
    pub name: String,
    pub letter: String,
    pub order_index: i32,
    pub qr_token: String,
    pub is_active: bool,
}

/// Partial station update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimalChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
