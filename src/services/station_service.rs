use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Animal, AnimalChanges, NewAnimal};
use crate::database::scoped::animals;
use crate::database::table::ANIMALS_QR_TOKEN_KEY;
use crate::database::{DatabaseError, Db};
use crate::error::ApiError;
use crate::types::TenantId;

/// What visitors may see of a station before scanning it.
#[derive(Debug, Clone, Serialize)]
pub struct StationSummary {
    pub id: Uuid,
    pub name: String,
    pub order_index: i32,
}

impl From<Animal> for StationSummary {
    fn from(animal: Animal) -> Self {
        Self { id: animal.id, name: animal.name, order_index: animal.order_index }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationInput {
    pub name: String,
    pub letter: String,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default)]
    pub qr_token: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn normalize_letter(letter: &str) -> Option<String> {
    let mut chars = letter.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase().to_string()),
        _ => None,
    }
}

fn is_valid_qr_token(token: &str) -> bool {
    !token.is_empty() && token.len() <= 64 && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn generate_qr_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn check(errors: HashMap<String, String>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid station", Some(errors)))
    }
}

/// QR tokens are unique across all tenants. A clash is reported as a plain
/// field error so a tenant cannot tell whether another tenant uses the token.
fn token_taken(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::UniqueViolation { constraint } if constraint == ANIMALS_QR_TOKEN_KEY => {
            let mut errors = HashMap::new();
            errors.insert("qr_token".to_string(), "is not available".to_string());
            ApiError::validation_error("Invalid station", Some(errors))
        }
        other => other.into(),
    }
}

pub async fn public_listing(db: &Db, tenant_id: TenantId) -> Result<Vec<StationSummary>, ApiError> {
    let stations = animals::list_active(db, tenant_id).await?;
    Ok(stations.into_iter().map(StationSummary::from).collect())
}

pub async fn create_station(db: &Db, tenant_id: TenantId, input: StationInput) -> Result<Animal, ApiError> {
    let mut errors = HashMap::new();
    if input.name.trim().is_empty() {
        errors.insert("name".to_string(), "is required".to_string());
    }
    let letter = normalize_letter(&input.letter);
    if letter.is_none() {
        errors.insert("letter".to_string(), "must be a single letter".to_string());
    }
    let qr_token = input.qr_token.unwrap_or_else(generate_qr_token);
    if !is_valid_qr_token(&qr_token) {
        errors.insert("qr_token".to_string(), "must be 1-64 letters, digits, '-' or '_'".to_string());
    }
    check(errors)?;

    let row = NewAnimal {
        tenant_id,
        name: input.name.trim().to_string(),
        letter: letter.unwrap_or_default(),
        order_index: input.order_index.unwrap_or(0),
        qr_token,
        is_active: input.is_active.unwrap_or(true),
    };
    animals::create(db, tenant_id, &row).await.map_err(token_taken)
}

pub async fn update_station(
    db: &Db,
    tenant_id: TenantId,
    id: Uuid,
    mut changes: AnimalChanges,
) -> Result<Animal, ApiError> {
    let mut errors = HashMap::new();
    if let Some(letter) = changes.letter.take() {
        match normalize_letter(&letter) {
            Some(l) => changes.letter = Some(l),
            None => {
                errors.insert("letter".to_string(), "must be a single letter".to_string());
            }
        }
    }
    if matches!(&changes.name, Some(name) if name.trim().is_empty()) {
        errors.insert("name".to_string(), "is required".to_string());
    }
    if matches!(&changes.qr_token, Some(token) if !is_valid_qr_token(token)) {
        errors.insert("qr_token".to_string(), "must be 1-64 letters, digits, '-' or '_'".to_string());
    }
    check(errors)?;

    animals::update(db, tenant_id, id, &changes)
        .await
        .map_err(token_taken)?
        .ok_or_else(|| ApiError::not_found("Station not found"))
}

pub async fn delete_station(db: &Db, tenant_id: TenantId, id: Uuid) -> Result<(), ApiError> {
    if animals::delete(db, tenant_id, id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("Station not found"))
    }
}
