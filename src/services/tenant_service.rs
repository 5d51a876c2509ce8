use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::models::{Branding, NewTenant, Tenant};
use crate::database::table::TENANTS_SLUG_KEY;
use crate::database::{Access, DatabaseError, Db, OnConflict, Table};
use crate::error::ApiError;
use crate::filter::{Filter, SortDirection};
use crate::tenancy::is_valid_slug;
use crate::types::TenantId;

#[derive(Debug, thiserror::Error)]
pub enum TenantServiceError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Tenant already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid tenant")]
    Invalid(HashMap<String, String>),
    #[error("Tenant not found")]
    NotFound,
    #[error("Tenant service requires an elevated handle")]
    NotElevated,
}

impl From<TenantServiceError> for ApiError {
    fn from(err: TenantServiceError) -> Self {
        match err {
            TenantServiceError::Database(e) => e.into(),
            TenantServiceError::AlreadyExists(_) => ApiError::conflict("A tenant with this slug already exists"),
            TenantServiceError::Invalid(fields) => ApiError::validation_error("Invalid tenant", Some(fields)),
            TenantServiceError::NotFound => ApiError::not_found("Tenant not found"),
            TenantServiceError::NotElevated => {
                tracing::error!("Tenant service built from a non-elevated handle");
                ApiError::forbidden("Insufficient permissions")
            }
        }
    }
}

/// Partial tenant update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Platform-level tenant lifecycle. Only accepts a handle that is already
/// elevated; callers elevate after `require_super_admin` (or are the
/// operator CLI).
pub struct TenantService {
    db: Db,
}

impl TenantService {
    pub fn new(db: &Db) -> Result<Self, TenantServiceError> {
        match db.access() {
            Access::Elevated => Ok(Self { db: db.clone() }),
            _ => Err(TenantServiceError::NotElevated),
        }
    }

    /// All tenants, suspended ones included
    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, TenantServiceError> {
        let filter = Filter::new().order_by("slug", SortDirection::Asc);
        Ok(self.db.select(Table::Tenants, &filter).await?)
    }

    pub async fn get_tenant(&self, id: TenantId) -> Result<Tenant, TenantServiceError> {
        self.db
            .select_optional(Table::Tenants, &Filter::new().eq("id", id.to_string()))
            .await?
            .ok_or(TenantServiceError::NotFound)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Tenant, TenantServiceError> {
        self.db
            .select_optional(Table::Tenants, &Filter::new().eq("slug", slug))
            .await?
            .ok_or(TenantServiceError::NotFound)
    }

    /// Create a tenant after validating name, slug and branding
    pub async fn create_tenant(
        &self,
        name: &str,
        slug: &str,
        branding: Option<Branding>,
    ) -> Result<Tenant, TenantServiceError> {
        let slug = slug.trim().to_ascii_lowercase();
        let branding = branding.unwrap_or_default();

        let mut errors = branding.validate();
        if let Err(message) = self.validate_tenant_name(name) {
            errors.insert("name".to_string(), message);
        }
        if !is_valid_slug(&slug) {
            errors.insert(
                "slug".to_string(),
                "must be 1-63 lowercase letters, digits or hyphens, not starting or ending with a hyphen".to_string(),
            );
        }
        if !errors.is_empty() {
            return Err(TenantServiceError::Invalid(errors));
        }

        let row = NewTenant { name: name.trim().to_string(), slug: slug.clone(), is_active: true, branding };
        match self.db.insert::<_, Tenant>(Table::Tenants, &row, OnConflict::Error).await {
            Ok(Some(tenant)) => {
                info!("Created tenant '{}' ({})", tenant.slug, tenant.id);
                Ok(tenant)
            }
            Ok(None) => Err(DatabaseError::QueryError("insert returned no row".to_string()).into()),
            Err(DatabaseError::UniqueViolation { constraint }) if constraint == TENANTS_SLUG_KEY => {
                Err(TenantServiceError::AlreadyExists(slug))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_tenant(&self, id: TenantId, changes: TenantChanges) -> Result<Tenant, TenantServiceError> {
        let mut errors = HashMap::new();
        if let Some(branding) = &changes.branding {
            errors.extend(branding.validate());
        }
        if let Some(name) = &changes.name {
            if let Err(message) = self.validate_tenant_name(name) {
                errors.insert("name".to_string(), message);
            }
        }
        if !errors.is_empty() {
            return Err(TenantServiceError::Invalid(errors));
        }

        let record = crate::database::store::to_record(&changes)?;
        if record.is_empty() {
            return self.get_tenant(id).await;
        }
        let rows: Vec<Tenant> = self
            .db
            .update(Table::Tenants, &Filter::new().eq("id", id.to_string()), record)
            .await?;
        let tenant = rows.into_iter().next().ok_or(TenantServiceError::NotFound)?;
        info!("Updated tenant '{}'", tenant.slug);
        Ok(tenant)
    }

    /// Suspend (`false`) or restore (`true`) a tenant
    pub async fn set_active(&self, id: TenantId, active: bool) -> Result<Tenant, TenantServiceError> {
        self.update_tenant(id, TenantChanges { is_active: Some(active), ..TenantChanges::default() })
            .await
    }

    /// Delete a tenant and every row scoped to it
    pub async fn delete_tenant(&self, id: TenantId) -> Result<(), TenantServiceError> {
        let tenant = self.get_tenant(id).await?;
        for table in Table::ALL.iter().filter(|t| t.is_tenant_scoped()) {
            self.db.delete(*table, &Filter::for_tenant(id)).await?;
        }
        self.db.delete(Table::Tenants, &Filter::new().eq("id", id.to_string())).await?;
        info!("Deleted tenant '{}' ({})", tenant.slug, tenant.id);
        Ok(())
    }

    fn validate_tenant_name(&self, name: &str) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Tenant name is required".to_string());
        }
        if name.chars().count() > 100 {
            return Err("Tenant name must be at most 100 characters".to_string());
        }
        Ok(())
    }
}
