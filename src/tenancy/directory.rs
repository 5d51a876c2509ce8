use thiserror::Error;
use tracing::debug;

use crate::config::TenancyConfig;
use crate::database::models::Tenant;
use crate::database::{DatabaseError, Db, Table};
use crate::filter::Filter;

use super::resolver::{is_valid_slug, resolve};
use super::scope::RequestScope;

#[derive(Debug, Error)]
pub enum TenantError {
    #[error("tenant not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Active tenant for `slug`, memoized in the request scope. Inactive,
/// unknown and malformed slugs all resolve to `None`.
pub async fn get_tenant(db: &Db, scope: &RequestScope, slug: &str) -> Result<Option<Tenant>, TenantError> {
    if !is_valid_slug(slug) {
        return Ok(None);
    }

    let mut cache = scope.tenants.lock().await;
    if let Some(hit) = cache.get(slug) {
        return Ok(hit.clone());
    }

    debug!("Fetching tenant '{}'", slug);
    let filter = Filter::new().eq("slug", slug).eq("is_active", true);
    let tenant: Option<Tenant> = db.select_optional(Table::Tenants, &filter).await?;
    cache.insert(slug.to_string(), tenant.clone());
    Ok(tenant)
}

pub async fn get_tenant_or_fail(db: &Db, scope: &RequestScope, slug: &str) -> Result<Tenant, TenantError> {
    get_tenant(db, scope, slug).await?.ok_or(TenantError::NotFound)
}

/// Resolve the slug from host / override header / override query and look
/// the tenant up. `None` never falls back to a default tenant.
pub async fn resolve_tenant_from_request(
    db: &Db,
    scope: &RequestScope,
    config: &TenancyConfig,
    host: Option<&str>,
    header_override: Option<&str>,
    query_override: Option<&str>,
) -> Result<Option<Tenant>, TenantError> {
    match resolve(config, host, header_override, query_override) {
        Some(slug) => get_tenant(db, scope, &slug).await,
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewTenant;
    use crate::database::{MemoryStore, OnConflict, Store};
    use std::sync::Arc;

    async fn seed(store: &Arc<MemoryStore>, slug: &str, is_active: bool) {
        let db = Db::elevated(store.clone());
        let row = NewTenant {
            name: slug.to_string(),
            slug: slug.to_string(),
            is_active,
            branding: Default::default(),
        };
        db.insert::<_, Tenant>(Table::Tenants, &row, OnConflict::Error).await.unwrap();
    }

    #[tokio::test]
    async fn lookups_are_memoized_per_scope() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "zoo", true).await;
        let db = Db::anonymous(store.clone() as Arc<dyn Store>);

        let scope = RequestScope::anonymous();
        assert!(get_tenant(&db, &scope, "zoo").await.unwrap().is_some());
        assert!(get_tenant(&db, &scope, "zoo").await.unwrap().is_some());
        assert_eq!(store.select_calls(Table::Tenants).await, 1);

        let next_request = RequestScope::anonymous();
        get_tenant(&db, &next_request, "zoo").await.unwrap();
        assert_eq!(store.select_calls(Table::Tenants).await, 2);
    }

    #[tokio::test]
    async fn suspended_and_malformed_slugs_are_not_found() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "closed", false).await;
        let db = Db::anonymous(store.clone() as Arc<dyn Store>);
        let scope = RequestScope::anonymous();

        assert!(matches!(get_tenant_or_fail(&db, &scope, "closed").await, Err(TenantError::NotFound)));
        assert!(get_tenant(&db, &scope, "Bad Slug").await.unwrap().is_none());
        assert_eq!(store.select_calls(Table::Tenants).await, 1);
    }
}
