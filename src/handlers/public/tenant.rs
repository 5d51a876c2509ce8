// handlers/public/tenant.rs - GET /api/tenant

use serde::Serialize;

use crate::database::models::Branding;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant};

#[derive(Debug, Serialize)]
pub struct TenantView {
    pub name: String,
    pub slug: String,
    pub branding: Branding,
}

/// GET /api/tenant - name and branding of the tenant serving this host
pub async fn tenant_get(CurrentTenant(tenant): CurrentTenant) -> ApiResult<TenantView> {
    Ok(ApiResponse::success(TenantView {
        name: tenant.name,
        slug: tenant.slug,
        branding: tenant.branding,
    }))
}
