use crate::auth::Principal;
use crate::database::Db;
use crate::error::ApiError;
use crate::identity::require_super_admin;
use crate::server::AppState;
use crate::tenancy::RequestScope;

pub mod members;
pub mod tenants;

pub use members::member_assign;
pub use tenants::{tenant_create, tenant_delete, tenant_list, tenant_update};

pub(crate) async fn authorize(state: &AppState, scope: &RequestScope) -> Result<(Principal, Db), ApiError> {
    let db = scope.db(state.store.clone());
    let principal = require_super_admin(&db, scope.principal()).await?;
    Ok((principal, db.elevate()))
}
