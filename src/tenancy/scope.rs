use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::Principal;
use crate::database::models::Tenant;
use crate::database::{Db, Store};

/// State that lives for exactly one inbound request.
///
/// Created by the request-scope middleware and dropped with the request, so
/// tenant lookups memoized here are never shared between requests.
#[derive(Debug, Default)]
pub struct RequestScope {
    principal: Option<Principal>,
    pub(super) tenants: Mutex<HashMap<String, Option<Tenant>>>,
}

impl RequestScope {
    pub fn new(principal: Option<Principal>) -> Self {
        Self {
            principal,
            tenants: Mutex::new(HashMap::new()),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Store handle running under this request's identity.
    pub fn db(&self, store: Arc<dyn Store>) -> Db {
        match &self.principal {
            Some(principal) => Db::for_user(store, principal.id),
            None => Db::anonymous(store),
        }
    }
}
