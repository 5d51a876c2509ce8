#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use hunt_api::auth::issue_token;
use hunt_api::config::AppConfig;
use hunt_api::database::models::{Animal, NewAnimal, NewTenant, Tenant};
use hunt_api::database::scoped::{animals, memberships};
use hunt_api::database::{Db, MemoryStore, OnConflict, Table};
use hunt_api::identity::set_super_admin;
use hunt_api::server::{app, AppState};
use hunt_api::types::{MembershipRole, TenantId};

pub const ZOO_A: &str = "zoo-a";
pub const ZOO_B: &str = "zoo-b";

/// Router over a seeded in-memory store.
///
/// zoo-a has stations Z, O, O (puzzle "ZOO") with tokens `a-zebra`,
/// `a-otter`, `a-owl`. zoo-b has C, A, T with `b-cheetah`, `b-antelope`,
/// `b-tiger`.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
    pub zoo_a: Tenant,
    pub zoo_b: Tenant,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_config(AppConfig::development()).await
    }

    pub async fn with_config(config: AppConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let admin = Db::elevated(store.clone());

        let zoo_a = seed_tenant(&admin, "Zoo A", ZOO_A).await?;
        let zoo_b = seed_tenant(&admin, "Zoo B", ZOO_B).await?;
        for (i, (name, letter, token)) in [("Zebra", "Z", "a-zebra"), ("Otter", "O", "a-otter"), ("Owl", "O", "a-owl")]
            .into_iter()
            .enumerate()
        {
            seed_station(&admin, zoo_a.id, name, letter, i as i32, token).await?;
        }
        for (i, (name, letter, token)) in
            [("Cheetah", "C", "b-cheetah"), ("Antelope", "A", "b-antelope"), ("Tiger", "T", "b-tiger")]
                .into_iter()
                .enumerate()
        {
            seed_station(&admin, zoo_b.id, name, letter, i as i32, token).await?;
        }

        let router = app(AppState::new(store.clone(), config.clone()));
        Ok(Self { store, config, zoo_a, zoo_b, router })
    }

    pub fn admin_db(&self) -> Db {
        Db::elevated(self.store.clone())
    }

    pub fn token(&self, user_id: Uuid) -> String {
        issue_token(&self.config.security, user_id, Some(format!("{}@visitors.example", user_id.simple())))
            .expect("token")
    }

    pub async fn grant(&self, tenant: TenantId, user_id: Uuid, role: MembershipRole) -> Result<()> {
        memberships::insert(&self.admin_db(), tenant, user_id, role).await?;
        Ok(())
    }

    pub async fn make_super_admin(&self, user_id: Uuid) -> Result<()> {
        // The flag lives on profiles, so give the operator one first.
        hunt_api::database::scoped::profiles::ensure(&self.admin_db(), self.zoo_a.id, user_id, None, true).await?;
        set_super_admin(&self.admin_db(), user_id, true).await?;
        Ok(())
    }

    /// Send a request to `{tenant}.hunt.example.com`, or the bare base
    /// domain when `tenant` is `None`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        tenant: Option<&str>,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let host = match tenant {
            Some(slug) => format!("{}.{}", slug, self.config.tenancy.base_domain),
            None => self.config.tenancy.base_domain.clone(),
        };
        let mut builder = Request::builder().method(method).uri(path).header(header::HOST, host);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.raw(request).await
    }

    pub async fn raw(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, path: &str, tenant: Option<&str>, user: Option<Uuid>) -> Result<TestResponse> {
        self.send(Method::GET, path, tenant, user, None).await
    }

    pub async fn post(&self, path: &str, tenant: Option<&str>, user: Option<Uuid>, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, path, tenant, user, Some(body)).await
    }

    pub async fn count(&self, table: Table) -> usize {
        self.store.row_count(table).await
    }
}

async fn seed_tenant(admin: &Db, name: &str, slug: &str) -> Result<Tenant> {
    let row = NewTenant { name: name.to_string(), slug: slug.to_string(), is_active: true, branding: Default::default() };
    admin
        .insert::<_, Tenant>(Table::Tenants, &row, OnConflict::Error)
        .await?
        .context("tenant insert returned nothing")
}

async fn seed_station(admin: &Db, tenant_id: TenantId, name: &str, letter: &str, order: i32, token: &str) -> Result<Animal> {
    let row = NewAnimal {
        tenant_id,
        name: name.to_string(),
        letter: letter.to_string(),
        order_index: order,
        qr_token: token.to_string(),
        is_active: true,
    };
    Ok(animals::create(admin, tenant_id, &row).await?)
}
