mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::{TestApp, ZOO_A, ZOO_B};
use hunt_api::types::MembershipRole;
use serde_json::json;
use uuid::Uuid;

async fn solved(app: &TestApp, tenant: &str, answer: &str) -> Result<(Uuid, String)> {
    let visitor = Uuid::new_v4();
    let res = app.post("/api/puzzle", Some(tenant), Some(visitor), json!({ "answer": answer })).await?;
    let code = res.data()["redemption_code"].as_str().unwrap_or_default().to_string();
    Ok((visitor, code))
}

#[tokio::test]
async fn redemption_desk_verifies_and_redeems_once() -> Result<()> {
    let app = TestApp::new().await?;
    let staff = Uuid::new_v4();
    app.grant(app.zoo_a.id, staff, MembershipRole::Staff).await?;
    let (_, code) = solved(&app, ZOO_A, "zoo").await?;

    let typed = format!("{}-{}", &code[..4], &code[4..]).to_lowercase();
    let res = app.post("/api/admin/redemptions/verify", Some(ZOO_A), Some(staff), json!({ "code": typed })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["valid"], true);
    assert_eq!(res.data()["redeemed"], false);

    let res = app.post("/api/admin/redemptions/redeem", Some(ZOO_A), Some(staff), json!({ "code": code })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["redeemed"], true);

    let res = app.post("/api/admin/redemptions/redeem", Some(ZOO_A), Some(staff), json!({ "code": code })).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = app.post("/api/admin/redemptions/verify", Some(ZOO_A), Some(staff), json!({ "code": code })).await?;
    assert_eq!(res.data()["redeemed"], true);
    Ok(())
}

#[tokio::test]
async fn codes_do_not_cross_tenants() -> Result<()> {
    let app = TestApp::new().await?;
    let staff_b = Uuid::new_v4();
    app.grant(app.zoo_b.id, staff_b, MembershipRole::Staff).await?;
    let (_, code) = solved(&app, ZOO_A, "zoo").await?;

    let res = app.post("/api/admin/redemptions/verify", Some(ZOO_B), Some(staff_b), json!({ "code": code })).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app.post("/api/admin/redemptions/redeem", Some(ZOO_B), Some(staff_b), json!({ "code": code })).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn visitor_search_is_sanitized() -> Result<()> {
    let app = TestApp::new().await?;
    let staff = Uuid::new_v4();
    app.grant(app.zoo_a.id, staff, MembershipRole::Staff).await?;
    let (visitor, _) = solved(&app, ZOO_A, "zoo").await?;
    solved(&app, ZOO_B, "cat").await?;

    let res = app.get("/api/admin/visitors", Some(ZOO_A), Some(staff)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data().as_array().map(|a| a.len()), Some(1));

    let fragment = &visitor.simple().to_string()[..12];
    let res = app.get(&format!("/api/admin/visitors?search={}", fragment), Some(ZOO_A), Some(staff)).await?;
    assert_eq!(res.data()[0]["user_id"], visitor.to_string());

    let injected = "test%29%2Cfull_name.eq.admin";
    let res = app.get(&format!("/api/admin/visitors?search={}", injected), Some(ZOO_A), Some(staff)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data().as_array().map(|a| a.len()), Some(0));
    Ok(())
}

#[tokio::test]
async fn stats_count_this_tenant_only() -> Result<()> {
    let app = TestApp::new().await?;
    let admin = Uuid::new_v4();
    app.grant(app.zoo_a.id, admin, MembershipRole::Admin).await?;
    let (_, code) = solved(&app, ZOO_A, "zoo").await?;
    app.post("/api/scan/a-zebra", Some(ZOO_A), Some(Uuid::new_v4()), json!({})).await?;
    solved(&app, ZOO_B, "cat").await?;
    app.post("/api/admin/redemptions/redeem", Some(ZOO_A), Some(admin), json!({ "code": code })).await?;

    let res = app.get("/api/admin/stats", Some(ZOO_A), Some(admin)).await?;
    assert_eq!(res.data(), &json!({ "visitors": 2, "completed": 1, "codes_issued": 1, "codes_redeemed": 1 }));
    Ok(())
}

#[tokio::test]
async fn stations_are_managed_per_tenant() -> Result<()> {
    let app = TestApp::new().await?;
    let staff = Uuid::new_v4();
    app.grant(app.zoo_a.id, staff, MembershipRole::Staff).await?;

    let res = app
        .post("/api/admin/animals", Some(ZOO_A), Some(staff), json!({ "name": "Koala", "letter": "k", "order_index": 3 }))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.data()["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(res.data()["letter"], "K");

    let bad = app.post("/api/admin/animals", Some(ZOO_A), Some(staff), json!({ "name": "", "letter": "kk" })).await?;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert!(bad.body["field_errors"]["letter"].is_string());

    let res = app.post("/api/puzzle", Some(ZOO_A), Some(Uuid::new_v4()), json!({ "answer": "zook" })).await?;
    assert_eq!(res.data()["correct"], true);

    let res = app.get("/api/admin/animals", Some(ZOO_A), Some(staff)).await?;
    assert_eq!(res.data().as_array().map(|a| a.len()), Some(4));

    let path = format!("/api/admin/animals/{}", id);
    let res = app.send(Method::PATCH, &path, Some(ZOO_A), Some(staff), Some(json!({ "is_active": false }))).await?;
    assert_eq!(res.data()["is_active"], false);

    let res = app.send(Method::DELETE, &path, Some(ZOO_A), Some(staff), None).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let res = app.send(Method::DELETE, &path, Some(ZOO_A), Some(staff), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admins_invite_and_revoke_staff() -> Result<()> {
    let app = TestApp::new().await?;
    let admin = Uuid::new_v4();
    let other_admin = Uuid::new_v4();
    let newcomer = Uuid::new_v4();
    app.grant(app.zoo_a.id, admin, MembershipRole::Admin).await?;
    app.grant(app.zoo_a.id, other_admin, MembershipRole::Admin).await?;

    let invite = json!({ "user_id": newcomer, "role": "staff" });
    let res = app.post("/api/admin/members", Some(ZOO_A), Some(admin), invite.clone()).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let res = app.post("/api/admin/members", Some(ZOO_A), Some(admin), invite).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    assert_eq!(app.get("/api/admin/stats", Some(ZOO_A), Some(newcomer)).await?.status, StatusCode::OK);

    let path = format!("/api/admin/members/{}", other_admin);
    let res = app.send(Method::DELETE, &path, Some(ZOO_A), Some(admin), None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let path = format!("/api/admin/members/{}", newcomer);
    let res = app.send(Method::DELETE, &path, Some(ZOO_A), Some(admin), None).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/api/admin/stats", Some(ZOO_A), Some(newcomer)).await?.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn platform_tenant_lifecycle() -> Result<()> {
    let app = TestApp::new().await?;
    let operator = Uuid::new_v4();
    app.make_super_admin(operator).await?;

    let invalid = json!({ "name": "Aquarium", "slug": "-aqua", "branding": {
        "primary_color": "blue", "secondary_color": "#fff", "accent_color": "#000",
        "background_color": "#fff", "text_color": "#000", "muted_color": "#999" } });
    let res = app.post("/api/platform/tenants", None, Some(operator), invalid).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["slug"].is_string());
    assert!(res.body["field_errors"]["branding.primary_color"].is_string());

    let res = app.post("/api/platform/tenants", None, Some(operator), json!({ "name": "Aquarium", "slug": "aqua" })).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.data()["id"].as_str().unwrap_or_default().to_string();

    let res = app.post("/api/platform/tenants", None, Some(operator), json!({ "name": "Again", "slug": ZOO_A })).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    assert_eq!(app.get("/api/tenant", Some("aqua"), None).await?.status, StatusCode::OK);

    let path = format!("/api/platform/tenants/{}", id);
    let res = app.send(Method::PATCH, &path, None, Some(operator), Some(json!({ "is_active": false }))).await?;
    assert_eq!(res.data()["is_active"], false);
    assert_eq!(app.get("/api/tenant", Some("aqua"), None).await?.status, StatusCode::NOT_FOUND);

    let res = app.send(Method::DELETE, &path, None, Some(operator), None).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let res = app.send(Method::DELETE, &path, None, Some(operator), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
