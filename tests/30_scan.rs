mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, ZOO_A, ZOO_B};
use hunt_api::config::AppConfig;
use hunt_api::database::models::{AnimalChanges, Profile};
use hunt_api::database::scoped::{animals, profiles};
use hunt_api::database::{Db, Table};
use hunt_api::filter::Filter;
use hunt_api::identity::{super_admin_flag, SuperAdminFlag};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn scanning_is_idempotent() -> Result<()> {
    let app = TestApp::new().await?;
    let visitor = Uuid::new_v4();

    let res = app.post("/api/scan/a-zebra", Some(ZOO_A), Some(visitor), json!({})).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["outcome"], "recorded");
    assert_eq!(res.data()["animal"]["letter"], "Z");
    assert_eq!(res.data()["letters_found"], 1);
    assert_eq!(res.data()["total_stations"], 3);

    let res = app.post("/api/scan/a-zebra", Some(ZOO_A), Some(visitor), json!({})).await?;
    assert_eq!(res.data()["outcome"], "already_scanned");
    assert_eq!(res.data()["letters_found"], 1);
    assert_eq!(app.count(Table::UserProgress).await, 1);
    Ok(())
}

#[tokio::test]
async fn first_scan_creates_a_visitor_profile() -> Result<()> {
    let app = TestApp::new().await?;
    let visitor = Uuid::new_v4();
    app.post("/api/scan/a-otter", Some(ZOO_A), Some(visitor), json!({})).await?;

    let profile = profiles::get(&app.admin_db(), app.zoo_a.id, visitor).await?.expect("profile");
    assert!(!profile.is_super_admin);
    assert!(profile.email.is_some());
    assert!(profiles::get(&app.admin_db(), app.zoo_b.id, visitor).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn cross_tenant_token_is_station_not_found() -> Result<()> {
    let app = TestApp::new().await?;
    let visitor = Uuid::new_v4();

    let res = app.post("/api/scan/b-tiger", Some(ZOO_A), Some(visitor), json!({})).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Station not found");
    assert_eq!(app.count(Table::UserProgress).await, 0);
    Ok(())
}

#[tokio::test]
async fn inactive_station_cannot_be_scanned() -> Result<()> {
    let app = TestApp::new().await?;
    let owl = animals::find_by_qr_token(&app.admin_db(), app.zoo_a.id, "a-owl").await?.expect("owl");
    let changes = AnimalChanges { is_active: Some(false), ..AnimalChanges::default() };
    animals::update(&app.admin_db(), app.zoo_a.id, owl.id, &changes).await?;

    let res = app.post("/api/scan/a-owl", Some(ZOO_A), Some(Uuid::new_v4()), json!({})).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn scanning_requires_a_token() -> Result<()> {
    let app = TestApp::new().await?;
    let res = app.post("/api/scan/a-zebra", Some(ZOO_A), None, json!({})).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.count(Table::UserProgress).await, 0);
    Ok(())
}

#[tokio::test]
async fn super_admin_scanning_a_new_tenant_keeps_the_flag_consistent() -> Result<()> {
    let app = TestApp::new().await?;
    let operator = Uuid::new_v4();
    app.make_super_admin(operator).await?;

    let res = app.post("/api/scan/b-cheetah", Some(ZOO_B), Some(operator), json!({})).await?;
    assert_eq!(res.status, StatusCode::OK);

    let rows: Vec<Profile> = app
        .admin_db()
        .select(Table::Profiles, &Filter::new().eq("user_id", operator.to_string()))
        .await?;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|p| p.is_super_admin));

    let own = Db::for_user(app.store.clone(), operator);
    assert_eq!(super_admin_flag(&own, operator).await?, SuperAdminFlag::Granted);
    Ok(())
}

#[tokio::test]
async fn progress_lists_only_this_tenant() -> Result<()> {
    let app = TestApp::new().await?;
    let visitor = Uuid::new_v4();
    app.post("/api/scan/a-zebra", Some(ZOO_A), Some(visitor), json!({})).await?;
    app.post("/api/scan/b-tiger", Some(ZOO_B), Some(visitor), json!({})).await?;

    let res = app.get("/api/progress", Some(ZOO_A), Some(visitor)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let scans = res.data()["scans"].as_array().cloned().unwrap_or_default();
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0]["letter"], "Z");
    assert_eq!(res.data()["completion_status"], "in_progress");
    assert!(res.data().get("redemption_code").is_none());
    Ok(())
}

#[tokio::test]
async fn scans_are_rate_limited_per_caller() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.enable_rate_limiting = true;
    config.api.rate_limit_requests = 2;
    let app = TestApp::with_config(config).await?;
    let visitor = Uuid::new_v4();

    for token in ["a-zebra", "a-otter"] {
        let res = app.post(&format!("/api/scan/{}", token), Some(ZOO_A), Some(visitor), json!({})).await?;
        assert_eq!(res.status, StatusCode::OK);
    }
    let res = app.post("/api/scan/a-owl", Some(ZOO_A), Some(visitor), json!({})).await?;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.body["code"], "TOO_MANY_REQUESTS");

    let other = app.post("/api/scan/a-owl", Some(ZOO_A), Some(Uuid::new_v4()), json!({})).await?;
    assert_eq!(other.status, StatusCode::OK);
    Ok(())
}
