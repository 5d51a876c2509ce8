mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::{TestApp, ZOO_A, ZOO_B};
use hunt_api::database::models::{NewProgress, Progress, Redemption};
use hunt_api::database::{DatabaseError, Db, OnConflict, Repository, Table};
use hunt_api::filter::Filter;
use hunt_api::types::MembershipRole;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn user_session_without_filters_sees_only_own_rows() -> Result<()> {
    let app = TestApp::new().await?;
    let me = Uuid::new_v4();
    let someone = Uuid::new_v4();
    for (user, tenant, token) in [(me, ZOO_A, "a-zebra"), (someone, ZOO_A, "a-otter"), (me, ZOO_B, "b-tiger")] {
        app.post(&format!("/api/scan/{}", token), Some(tenant), Some(user), json!({})).await?;
    }
    app.post("/api/puzzle", Some(ZOO_A), Some(someone), json!({ "answer": "zoo" })).await?;

    let mine = Db::for_user(app.store.clone(), me);
    let progress: Vec<Progress> = mine.select(Table::UserProgress, &Filter::new()).await?;
    assert_eq!(progress.len(), 2);
    assert!(progress.iter().all(|p| p.user_id == me));

    let codes: Vec<Redemption> = mine.select(Table::Redemptions, &Filter::new()).await?;
    assert!(codes.is_empty());

    let anonymous = Db::anonymous(app.store.clone());
    assert_eq!(anonymous.count(Table::Profiles, &Filter::new()).await?, 0);
    assert_eq!(anonymous.count(Table::Memberships, &Filter::new()).await?, 0);
    Ok(())
}

#[tokio::test]
async fn user_session_cannot_write_protected_tables() -> Result<()> {
    let app = TestApp::new().await?;
    let me = Uuid::new_v4();
    let mine = Db::for_user(app.store.clone(), me);

    let err = hunt_api::database::scoped::memberships::insert(&mine, app.zoo_a.id, me, MembershipRole::Admin).await;
    assert!(matches!(err, Err(DatabaseError::PolicyViolation { .. })));

    let err = hunt_api::database::scoped::redemptions::insert(&mine, app.zoo_a.id, me, "ABCDEFGH").await;
    assert!(matches!(err, Err(DatabaseError::PolicyViolation { .. })));

    let err = hunt_api::database::scoped::profiles::ensure(&mine, app.zoo_a.id, me, None, true).await;
    assert!(matches!(err, Err(DatabaseError::PolicyViolation { .. })));
    Ok(())
}

#[tokio::test]
async fn repository_refuses_rows_for_another_tenant() -> Result<()> {
    let app = TestApp::new().await?;
    let repo: Repository<Progress> = Repository::new(&app.admin_db(), Table::UserProgress, app.zoo_a.id);
    let station = hunt_api::database::scoped::animals::find_by_qr_token(&app.admin_db(), app.zoo_b.id, "b-tiger")
        .await?
        .expect("station");

    let row = NewProgress { user_id: Uuid::new_v4(), tenant_id: app.zoo_b.id, animal_id: station.id, letter: "T".to_string() };
    let err = repo.insert(&row, OnConflict::Error).await;
    assert!(matches!(err, Err(DatabaseError::TenantMismatch)));
    assert_eq!(app.count(Table::UserProgress).await, 0);
    Ok(())
}

#[tokio::test]
async fn tenant_admin_cannot_reach_another_tenants_rows() -> Result<()> {
    let app = TestApp::new().await?;
    let admin_a = Uuid::new_v4();
    app.grant(app.zoo_a.id, admin_a, MembershipRole::Admin).await?;
    let tiger = hunt_api::database::scoped::animals::find_by_qr_token(&app.admin_db(), app.zoo_b.id, "b-tiger")
        .await?
        .expect("station");

    // Addressing a zoo-b station through zoo-a finds nothing.
    let path = format!("/api/admin/animals/{}", tiger.id);
    let res = app.send(Method::PATCH, &path, Some(ZOO_A), Some(admin_a), Some(json!({ "name": "Mine now" }))).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app.send(Method::DELETE, &path, Some(ZOO_A), Some(admin_a), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    // And zoo-b itself is off limits.
    assert_eq!(app.get("/api/admin/animals", Some(ZOO_B), Some(admin_a)).await?.status, StatusCode::FORBIDDEN);

    let still_there = hunt_api::database::scoped::animals::find_by_id(&app.admin_db(), app.zoo_b.id, tiger.id).await?;
    assert_eq!(still_there.map(|a| a.name), Some("Tiger".to_string()));
    Ok(())
}
