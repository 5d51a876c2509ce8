mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, ZOO_A, ZOO_B};
use hunt_api::database::scoped::profiles;
use hunt_api::database::Table;
use hunt_api::redemption::is_valid_code;
use hunt_api::types::CompletionStatus;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn wrong_answer_issues_nothing() -> Result<()> {
    let app = TestApp::new().await?;
    let visitor = Uuid::new_v4();

    for answer in ["zebra", "CAT", ""] {
        let res = app.post("/api/puzzle", Some(ZOO_A), Some(visitor), json!({ "answer": answer })).await?;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.data()["correct"], false);
        assert!(res.data().get("redemption_code").is_none());
    }
    assert_eq!(app.count(Table::Redemptions).await, 0);
    Ok(())
}

#[tokio::test]
async fn correct_answer_issues_one_code() -> Result<()> {
    let app = TestApp::new().await?;
    let visitor = Uuid::new_v4();

    let first = app.post("/api/puzzle", Some(ZOO_A), Some(visitor), json!({ "answer": " z o o " })).await?;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["correct"], true);
    let code = first.data()["redemption_code"].as_str().unwrap_or_default().to_string();
    assert!(is_valid_code(&code), "{}", code);

    let second = app.post("/api/puzzle", Some(ZOO_A), Some(visitor), json!({ "answer": "ZOO" })).await?;
    assert_eq!(second.data()["redemption_code"], code.as_str());
    assert_eq!(app.count(Table::Redemptions).await, 1);

    let profile = profiles::get(&app.admin_db(), app.zoo_a.id, visitor).await?.expect("profile");
    assert_eq!(profile.completion_status, CompletionStatus::Completed);

    let progress = app.get("/api/progress", Some(ZOO_A), Some(visitor)).await?;
    assert_eq!(progress.data()["redemption_code"], code.as_str());
    assert_eq!(progress.data()["completion_status"], "completed");
    Ok(())
}

#[tokio::test]
async fn each_tenant_has_its_own_word_and_code() -> Result<()> {
    let app = TestApp::new().await?;
    let visitor = Uuid::new_v4();

    let res = app.post("/api/puzzle", Some(ZOO_A), Some(visitor), json!({ "answer": "cat" })).await?;
    assert_eq!(res.data()["correct"], false);

    let a = app.post("/api/puzzle", Some(ZOO_A), Some(visitor), json!({ "answer": "zoo" })).await?;
    let b = app.post("/api/puzzle", Some(ZOO_B), Some(visitor), json!({ "answer": "cat" })).await?;
    assert_eq!(a.data()["correct"], true);
    assert_eq!(b.data()["correct"], true);
    assert_eq!(app.count(Table::Redemptions).await, 2);
    Ok(())
}

#[tokio::test]
async fn puzzle_requires_a_token() -> Result<()> {
    let app = TestApp::new().await?;
    let res = app.post("/api/puzzle", Some(ZOO_A), None, json!({ "answer": "zoo" })).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
