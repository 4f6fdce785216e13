//! HTTP-level tests for the `/api/v1` surface and `/health`.
//!
//! Every request goes through the production middleware stack via
//! `build_app_router`, backed by in-memory doubles.

mod common;

use adpilot_pipeline::testing::FakeCapability;
use axum::http::StatusCode;
use common::{body_json, campaign_body, persona_body, TestApp, OWNER, STRANGER};
use serde_json::json;

// ---------------------------------------------------------------------------
// Health and auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_store_and_generation() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["dbHealthy"], true);
    assert_eq!(json["aiAvailable"], true);
}

#[tokio::test]
async fn health_stays_ok_without_generation() {
    let app = TestApp::with_capability(FakeCapability::unavailable());
    let json = body_json(app.get("/health", None).await).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["aiAvailable"], false);
    assert!(json["aiProvider"].is_string());
}

#[tokio::test]
async fn missing_token_is_rejected_with_envelope() {
    let app = TestApp::new();
    let response = app.get("/api/v1/campaigns", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let app = TestApp::new();
    let response = app.get("/api/v1/nope", Some(OWNER)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn ai_status_is_public() {
    let app = TestApp::new();
    let response = app.get("/api/v1/content/ai-status", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["available"], true);
    assert_eq!(json["data"]["provider"], "fake");
}

// ---------------------------------------------------------------------------
// Personas
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_persona_returns_created_envelope() {
    let app = TestApp::new();
    let response = app
        .post("/api/v1/personas", OWNER, persona_body("Urban Cyclist"))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["message"].is_string());
    assert_eq!(json["data"]["name"], "Urban Cyclist");
    assert_eq!(json["data"]["isPredefined"], false);
    assert_eq!(json["data"]["ownerId"], OWNER);
}

#[tokio::test]
async fn referenced_persona_delete_conflicts() {
    let app = TestApp::new();
    let (_, persona_id) = app.create_campaign(OWNER).await;

    let response = app
        .delete(&format!("/api/v1/personas/{persona_id}"), OWNER)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_campaign_starts_as_empty_draft() {
    let app = TestApp::new();
    let persona_id = app.create_persona(OWNER).await;

    let response = app
        .post("/api/v1/campaigns", OWNER, campaign_body(persona_id))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "draft");
    assert_eq!(json["data"]["content"], json!([]));
    assert_eq!(json["data"]["personaId"], persona_id);
}

#[tokio::test]
async fn invalid_campaign_lists_field_errors() {
    let app = TestApp::new();
    let persona_id = app.create_persona(OWNER).await;
    let mut body = campaign_body(persona_id);
    body["endDate"] = body["startDate"].clone();

    let response = app.post("/api/v1/campaigns", OWNER, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let errors = json["errors"].as_array().expect("errors array");
    assert!(errors.iter().any(|e| e["field"] == "endDate"));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .post("/api/v1/campaigns", OWNER, json!({ "name": 42 }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn stranger_is_forbidden() {
    let app = TestApp::new();
    let (campaign_id, _) = app.create_campaign(OWNER).await;
    let uri = format!("/api/v1/campaigns/{campaign_id}");

    let response = app.get(&uri, Some(STRANGER)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.put(&uri, STRANGER, json!({ "name": "Hijacked" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.store.campaign(campaign_id).unwrap().name, "Spring Launch");
}

#[tokio::test]
async fn missing_campaign_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/api/v1/campaigns/9999", Some(OWNER)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn list_and_stats_are_owner_scoped() {
    let app = TestApp::new();
    app.create_campaign(OWNER).await;
    app.create_campaign(OWNER).await;
    app.create_campaign(STRANGER).await;

    let response = app
        .get("/api/v1/campaigns?limit=1&sortBy=name&sortOrder=asc", Some(OWNER))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["pagination"]["total"], 2);
    assert_eq!(json["data"]["pagination"]["pages"], 2);

    let response = app.get("/api/v1/campaigns/stats", Some(OWNER)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["totalCampaigns"], 2);
    assert_eq!(json["data"]["draftCampaigns"], 2);
}

#[tokio::test]
async fn unknown_list_filter_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .get("/api/v1/campaigns?status=sleeping", Some(OWNER))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn archive_then_delete_conflicts() {
    let app = TestApp::new();
    let (campaign_id, _) = app.create_campaign(OWNER).await;

    let response = app
        .put(&format!("/api/v1/campaigns/{campaign_id}/archive"), OWNER, json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "archived");

    let response = app
        .delete(&format!("/api/v1/campaigns/{campaign_id}"), OWNER)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_email_appends_scored_content() {
    let app = TestApp::new();
    let (campaign_id, persona_id) = app.create_campaign(OWNER).await;

    let response = app
        .post(
            "/api/v1/content/generate-email",
            OWNER,
            json!({ "campaignId": campaign_id, "personaId": persona_id }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["contentType"], "email");
    assert_eq!(json["data"]["qualityScore"], 88);
    assert!(json["data"]["subjectLine"].is_string());
    assert_eq!(app.store.campaign(campaign_id).unwrap().content.len(), 1);
}

#[tokio::test]
async fn generation_unavailable_is_503() {
    let app = TestApp::with_capability(FakeCapability::unavailable());

    let response = app
        .post(
            "/api/v1/content/generate-email",
            OWNER,
            json!({ "campaignId": 1, "personaId": 1 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(app.store.campaign_lookups(), 0);
}

#[tokio::test]
async fn generation_requires_edit_access() {
    let app = TestApp::new();
    let (campaign_id, persona_id) = app.create_campaign(OWNER).await;

    let response = app
        .post(
            "/api/v1/content/generate-social",
            STRANGER,
            json!({ "campaignId": campaign_id, "personaId": persona_id, "platform": "instagram" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.store.campaign(campaign_id).unwrap().content.is_empty());
}
