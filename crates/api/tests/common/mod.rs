//! Shared helpers for API integration tests.
//!
//! The app is built with [`build_app_router`] over the in-memory store and a
//! scripted generation capability, so no database or LLM is needed.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use adpilot_api::auth::jwt::{generate_access_token, JwtConfig};
use adpilot_api::config::ServerConfig;
use adpilot_api::router::build_app_router;
use adpilot_api::state::AppState;
use adpilot_api::ws::WsManager;
use adpilot_core::types::DbId;
use adpilot_core::roles::{SubscriptionTier, UserRole};
use adpilot_events::EventBus;
use adpilot_llm::LlmConfig;
use adpilot_pipeline::testing::{FakeCapability, InMemoryStore};
use adpilot_pipeline::Services;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const OWNER: DbId = 1;
pub const STRANGER: DbId = 2;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url: "postgres://unused".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout: Duration::from_secs(30),
        shutdown_timeout: Duration::from_secs(5),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 5,
        },
        llm: LlmConfig::disabled(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub config: ServerConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_capability(FakeCapability::available())
    }

    pub fn with_capability(capability: FakeCapability) -> Self {
        let config = test_config();
        let store = Arc::new(InMemoryStore::new());
        let event_bus = Arc::new(EventBus::new(64));
        let services = Services::new(
            store.clone(),
            store.clone(),
            Arc::new(capability),
            event_bus.clone(),
        );
        let state = AppState {
            services,
            campaign_store: store.clone(),
            config: Arc::new(config.clone()),
            ws_manager: Arc::new(WsManager::new()),
            event_bus,
        };
        let router = build_app_router(state, &config);
        Self {
            router,
            store,
            config,
        }
    }

    /// Signed access token for a regular free-tier user.
    pub fn token(&self, user_id: DbId) -> String {
        generate_access_token(user_id, UserRole::User, SubscriptionTier::Free, &self.config.jwt)
            .expect("token")
    }

    /// Send a request, optionally authenticated and with a JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<DbId>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user_id)));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response")
    }

    pub async fn get(&self, uri: &str, user: Option<DbId>) -> Response<Body> {
        self.send(Method::GET, uri, user, None).await
    }

    pub async fn post(&self, uri: &str, user: DbId, body: Value) -> Response<Body> {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: DbId, body: Value) -> Response<Body> {
        self.send(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: DbId) -> Response<Body> {
        self.send(Method::DELETE, uri, Some(user), None).await
    }

    /// Create a custom persona and return its id.
    pub async fn create_persona(&self, user: DbId) -> DbId {
        let response = self.post("/api/v1/personas", user, persona_body("Weekend Gardener")).await;
        body_json(response).await["data"]["id"].as_i64().expect("persona id")
    }

    /// Create a draft campaign against a fresh persona; returns (campaign, persona).
    pub async fn create_campaign(&self, user: DbId) -> (DbId, DbId) {
        let persona_id = self.create_persona(user).await;
        let response = self.post("/api/v1/campaigns", user, campaign_body(persona_id)).await;
        let campaign_id = body_json(response).await["data"]["id"]
            .as_i64()
            .expect("campaign id");
        (campaign_id, persona_id)
    }
}

pub fn persona_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Spends Saturdays in the garden and shops local.",
        "demographics": { "age": "35-50", "income": "$60k-$90k", "location": "Suburban" },
        "psychographics": { "values": ["sustainability"], "interests": ["gardening"] },
        "painPoints": ["Pests ruin the harvest"],
        "goals": ["Grow more vegetables"],
        "preferredChannels": ["email", "instagram"]
    })
}

pub fn campaign_body(persona_id: DbId) -> Value {
    let start = chrono::Utc::now() + chrono::Duration::days(1);
    let end = start + chrono::Duration::days(30);
    json!({
        "name": "Spring Launch",
        "objective": "awareness",
        "personaId": persona_id,
        "startDate": start.to_rfc3339(),
        "endDate": end.to_rfc3339(),
        "budget": 2500.0
    })
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}
