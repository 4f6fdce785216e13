//! Handlers for AI-assisted content generation under `/content`.

use adpilot_core::content::Content;
use adpilot_core::generation::{
    BatchGenerateRequest, GenerateAdCopyRequest, GenerateEmailRequest, GenerateSocialRequest,
    GenerateVariationsRequest,
};
use adpilot_pipeline::{AiStatus, BatchOutcome};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

type Created<T> = (StatusCode, Json<DataResponse<T>>);

fn created<T: serde::Serialize>(data: T, message: &str) -> Created<T> {
    (StatusCode::CREATED, Json(DataResponse::with_message(data, message)))
}

/// GET /api/v1/content/ai-status
///
/// Public: reports whether generation is configured, nothing more.
pub async fn ai_status(State(state): State<AppState>) -> Json<DataResponse<AiStatus>> {
    Json(DataResponse::new(state.services.generation.status()))
}

/// POST /api/v1/content/generate-email
pub async fn generate_email(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<GenerateEmailRequest>,
) -> AppResult<Created<Content>> {
    let content = state
        .services
        .generation
        .generate_email(auth.user_id, input)
        .await?;
    Ok(created(content, "Email content generated successfully"))
}

/// POST /api/v1/content/generate-social
pub async fn generate_social(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<GenerateSocialRequest>,
) -> AppResult<Created<Content>> {
    let content = state
        .services
        .generation
        .generate_social(auth.user_id, input)
        .await?;
    Ok(created(content, "Social media content generated successfully"))
}

/// POST /api/v1/content/generate-ad-copy
pub async fn generate_ad_copy(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<GenerateAdCopyRequest>,
) -> AppResult<Created<Content>> {
    let content = state
        .services
        .generation
        .generate_ad_copy(auth.user_id, input)
        .await?;
    Ok(created(content, "Ad copy generated successfully"))
}

/// POST /api/v1/content/generate-variations
pub async fn generate_variations(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<GenerateVariationsRequest>,
) -> AppResult<Created<Vec<Content>>> {
    let items = state
        .services
        .generation
        .generate_variations(auth.user_id, input)
        .await?;
    let message = format!("{} variations generated successfully", items.len());
    Ok(created(items, &message))
}

/// POST /api/v1/content/batch-generate
///
/// Partial failures are reported inside the payload, not as an error status.
pub async fn batch_generate(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<BatchGenerateRequest>,
) -> AppResult<Created<BatchOutcome>> {
    let outcome = state
        .services
        .generation
        .batch_generate(auth.user_id, input)
        .await?;
    let message = format!(
        "Generated {} of {} content items",
        outcome.content.len(),
        outcome.requested
    );
    Ok(created(outcome, &message))
}
