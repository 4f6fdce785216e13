//! Handlers for the `/personas` resource.

use adpilot_core::persona::{CreatePersona, Persona, UpdatePersona};
use adpilot_core::types::DbId;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PersonaListParams {
    pub search: Option<String>,
}

/// GET /api/v1/personas
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PersonaListParams>,
) -> AppResult<Json<DataResponse<Vec<Persona>>>> {
    let personas = state
        .services
        .personas
        .list(auth.user_id, params.search.as_deref())
        .await?;
    Ok(Json(DataResponse::new(personas)))
}

/// POST /api/v1/personas
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreatePersona>,
) -> AppResult<(StatusCode, Json<DataResponse<Persona>>)> {
    let persona = state.services.personas.create(auth.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(persona, "Persona created successfully")),
    ))
}

/// GET /api/v1/personas/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Persona>>> {
    let persona = state.services.personas.get(id, auth.user_id).await?;
    Ok(Json(DataResponse::new(persona)))
}

/// PUT /api/v1/personas/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdatePersona>,
) -> AppResult<Json<DataResponse<Persona>>> {
    let persona = state
        .services
        .personas
        .update(id, auth.user_id, input)
        .await?;
    Ok(Json(DataResponse::with_message(persona, "Persona updated successfully")))
}

/// DELETE /api/v1/personas/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    state.services.personas.delete(id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Persona deleted successfully")))
}
