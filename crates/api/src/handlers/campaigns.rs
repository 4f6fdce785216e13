//! Handlers for the `/campaigns` resource and its embedded collections.
//!
//! Every handler resolves the caller with [`AuthUser`] and delegates the
//! permission and lifecycle rules to the campaign services.

use adpilot_core::ab_test::{AbTest, NewAbTest};
use adpilot_core::campaign::{AddCollaborator, Campaign, CreateCampaign, UpdateCampaign};
use adpilot_core::content::{Content, NewContent};
use adpilot_core::query::{CampaignListParams, Page};
use adpilot_core::stats::{CampaignStats, Dashboard};
use adpilot_core::types::DbId;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// GET /api/v1/campaigns
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CampaignListParams>,
) -> AppResult<Json<DataResponse<Page<Campaign>>>> {
    let page = state.services.queries.list(auth.user_id, params).await?;
    Ok(Json(DataResponse::new(page)))
}

/// POST /api/v1/campaigns
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCampaign>,
) -> AppResult<(StatusCode, Json<DataResponse<Campaign>>)> {
    let campaign = state.services.campaigns.create(auth.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(campaign, "Campaign created successfully")),
    ))
}

/// GET /api/v1/campaigns/stats
pub async fn stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<CampaignStats>>> {
    let stats = state.services.queries.stats(auth.user_id).await?;
    Ok(Json(DataResponse::new(stats)))
}

/// GET /api/v1/campaigns/dashboard
pub async fn dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Dashboard>>> {
    let dashboard = state.services.queries.dashboard(auth.user_id).await?;
    Ok(Json(DataResponse::new(dashboard)))
}

/// GET /api/v1/campaigns/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let campaign = state.services.campaigns.get(id, auth.user_id).await?;
    Ok(Json(DataResponse::new(campaign)))
}

/// PUT /api/v1/campaigns/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateCampaign>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let campaign = state
        .services
        .campaigns
        .update(id, auth.user_id, input)
        .await?;
    Ok(Json(DataResponse::with_message(
        campaign,
        "Campaign updated successfully",
    )))
}

/// DELETE /api/v1/campaigns/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    state.services.campaigns.delete(id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Campaign deleted successfully")))
}

/// PUT /api/v1/campaigns/{id}/archive
pub async fn archive(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let campaign = state.services.campaigns.archive(id, auth.user_id).await?;
    Ok(Json(DataResponse::with_message(
        campaign,
        "Campaign archived successfully",
    )))
}

// ---------------------------------------------------------------------------
// Embedded collections
// ---------------------------------------------------------------------------

/// POST /api/v1/campaigns/{id}/content
pub async fn add_content(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<NewContent>,
) -> AppResult<(StatusCode, Json<DataResponse<Content>>)> {
    let content = state
        .services
        .campaigns
        .add_content(id, auth.user_id, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(content, "Content added successfully")),
    ))
}

/// POST /api/v1/campaigns/{id}/ab-tests
pub async fn add_ab_test(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<NewAbTest>,
) -> AppResult<(StatusCode, Json<DataResponse<AbTest>>)> {
    let test = state
        .services
        .campaigns
        .add_ab_test(id, auth.user_id, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(test, "A/B test created successfully")),
    ))
}

/// POST /api/v1/campaigns/{id}/collaborators
pub async fn add_collaborator(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<AddCollaborator>,
) -> AppResult<(StatusCode, Json<DataResponse<Campaign>>)> {
    let campaign = state
        .services
        .campaigns
        .add_collaborator(id, auth.user_id, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(campaign, "Collaborator added successfully")),
    ))
}

/// DELETE /api/v1/campaigns/{id}/collaborators/{user_id}
pub async fn remove_collaborator(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((id, user_id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let campaign = state
        .services
        .campaigns
        .remove_collaborator(id, auth.user_id, user_id)
        .await?;
    Ok(Json(DataResponse::with_message(
        campaign,
        "Collaborator removed successfully",
    )))
}
