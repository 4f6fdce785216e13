use axum::routing::{get, post};
use axum::Router;

use crate::handlers::content;
use crate::state::AppState;

/// Routes mounted at `/content`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ai-status", get(content::ai_status))
        .route("/generate-email", post(content::generate_email))
        .route("/generate-social", post(content::generate_social))
        .route("/generate-ad-copy", post(content::generate_ad_copy))
        .route("/generate-variations", post(content::generate_variations))
        .route("/batch-generate", post(content::batch_generate))
}
