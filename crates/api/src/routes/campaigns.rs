use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Routes mounted at `/campaigns`. Static segments (`stats`, `dashboard`)
/// take precedence over `{id}`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(campaigns::list).post(campaigns::create))
        .route("/stats", get(campaigns::stats))
        .route("/dashboard", get(campaigns::dashboard))
        .route(
            "/{id}",
            get(campaigns::get_by_id)
                .put(campaigns::update)
                .delete(campaigns::delete),
        )
        .route("/{id}/archive", put(campaigns::archive))
        .route("/{id}/content", post(campaigns::add_content))
        .route("/{id}/ab-tests", post(campaigns::add_ab_test))
        .route("/{id}/collaborators", post(campaigns::add_collaborator))
        .route(
            "/{id}/collaborators/{user_id}",
            delete(campaigns::remove_collaborator),
        )
}
