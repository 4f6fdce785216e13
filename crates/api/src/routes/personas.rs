use axum::routing::get;
use axum::Router;

use crate::handlers::personas;
use crate::state::AppState;

/// Routes mounted at `/personas`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(personas::list).post(personas::create))
        .route(
            "/{id}",
            get(personas::get_by_id)
                .put(personas::update)
                .delete(personas::delete),
        )
}
