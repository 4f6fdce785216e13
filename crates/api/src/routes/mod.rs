pub mod campaigns;
pub mod content;
pub mod health;
pub mod personas;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws?token=                                       WebSocket notifications
///
/// /campaigns                                       list, create
/// /campaigns/stats                                 aggregate stats
/// /campaigns/dashboard                             dashboard
/// /campaigns/{id}                                  get, update, delete
/// /campaigns/{id}/archive                          archive (PUT)
/// /campaigns/{id}/content                          add content (POST)
/// /campaigns/{id}/ab-tests                         add A/B test (POST)
/// /campaigns/{id}/collaborators                    add collaborator (POST)
/// /campaigns/{id}/collaborators/{user_id}          remove collaborator (DELETE)
///
/// /content/ai-status                               capability status (public)
/// /content/generate-email                          POST
/// /content/generate-social                         POST
/// /content/generate-ad-copy                        POST
/// /content/generate-variations                     POST
/// /content/batch-generate                          POST
///
/// /personas                                        list, create
/// /personas/{id}                                   get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/campaigns", campaigns::router())
        .nest("/content", content::router())
        .nest("/personas", personas::router())
}
