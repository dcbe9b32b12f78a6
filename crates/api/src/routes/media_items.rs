//! Route definitions for media items and their queue.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::media_items;
use crate::state::AppState;

/// Routes mounted at `/media-items`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// PUT    /progress                -> update_progress
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}/queue-position     -> update_queue_position
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(media_items::list).post(media_items::create))
        .route("/progress", put(media_items::update_progress))
        .route("/{id}", get(media_items::get_by_id))
        .route(
            "/{id}/queue-position",
            put(media_items::update_queue_position),
        )
}
