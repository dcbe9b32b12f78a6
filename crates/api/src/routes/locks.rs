//! Route definitions for locks.

use axum::routing::get;
use axum::Router;

use crate::handlers::locks;
use crate::state::AppState;

/// Routes mounted at `/locks`.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// GET    /{id}      -> get_by_id
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(locks::list).post(locks::create))
        .route("/{id}", get(locks::get_by_id).delete(locks::delete))
}
