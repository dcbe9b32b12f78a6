pub mod health;
pub mod locks;
pub mod media_items;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Every route requires a Bearer token.
///
/// ```text
/// /media-items                                     list, create
/// /media-items/progress                            record progress (PUT)
/// /media-items/{id}                                get
/// /media-items/{id}/queue-position                 move in queue (PUT)
///
/// /locks                                           list (?completed=), create
/// /locks/{id}                                      get, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/media-items", media_items::router())
        .nest("/locks", locks::router())
}
