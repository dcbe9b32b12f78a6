//! Shared response envelope types for API handlers.
//!
//! Resource reads and creates use the `{ "data": ... }` envelope. The two
//! engine endpoints answer with a `success` flag instead, which their
//! clients already depend on.

use backlog_core::types::DbId;
use backlog_db::models::lock::Lock;
use backlog_db::models::media_item::MediaItemDetail;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "success": true }`, returned by the queue-position endpoint.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// A lock that reached its goal during a progress update.
#[derive(Debug, Serialize)]
pub struct UnlockedItem {
    pub id: DbId,
    pub title: String,
    pub completed: bool,
}

impl From<&Lock> for UnlockedItem {
    fn from(lock: &Lock) -> Self {
        Self {
            id: lock.id,
            title: lock.title.clone(),
            completed: lock.completed,
        }
    }
}

/// Response of `PUT /media-items/progress`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub success: bool,
    pub updated_item: MediaItemDetail,
    pub newly_unlocked_items: Vec<UnlockedItem>,
}
