//! Media item entity model and DTOs.

use backlog_core::error::CoreError;
use backlog_core::media::MediaType;
use backlog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::lock::Lock;
use crate::models::progress::ProgressRecord;

/// A row from the `media_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaItem {
    pub id: DbId,
    pub user_id: DbId,
    pub media_type: String,
    pub category: String,
    pub title: String,
    pub runtime_minutes: Option<i32>,
    pub page_count: Option<i32>,
    pub episode_count: Option<i32>,
    pub unit_count: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MediaItem {
    /// Parsed media type. The column is constrained, so a failure here
    /// means the row was written outside this service.
    pub fn media_type(&self) -> Result<MediaType, CoreError> {
        MediaType::from_selector(&self.media_type).ok_or_else(|| {
            CoreError::Internal(format!(
                "Media item {} has unknown media type '{}'",
                self.id, self.media_type
            ))
        })
    }
}

/// A media item with its progress record and the locks that target it.
#[derive(Debug, Clone, Serialize)]
pub struct MediaItemDetail {
    #[serde(flatten)]
    pub item: MediaItem,
    pub progress: ProgressRecord,
    pub locks: Vec<Lock>,
}

/// A media item joined with its progress, as listed in the queue.
#[derive(Debug, Clone, Serialize)]
pub struct QueuedMediaItem {
    #[serde(flatten)]
    pub item: MediaItem,
    pub progress: ProgressRecord,
}

/// DTO for adding a new item to the caller's backlog.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMediaItem {
    pub media_type: MediaType,
    pub title: String,
    pub category: Option<String>,
    pub runtime_minutes: Option<i32>,
    pub page_count: Option<i32>,
    pub episode_count: Option<i32>,
    pub unit_count: Option<i32>,
    /// Target amount; derived from the type-specific detail when omitted.
    pub duration: Option<i32>,
}

/// A validated media item ready to insert.
#[derive(Debug, Clone)]
pub struct NewMediaItem {
    pub media_type: MediaType,
    pub title: String,
    pub category: String,
    pub runtime_minutes: Option<i32>,
    pub page_count: Option<i32>,
    pub episode_count: Option<i32>,
    pub unit_count: Option<i32>,
    pub duration: i32,
}
