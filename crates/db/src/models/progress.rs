//! Progress record model (one per media item).

use backlog_core::progress::ProgressValues;
use backlog_core::queue::QueueSlot;
use backlog_core::types::{DbId, Rank, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `progress_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressRecord {
    pub id: DbId,
    pub media_item_id: DbId,
    pub user_id: DbId,
    pub duration: i32,
    pub completed_duration: i32,
    pub pages_completed: i32,
    pub units_completed: i32,
    pub completed: bool,
    pub queue_number: Option<Rank>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProgressRecord {
    pub fn values(&self) -> ProgressValues {
        ProgressValues {
            completed_duration: self.completed_duration,
            pages_completed: self.pages_completed,
            units_completed: self.units_completed,
            completed: self.completed,
        }
    }
}

/// One queued item's rank.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct QueueRow {
    pub media_item_id: DbId,
    pub queue_number: Rank,
}

impl From<QueueRow> for QueueSlot {
    fn from(row: QueueRow) -> Self {
        QueueSlot {
            item_id: row.media_item_id,
            rank: row.queue_number,
        }
    }
}
