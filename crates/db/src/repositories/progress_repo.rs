//! Repository for the `progress_records` table.

use backlog_core::progress::ProgressValues;
use backlog_core::types::{DbId, Rank};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::progress::ProgressRecord;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, media_item_id, user_id, duration, completed_duration, \
    pages_completed, units_completed, completed, queue_number, created_at, updated_at";

/// Provides reads and writes of per-item progress.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Insert the progress record of a newly created item.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        media_item_id: DbId,
        user_id: DbId,
        duration: i32,
        queue_number: Rank,
    ) -> Result<ProgressRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO progress_records (media_item_id, user_id, duration, queue_number) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProgressRecord>(&query)
            .bind(media_item_id)
            .bind(user_id)
            .bind(duration)
            .bind(queue_number)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find the progress record of an item.
    pub async fn find_by_item(
        pool: &PgPool,
        media_item_id: DbId,
    ) -> Result<Option<ProgressRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM progress_records WHERE media_item_id = $1");
        sqlx::query_as::<_, ProgressRecord>(&query)
            .bind(media_item_id)
            .fetch_optional(pool)
            .await
    }

    /// Find and row-lock the progress record of an item.
    pub async fn find_by_item_for_update(
        tx: &mut Transaction<'_, Postgres>,
        media_item_id: DbId,
    ) -> Result<Option<ProgressRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM progress_records WHERE media_item_id = $1 FOR UPDATE"
        );
        sqlx::query_as::<_, ProgressRecord>(&query)
            .bind(media_item_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List all progress records of a user.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ProgressRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM progress_records WHERE user_id = $1 \
             ORDER BY queue_number NULLS LAST, media_item_id"
        );
        sqlx::query_as::<_, ProgressRecord>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite an item's progress with absolute values.
    ///
    /// When `retire` is set the item also leaves the queue; the caller is
    /// responsible for closing the gap in the remaining ranks.
    pub async fn write_values(
        tx: &mut Transaction<'_, Postgres>,
        media_item_id: DbId,
        values: &ProgressValues,
        retire: bool,
    ) -> Result<ProgressRecord, sqlx::Error> {
        let query = format!(
            "UPDATE progress_records SET \
                completed_duration = $2, \
                pages_completed = $3, \
                units_completed = $4, \
                completed = $5, \
                queue_number = CASE WHEN $6 THEN NULL ELSE queue_number END \
             WHERE media_item_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProgressRecord>(&query)
            .bind(media_item_id)
            .bind(values.completed_duration)
            .bind(values.pages_completed)
            .bind(values.units_completed)
            .bind(values.completed)
            .bind(retire)
            .fetch_one(&mut **tx)
            .await
    }
}
