//! Rank space of a user's queue (`progress_records.queue_number`).

use backlog_core::queue::RankChange;
use backlog_core::types::{DbId, Rank};
use sqlx::{Postgres, Transaction};

use crate::models::progress::QueueRow;

/// Provides the per-user queue lock and rank reads/writes.
pub struct QueueRepo;

impl QueueRepo {
    /// Take the per-user transaction-scoped advisory lock.
    ///
    /// Every operation that reads and then rewrites a user's ranks or lock
    /// aggregates takes this first; it is released at commit or rollback.
    pub async fn lock_user(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// The user's active queue ordered by rank, with the rows locked.
    pub async fn list_for_update(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
    ) -> Result<Vec<QueueRow>, sqlx::Error> {
        sqlx::query_as::<_, QueueRow>(
            "SELECT media_item_id, queue_number FROM progress_records \
             WHERE user_id = $1 AND queue_number IS NOT NULL AND completed = false \
             ORDER BY queue_number, media_item_id \
             FOR UPDATE",
        )
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await
    }

    /// Number of active queued items for the user.
    pub async fn count_active(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM progress_records \
             WHERE user_id = $1 AND queue_number IS NOT NULL AND completed = false",
        )
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Write a batch of new ranks in a single statement.
    ///
    /// Returns the number of rows updated. Uniqueness of
    /// `(user_id, queue_number)` is deferred to commit.
    pub async fn assign_ranks(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        changes: &[RankChange],
    ) -> Result<u64, sqlx::Error> {
        if changes.is_empty() {
            return Ok(0);
        }

        let item_ids: Vec<DbId> = changes.iter().map(|c| c.item_id).collect();
        let ranks: Vec<Rank> = changes.iter().map(|c| c.rank).collect();

        let result = sqlx::query(
            "UPDATE progress_records pr SET queue_number = c.rank \
             FROM UNNEST($2::BIGINT[], $3::INTEGER[]) AS c(item_id, rank) \
             WHERE pr.media_item_id = c.item_id AND pr.user_id = $1",
        )
        .bind(user_id)
        .bind(&item_ids)
        .bind(&ranks)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
