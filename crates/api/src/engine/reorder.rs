//! Moving one item within a user's queue.

use backlog_core::error::{ensure_owner, CoreError, ENTITY_MEDIA_ITEM};
use backlog_core::queue::{plan_reorder, QueueSlot, QueueTarget};
use backlog_core::types::{DbId, Rank};
use backlog_db::repositories::{MediaItemRepo, ProgressRepo, QueueRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Result of a successful reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderOutcome {
    pub item_id: DbId,
    /// The item's rank after the move.
    pub rank: Rank,
    /// Number of rows whose rank was rewritten, including the moved item.
    pub rows_changed: usize,
}

/// Move `item_id` to `target` in `user_id`'s queue.
///
/// Validation (existence, ownership, queued, position range) happens before
/// any write. All rank changes are written by one statement and committed
/// together; an identity move writes nothing.
pub async fn reorder(
    pool: &PgPool,
    user_id: DbId,
    item_id: DbId,
    target: QueueTarget,
) -> AppResult<ReorderOutcome> {
    let mut tx = pool.begin().await?;
    QueueRepo::lock_user(&mut tx, user_id).await?;

    let item = MediaItemRepo::find_by_id_in(&mut tx, item_id)
        .await?
        .ok_or_else(|| CoreError::item_not_found(item_id))?;
    ensure_owner(ENTITY_MEDIA_ITEM, item.id, item.user_id, user_id)?;

    let progress = ProgressRepo::find_by_item_for_update(&mut tx, item_id)
        .await?
        .ok_or_else(|| CoreError::item_not_found(item_id))?;
    if progress.queue_number.is_none() || progress.completed {
        return Err(CoreError::Validation(format!(
            "Media item {item_id} is not in the queue"
        ))
        .into());
    }

    let slots: Vec<QueueSlot> = QueueRepo::list_for_update(&mut tx, user_id)
        .await?
        .into_iter()
        .map(QueueSlot::from)
        .collect();
    let changes = plan_reorder(&slots, item_id, target)?;

    let rank = changes
        .iter()
        .find(|c| c.item_id == item_id)
        .map(|c| c.rank)
        .or(progress.queue_number)
        .unwrap_or(1);

    // --- Write phase ---
    QueueRepo::assign_ranks(&mut tx, user_id, &changes)
        .await
        .map_err(AppError::ReorderFailed)?;
    tx.commit().await.map_err(AppError::ReorderFailed)?;

    tracing::info!(
        user_id,
        item_id,
        rank,
        rows_changed = changes.len(),
        queue_len = slots.len(),
        "Queue reordered"
    );

    Ok(ReorderOutcome {
        item_id,
        rank,
        rows_changed: changes.len(),
    })
}
