//! Applying a progress update to an item and every lock it feeds.
//!
//! Deltas are computed against the progress record read under the user's
//! lock, never against values supplied by the client.

use backlog_core::completion::{evaluate, LockOutcome};
use backlog_core::error::{ensure_owner, CoreError, ENTITY_MEDIA_ITEM};
use backlog_core::lock::LockState;
use backlog_core::lock_matching::{select_matches, ItemFacts};
use backlog_core::media::{category_matches, MediaType};
use backlog_core::progress::{compute_delta, merge_update, ProgressUpdate, ProgressValues};
use backlog_core::queue::{plan_removal, QueueSlot};
use backlog_core::types::DbId;
use backlog_db::models::lock::Lock;
use backlog_db::models::media_item::MediaItemDetail;
use backlog_db::repositories::{LockRepo, MediaItemRepo, ProgressRepo, QueueRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// What the client believes the item looked like before the update.
///
/// Only compared against the stored state for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ClientBaseline {
    pub duration: Option<i32>,
    pub pages: Option<i32>,
    pub units: Option<i32>,
    pub media_type: Option<String>,
    pub category: Option<String>,
}

/// A progress update for one item.
#[derive(Debug, Clone)]
pub struct ProgressCommand {
    pub item_id: DbId,
    pub update: ProgressUpdate,
    pub baseline: ClientBaseline,
}

/// Result of a committed progress update.
#[derive(Debug)]
pub struct PropagationOutcome {
    /// The item after the update, with its progress and specific locks.
    pub item: MediaItemDetail,
    /// Locks that completed in this update, in evaluation order.
    pub newly_completed: Vec<Lock>,
    /// Whether the item itself transitioned to completed.
    pub item_completed: bool,
}

/// Apply `command` on behalf of `user_id`.
///
/// Steps, all in one transaction:
/// 1. lock the user, load the item and check ownership;
/// 2. merge the update into the stored values and derive the delta;
/// 3. write the new values, retiring the item from the queue when it
///    first completes;
/// 4. fold the update into every matching open lock and complete the
///    ones whose goal is reached;
/// 5. read back the locks targeting the item for the returned detail.
pub async fn apply_progress(
    pool: &PgPool,
    user_id: DbId,
    command: &ProgressCommand,
) -> AppResult<PropagationOutcome> {
    let item_id = command.item_id;

    let mut tx = pool.begin().await?;
    QueueRepo::lock_user(&mut tx, user_id).await?;

    let item = MediaItemRepo::find_by_id_in(&mut tx, item_id)
        .await?
        .ok_or_else(|| CoreError::item_not_found(item_id))?;
    ensure_owner(ENTITY_MEDIA_ITEM, item.id, item.user_id, user_id)?;
    let media_type = item.media_type()?;

    let record = ProgressRepo::find_by_item_for_update(&mut tx, item_id)
        .await?
        .ok_or_else(|| CoreError::item_not_found(item_id))?;
    let previous = record.values();
    log_baseline_mismatch(item_id, media_type, &item.category, &previous, &command.baseline);

    let next = merge_update(media_type, &previous, &command.update)?;
    let delta = compute_delta(media_type, &previous, &next);
    let item_completed = next.completed && !previous.completed;
    let retire = next.completed && record.queue_number.is_some();

    let rank_changes = if retire {
        let slots: Vec<QueueSlot> = QueueRepo::list_for_update(&mut tx, user_id)
            .await?
            .into_iter()
            .map(QueueSlot::from)
            .collect();
        plan_removal(&slots, item_id)?
    } else {
        Vec::new()
    };

    let open_locks = LockRepo::list_open_for_update(&mut tx, user_id).await?;
    let states = open_locks
        .iter()
        .map(Lock::state)
        .collect::<Result<Vec<LockState>, CoreError>>()?;

    // --- Write phase ---
    let progress = ProgressRepo::write_values(&mut tx, item_id, &next, retire)
        .await
        .map_err(AppError::PropagationFailed)?;
    QueueRepo::assign_ranks(&mut tx, user_id, &rank_changes)
        .await
        .map_err(AppError::PropagationFailed)?;

    let facts = ItemFacts {
        item_id,
        media_type,
        category: &item.category,
    };
    let mut newly_completed = Vec::new();
    let mut locks_updated = 0usize;

    for (lock, contribution) in select_matches(&states, &facts) {
        let outcome = evaluate(lock, contribution, media_type, &next, &delta);
        let (aggregate, complete) = match outcome {
            LockOutcome::Skipped => continue,
            LockOutcome::Progressed(agg) if agg == lock.aggregate => continue,
            LockOutcome::Progressed(agg) => (agg, false),
            LockOutcome::Completed(agg) => (agg, true),
        };

        let written = LockRepo::apply_aggregate(&mut tx, lock.id, &aggregate, complete)
            .await
            .map_err(AppError::PropagationFailed)?;
        locks_updated += 1;

        if let Some(row) = written.filter(|row| complete && row.completed) {
            tracing::info!(user_id, item_id, lock_id = row.id, "Lock completed");
            newly_completed.push(row);
        }
    }

    // Read before commit, still under the user's lock.
    let locks = LockRepo::list_for_item_in(&mut tx, item_id)
        .await
        .map_err(AppError::PropagationFailed)?;

    tx.commit().await.map_err(AppError::PropagationFailed)?;

    tracing::info!(
        user_id,
        item_id,
        time_delta = delta.time,
        secondary_delta = delta.secondary.map_or(0, |s| s.amount),
        item_completed,
        retired = retire,
        locks_updated,
        locks_completed = newly_completed.len(),
        "Progress applied"
    );

    Ok(PropagationOutcome {
        item: MediaItemDetail {
            item,
            progress,
            locks,
        },
        newly_completed,
        item_completed,
    })
}

/// Note client-side "before" values that disagree with the stored record.
fn log_baseline_mismatch(
    item_id: DbId,
    media_type: MediaType,
    category: &str,
    stored: &ProgressValues,
    baseline: &ClientBaseline,
) {
    let stored_secondary = stored.secondary(media_type).map(|s| s.amount);
    let client_secondary = match media_type {
        MediaType::Book => baseline.pages,
        MediaType::Task => baseline.units,
        _ => None,
    };

    let duration_differs = baseline
        .duration
        .is_some_and(|d| d != stored.completed_duration);
    let secondary_differs = client_secondary.is_some() && client_secondary != stored_secondary;
    let type_differs = baseline
        .media_type
        .as_deref()
        .is_some_and(|t| MediaType::from_selector(t) != Some(media_type));
    let category_differs = baseline
        .category
        .as_deref()
        .is_some_and(|c| !category_matches(c, category));

    if duration_differs || secondary_differs || type_differs || category_differs {
        tracing::debug!(
            item_id,
            stored_duration = stored.completed_duration,
            client_duration = ?baseline.duration,
            stored_secondary = ?stored_secondary,
            client_secondary = ?client_secondary,
            client_media_type = ?baseline.media_type,
            client_category = ?baseline.category,
            "Client baseline differs from stored progress; using stored values"
        );
    }
}
