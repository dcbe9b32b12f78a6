//! Repository for the `locks` table.

use backlog_core::lock::LockAggregate;
use backlog_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::lock::{Lock, LockListFilter, NewLock};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, title, lock_type, target_item_id, target_selector, \
    goal_time, goal_pages, goal_units, completed_time, pages_completed, completed, \
    completed_at, created_at, updated_at";

/// Provides CRUD operations for locks and the aggregate updates applied
/// during progress propagation.
pub struct LockRepo;

impl LockRepo {
    /// Insert a new lock. Aggregates start at zero.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &NewLock,
    ) -> Result<Lock, sqlx::Error> {
        let query = format!(
            "INSERT INTO locks \
                (user_id, title, lock_type, target_item_id, target_selector, \
                 goal_time, goal_pages, goal_units) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lock>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(input.target.lock_type().as_str())
            .bind(input.target.item_id())
            .bind(input.target.selector())
            .bind(input.goals.goal_time)
            .bind(input.goals.goal_pages)
            .bind(input.goals.goal_units)
            .fetch_one(pool)
            .await
    }

    /// Find a lock by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locks WHERE id = $1");
        sqlx::query_as::<_, Lock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's locks, optionally filtered by completion.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: LockListFilter,
    ) -> Result<Vec<Lock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM locks \
             WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR completed = $2) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Lock>(&query)
            .bind(user_id)
            .bind(filter.completed)
            .fetch_all(pool)
            .await
    }

    /// List the locks that target one specific item.
    pub async fn list_for_item(pool: &PgPool, item_id: DbId) -> Result<Vec<Lock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locks WHERE target_item_id = $1 ORDER BY id");
        sqlx::query_as::<_, Lock>(&query)
            .bind(item_id)
            .fetch_all(pool)
            .await
    }

    /// List the locks that target one item, within a transaction.
    pub async fn list_for_item_in(
        tx: &mut Transaction<'_, Postgres>,
        item_id: DbId,
    ) -> Result<Vec<Lock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locks WHERE target_item_id = $1 ORDER BY id");
        sqlx::query_as::<_, Lock>(&query)
            .bind(item_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Row-lock and return all of a user's open locks.
    pub async fn list_open_for_update(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
    ) -> Result<Vec<Lock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM locks \
             WHERE user_id = $1 AND completed = false \
             ORDER BY id \
             FOR UPDATE"
        );
        sqlx::query_as::<_, Lock>(&query)
            .bind(user_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Store a lock's new aggregate, completing it when `complete` is set.
    ///
    /// Only open locks are touched, so `completed_at` is stamped at most
    /// once. Returns `None` if the lock was already complete.
    pub async fn apply_aggregate(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        aggregate: &LockAggregate,
        complete: bool,
    ) -> Result<Option<Lock>, sqlx::Error> {
        let query = format!(
            "UPDATE locks SET \
                completed_time = $2, \
                pages_completed = $3, \
                completed = $4, \
                completed_at = CASE WHEN $4 THEN NOW() ELSE NULL END \
             WHERE id = $1 AND completed = false \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lock>(&query)
            .bind(id)
            .bind(aggregate.completed_time)
            .bind(aggregate.secondary_completed)
            .bind(complete)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Delete a lock. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM locks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
