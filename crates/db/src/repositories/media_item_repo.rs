//! Repository for the `media_items` table.

use std::collections::HashMap;

use backlog_core::queue::next_rank;
use backlog_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::media_item::{MediaItem, MediaItemDetail, NewMediaItem, QueuedMediaItem};
use crate::repositories::{LockRepo, ProgressRepo, QueueRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, media_type, category, title, runtime_minutes, \
    page_count, episode_count, unit_count, created_at, updated_at";

/// Provides creation and lookup of media items.
pub struct MediaItemRepo;

impl MediaItemRepo {
    /// Insert an item together with its progress record, appended to the
    /// bottom of the user's queue.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &NewMediaItem,
    ) -> Result<QueuedMediaItem, sqlx::Error> {
        let mut tx = pool.begin().await?;
        QueueRepo::lock_user(&mut tx, user_id).await?;

        let insert_query = format!(
            "INSERT INTO media_items \
                (user_id, media_type, category, title, runtime_minutes, page_count, \
                 episode_count, unit_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, MediaItem>(&insert_query)
            .bind(user_id)
            .bind(input.media_type.as_str())
            .bind(&input.category)
            .bind(&input.title)
            .bind(input.runtime_minutes)
            .bind(input.page_count)
            .bind(input.episode_count)
            .bind(input.unit_count)
            .fetch_one(&mut *tx)
            .await?;

        let active = QueueRepo::count_active(&mut tx, user_id).await?;
        let rank = next_rank(usize::try_from(active).unwrap_or(0));
        let progress = ProgressRepo::insert(&mut tx, item.id, user_id, input.duration, rank).await?;

        tx.commit().await?;
        Ok(QueuedMediaItem { item, progress })
    }

    /// Find an item by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MediaItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM media_items WHERE id = $1");
        sqlx::query_as::<_, MediaItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an item by ID within a transaction.
    pub async fn find_by_id_in(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<MediaItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM media_items WHERE id = $1");
        sqlx::query_as::<_, MediaItem>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Find an item enriched with its progress and the locks targeting it.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MediaItemDetail>, sqlx::Error> {
        let Some(item) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let Some(progress) = ProgressRepo::find_by_item(pool, id).await? else {
            return Ok(None);
        };
        let locks = LockRepo::list_for_item(pool, id).await?;
        Ok(Some(MediaItemDetail {
            item,
            progress,
            locks,
        }))
    }

    /// List a user's items: queued items by rank, then everything else.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<QueuedMediaItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM media_items WHERE user_id = $1");
        let items = sqlx::query_as::<_, MediaItem>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        let mut by_id: HashMap<DbId, MediaItem> =
            items.into_iter().map(|item| (item.id, item)).collect();

        // Progress rows come back in queue order.
        let records = ProgressRepo::list_for_user(pool, user_id).await?;
        let result = records
            .into_iter()
            .filter_map(|progress| {
                by_id
                    .remove(&progress.media_item_id)
                    .map(|item| QueuedMediaItem { item, progress })
            })
            .collect();
        Ok(result)
    }
}
