//! Integration tests for the lock repository.
//!
//! - Create/find/list/delete with the completion filter
//! - Detail lookup includes the item's specific locks
//! - One-way completion in `apply_aggregate`
//! - Storage constraints on lock targets

use assert_matches::assert_matches;
use backlog_core::lock::{LockAggregate, LockGoals, LockTarget};
use backlog_core::media::MediaType;
use backlog_db::models::lock::{LockListFilter, NewLock};
use backlog_db::models::media_item::NewMediaItem;
use backlog_db::repositories::{LockRepo, MediaItemRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_book(pool: &PgPool, user_id: i64) -> i64 {
    let input = NewMediaItem {
        media_type: MediaType::Book,
        title: "Dune".to_string(),
        category: "Sci-Fi".to_string(),
        runtime_minutes: None,
        page_count: Some(412),
        episode_count: None,
        unit_count: None,
        duration: 412,
    };
    MediaItemRepo::create(pool, user_id, &input).await.unwrap().item.id
}

fn pages_lock(target: LockTarget, pages: i32) -> NewLock {
    NewLock {
        title: "Read more".to_string(),
        target,
        goals: LockGoals {
            goal_pages: Some(pages),
            ..LockGoals::default()
        },
    }
}

// ---------------------------------------------------------------------------
// Test: CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_lock_crud(pool: PgPool) {
    let item_id = create_book(&pool, 1).await;

    let specific = LockRepo::create(&pool, 1, &pages_lock(LockTarget::Specific(item_id), 100))
        .await
        .unwrap();
    assert_eq!(specific.lock_type, "specific");
    assert_eq!(specific.target_item_id, Some(item_id));
    assert_eq!(specific.target_selector, None);
    assert_eq!(specific.completed_time, 0);
    assert!(!specific.completed);
    assert!(specific.completed_at.is_none());
    assert_matches!(specific.target(), Ok(LockTarget::Specific(id)) if id == item_id);

    let by_type = LockRepo::create(
        &pool,
        1,
        &pages_lock(LockTarget::MediaType(MediaType::Book), 120),
    )
    .await
    .unwrap();
    assert_eq!(by_type.target_selector.as_deref(), Some("book"));

    let found = LockRepo::find_by_id(&pool, by_type.id).await.unwrap();
    assert_eq!(found.map(|l| l.id), Some(by_type.id));

    let all = LockRepo::list_for_user(&pool, 1, LockListFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let for_item = LockRepo::list_for_item(&pool, item_id).await.unwrap();
    assert_eq!(for_item.len(), 1);
    assert_eq!(for_item[0].id, specific.id);

    let detail = MediaItemRepo::find_detail(&pool, item_id).await.unwrap().unwrap();
    assert_eq!(detail.locks.len(), 1);
    assert_eq!(detail.progress.queue_number, Some(1));

    assert!(LockRepo::delete(&pool, specific.id).await.unwrap());
    assert!(!LockRepo::delete(&pool, specific.id).await.unwrap());
    assert!(LockRepo::find_by_id(&pool, specific.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_filters_by_completion(pool: PgPool) {
    let open = LockRepo::create(&pool, 1, &pages_lock(LockTarget::MediaType(MediaType::Book), 50))
        .await
        .unwrap();
    let done = LockRepo::create(
        &pool,
        1,
        &pages_lock(LockTarget::Category("Sci-Fi".to_string()), 10),
    )
    .await
    .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let aggregate = LockAggregate {
        completed_time: 0,
        secondary_completed: 10,
    };
    LockRepo::apply_aggregate(&mut tx, done.id, &aggregate, true)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let completed = LockRepo::list_for_user(&pool, 1, LockListFilter { completed: Some(true) })
        .await
        .unwrap();
    assert_eq!(completed.iter().map(|l| l.id).collect::<Vec<_>>(), vec![done.id]);

    let pending = LockRepo::list_for_user(&pool, 1, LockListFilter { completed: Some(false) })
        .await
        .unwrap();
    assert_eq!(pending.iter().map(|l| l.id).collect::<Vec<_>>(), vec![open.id]);

    let other_user = LockRepo::list_for_user(&pool, 2, LockListFilter::default())
        .await
        .unwrap();
    assert!(other_user.is_empty());
}

// ---------------------------------------------------------------------------
// Test: one-way completion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_apply_aggregate_completes_once(pool: PgPool) {
    let lock = LockRepo::create(&pool, 1, &pages_lock(LockTarget::MediaType(MediaType::Book), 100))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let partial = LockAggregate {
        completed_time: 0,
        secondary_completed: 60,
    };
    let progressed = LockRepo::apply_aggregate(&mut tx, lock.id, &partial, false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progressed.pages_completed, 60);
    assert!(!progressed.completed);

    let full = LockAggregate {
        completed_time: 0,
        secondary_completed: 120,
    };
    let completed = LockRepo::apply_aggregate(&mut tx, lock.id, &full, true)
        .await
        .unwrap()
        .unwrap();
    assert!(completed.completed);
    assert!(completed.completed_at.is_some());

    // A completed lock is never touched again.
    let again = LockRepo::apply_aggregate(&mut tx, lock.id, &partial, false)
        .await
        .unwrap();
    assert!(again.is_none());
    tx.commit().await.unwrap();

    let open = {
        let mut tx = pool.begin().await.unwrap();
        let open = LockRepo::list_open_for_update(&mut tx, 1).await.unwrap();
        tx.commit().await.unwrap();
        open
    };
    assert!(open.is_empty());
}

// ---------------------------------------------------------------------------
// Test: storage constraints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_lock_requires_single_target(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO locks (user_id, title, lock_type, target_item_id, target_selector) \
         VALUES (1, 'broken', 'category', NULL, NULL)",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_item_removes_its_specific_locks(pool: PgPool) {
    let item_id = create_book(&pool, 1).await;
    let lock = LockRepo::create(&pool, 1, &pages_lock(LockTarget::Specific(item_id), 100))
        .await
        .unwrap();

    sqlx::query("DELETE FROM media_items WHERE id = $1")
        .bind(item_id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(LockRepo::find_by_id(&pool, lock.id).await.unwrap().is_none());
}
