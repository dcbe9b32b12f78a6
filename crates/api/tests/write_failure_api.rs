//! Integration tests for failures inside an engine's write phase.
//!
//! A trigger makes one table refuse updates, so the failure lands after
//! earlier writes of the same request have already succeeded.
//!
//! - A failed progress update leaves progress, ranks and locks untouched
//! - A failed reorder leaves ranks untouched

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use backlog_events::EventBus;
use common::{body_json, create_item, create_lock, get_as, put_json, queue_of};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn refuse_updates_on(pool: &PgPool, table: &str) {
    sqlx::query(
        "CREATE OR REPLACE FUNCTION refuse_update() RETURNS TRIGGER AS $$ \
         BEGIN RAISE EXCEPTION 'update refused'; END; \
         $$ LANGUAGE plpgsql",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(&format!(
        "CREATE TRIGGER refuse_update BEFORE UPDATE ON {table} \
         FOR EACH ROW EXECUTE FUNCTION refuse_update()"
    ))
    .execute(pool)
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Test: progress propagation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_lock_write_rolls_back_progress_and_ranks(pool: PgPool) {
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let app = common::build_test_app_with_bus(pool.clone(), Arc::clone(&bus));

    let first =
        create_item(app.clone(), 1, json!({ "media_type": "movie", "title": "Heat" })).await;
    let second =
        create_item(app.clone(), 1, json!({ "media_type": "movie", "title": "Ran" })).await;
    let lock_id = create_lock(
        app.clone(),
        1,
        json!({ "target_selector": "movie", "goal_time": 60 }),
    )
    .await;

    // The progress write and the queue retirement succeed; the lock write
    // that follows them does not.
    refuse_updates_on(&pool, "locks").await;

    let response = put_json(
        app.clone(),
        "/api/v1/media-items/progress",
        1,
        json!({ "id": first, "completed_duration": 170, "completed": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PROPAGATION_FAILED");
    assert!(
        !json["error"].as_str().unwrap().contains("update refused"),
        "store errors stay out of the response: {json}"
    );

    let detail = body_json(get_as(app.clone(), &format!("/api/v1/media-items/{first}"), 1).await)
        .await;
    let progress = &detail["data"]["progress"];
    assert_eq!(progress["completed_duration"], 0);
    assert_eq!(progress["completed"], false);
    assert_eq!(progress["queue_number"], 1);

    assert_eq!(queue_of(app.clone(), 1).await, vec![(first, 1), (second, 2)]);

    let lock = body_json(get_as(app, &format!("/api/v1/locks/{lock_id}"), 1).await).await;
    assert_eq!(lock["data"]["completed_time"], 0);
    assert_eq!(lock["data"]["completed"], false);

    assert!(rx.try_recv().is_err(), "nothing is published for a rolled-back update");
}

// ---------------------------------------------------------------------------
// Test: queue reorder
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_rank_write_leaves_queue_unchanged(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let mut ids = Vec::new();
    for title in ["Heat", "Ran", "Ikiru"] {
        let body = json!({ "media_type": "movie", "title": title });
        ids.push(create_item(app.clone(), 1, body).await);
    }

    refuse_updates_on(&pool, "progress_records").await;

    let response = put_json(
        app.clone(),
        &format!("/api/v1/media-items/{}/queue-position", ids[2]),
        1,
        json!({ "position": "top" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "REORDER_FAILED");

    assert_eq!(queue_of(app, 1).await, vec![(ids[0], 1), (ids[1], 2), (ids[2], 3)]);
}
