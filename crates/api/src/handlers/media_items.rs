//! Handlers for the `/media-items` resource.
//!
//! Creation and listing are plain repository calls; moving an item in the
//! queue and recording progress go through the engine.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use backlog_core::error::{ensure_owner, CoreError, ENTITY_MEDIA_ITEM};
use backlog_core::media::normalize_category;
use backlog_core::progress::{initial_duration, ProgressUpdate};
use backlog_core::queue::QueueTarget;
use backlog_core::types::DbId;
use backlog_db::models::media_item::{CreateMediaItem, NewMediaItem};
use backlog_db::repositories::MediaItemRepo;
use backlog_events::{PlatformEvent, LOCK_COMPLETED, MEDIA_ITEM_COMPLETED};
use serde::Deserialize;

use crate::engine::{self, read_with_retry, ClientBaseline, ProgressCommand, PropagationOutcome};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::extract::{AppJson, AppPath};
use crate::response::{DataResponse, ProgressResponse, SuccessResponse, UnlockedItem};
use crate::state::AppState;

/// Maximum length of an item title.
const MAX_TITLE_LEN: usize = 500;

/// Request body for `PUT /media-items/{id}/queue-position`.
#[derive(Debug, Deserialize)]
pub struct QueuePositionRequest {
    pub position: QueueTarget,
}

/// Request body for `PUT /media-items/progress`.
///
/// The `initial_*`, `media_type` and `category` fields are accepted from
/// older clients but never drive the update.
#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub id: DbId,
    pub completed_duration: i32,
    pub initial_duration: Option<i32>,
    pub completed: bool,
    pub pages_completed: Option<i32>,
    pub initial_pages: Option<i32>,
    pub units_completed: Option<i32>,
    pub initial_units: Option<i32>,
    pub media_type: Option<String>,
    pub category: Option<String>,
}

impl ProgressRequest {
    fn into_command(self) -> ProgressCommand {
        ProgressCommand {
            item_id: self.id,
            update: ProgressUpdate {
                completed_duration: self.completed_duration,
                pages_completed: self.pages_completed,
                units_completed: self.units_completed,
                completed: self.completed,
            },
            baseline: ClientBaseline {
                duration: self.initial_duration,
                pages: self.initial_pages,
                units: self.initial_units,
                media_type: self.media_type,
                category: self.category,
            },
        }
    }
}

/// Validate a creation request into an insertable item.
fn validate_create(input: CreateMediaItem) -> Result<NewMediaItem, CoreError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }

    for (name, value) in [
        ("runtime_minutes", input.runtime_minutes),
        ("page_count", input.page_count),
        ("episode_count", input.episode_count),
        ("unit_count", input.unit_count),
        ("duration", input.duration),
    ] {
        if value.is_some_and(|v| v < 0) {
            return Err(CoreError::Validation(format!("{name} must not be negative")));
        }
    }

    let duration = input.duration.unwrap_or_else(|| {
        initial_duration(
            input.media_type,
            input.runtime_minutes,
            input.page_count,
            input.episode_count,
            input.unit_count,
        )
    });

    Ok(NewMediaItem {
        media_type: input.media_type,
        title: title.to_string(),
        category: normalize_category(input.category.as_deref())?,
        runtime_minutes: input.runtime_minutes,
        page_count: input.page_count,
        episode_count: input.episode_count,
        unit_count: input.unit_count,
        duration,
    })
}

/// Publish the post-commit events of a progress update.
fn publish_completions(state: &AppState, user_id: DbId, outcome: &PropagationOutcome) {
    if outcome.item_completed {
        state.event_bus.publish(
            PlatformEvent::new(MEDIA_ITEM_COMPLETED)
                .with_source("media_item", outcome.item.item.id)
                .with_actor(user_id)
                .with_payload(serde_json::json!({ "title": outcome.item.item.title })),
        );
    }

    for lock in &outcome.newly_completed {
        state.event_bus.publish(
            PlatformEvent::new(LOCK_COMPLETED)
                .with_source("lock", lock.id)
                .with_actor(user_id)
                .with_payload(serde_json::json!({
                    "title": lock.title,
                    "lock_type": lock.lock_type,
                })),
        );
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/media-items
///
/// Add an item to the caller's backlog, queued at the bottom.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateMediaItem>,
) -> AppResult<impl IntoResponse> {
    let new_item = validate_create(input)?;
    let created = MediaItemRepo::create(&state.pool, auth.user_id, &new_item).await?;

    tracing::info!(
        user_id = auth.user_id,
        item_id = created.item.id,
        media_type = %new_item.media_type,
        queue_number = ?created.progress.queue_number,
        "Media item created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/media-items
///
/// The caller's items in queue order, completed items last.
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let items = read_with_retry("media_item.list_for_user", || {
        MediaItemRepo::list_for_user(&state.pool, auth.user_id)
    })
    .await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/media-items/{id}
///
/// One item with its progress and the locks that target it.
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = read_with_retry("media_item.find_detail", || {
        MediaItemRepo::find_detail(&state.pool, id)
    })
    .await?
    .ok_or_else(|| CoreError::item_not_found(id))?;
    ensure_owner(ENTITY_MEDIA_ITEM, id, detail.item.user_id, auth.user_id)?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/media-items/{id}/queue-position
///
/// Move an item to `"top"`, `"bottom"`, or a 1-based position.
pub async fn update_queue_position(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(body): AppJson<QueuePositionRequest>,
) -> AppResult<impl IntoResponse> {
    engine::reorder(&state.pool, auth.user_id, id, body.position).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// PUT /api/v1/media-items/progress
///
/// Record new absolute progress for an item and propagate it to the
/// caller's locks. Returns the updated item and the locks completed by
/// this update.
pub async fn update_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<ProgressRequest>,
) -> AppResult<impl IntoResponse> {
    let command = body.into_command();
    let outcome = engine::apply_progress(&state.pool, auth.user_id, &command).await?;

    publish_completions(&state, auth.user_id, &outcome);

    let newly_unlocked_items = outcome.newly_completed.iter().map(UnlockedItem::from).collect();
    Ok(Json(ProgressResponse {
        success: true,
        updated_item: outcome.item,
        newly_unlocked_items,
    }))
}
