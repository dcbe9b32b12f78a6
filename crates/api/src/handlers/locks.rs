//! Handlers for the `/locks` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use backlog_core::error::{ensure_owner, CoreError, ENTITY_LOCK, ENTITY_MEDIA_ITEM};
use backlog_core::lock::{normalize_title, LockTarget};
use backlog_core::types::DbId;
use backlog_db::models::lock::{CreateLock, Lock, LockListFilter, NewLock};
use backlog_db::repositories::{LockRepo, MediaItemRepo};
use sqlx::PgPool;

use crate::engine::read_with_retry;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::extract::{AppJson, AppPath, AppQuery};
use crate::response::DataResponse;
use crate::state::AppState;

/// Load a lock and verify the caller owns it.
async fn find_and_authorize(pool: &PgPool, id: DbId, auth: &AuthUser) -> AppResult<Lock> {
    let lock = read_with_retry("lock.find_by_id", || LockRepo::find_by_id(pool, id))
        .await?
        .ok_or_else(|| CoreError::lock_not_found(id))?;
    ensure_owner(ENTITY_LOCK, id, lock.user_id, auth.user_id)?;
    Ok(lock)
}

/// Resolve and validate a creation request.
///
/// Target shape is checked first, so an ambiguous request never touches
/// the store.
async fn resolve_new_lock(
    pool: &PgPool,
    auth: &AuthUser,
    input: &CreateLock,
) -> AppResult<NewLock> {
    let target = LockTarget::resolve(input.target_item_id, input.target_selector.as_deref())?;
    let goals = input.goals();
    goals.validate(target.lock_type())?;
    let title = normalize_title(input.title.as_deref())?;

    let item_title = match target {
        LockTarget::Specific(item_id) => {
            let item = MediaItemRepo::find_by_id(pool, item_id)
                .await?
                .ok_or_else(|| CoreError::item_not_found(item_id))?;
            ensure_owner(ENTITY_MEDIA_ITEM, item_id, item.user_id, auth.user_id)?;
            Some(item.title)
        }
        LockTarget::MediaType(_) | LockTarget::Category(_) => None,
    };

    let title = title.unwrap_or_else(|| target.default_title(item_title.as_deref()));
    Ok(NewLock {
        title,
        target,
        goals,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/locks
///
/// Create a lock on one item (`target_item_id`) or on a media type or
/// category (`target_selector`). Exactly one target must be given.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateLock>,
) -> AppResult<impl IntoResponse> {
    let new_lock = resolve_new_lock(&state.pool, &auth, &input).await?;
    let lock = LockRepo::create(&state.pool, auth.user_id, &new_lock).await?;

    tracing::info!(
        user_id = auth.user_id,
        lock_id = lock.id,
        lock_type = %lock.lock_type,
        "Lock created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: lock })))
}

/// GET /api/v1/locks?completed=
///
/// The caller's locks, newest first, optionally filtered by completion.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<LockListFilter>,
) -> AppResult<impl IntoResponse> {
    let locks = read_with_retry("lock.list_for_user", || {
        LockRepo::list_for_user(&state.pool, auth.user_id, filter)
    })
    .await?;
    Ok(Json(DataResponse { data: locks }))
}

/// GET /api/v1/locks/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let lock = find_and_authorize(&state.pool, id, &auth).await?;
    Ok(Json(DataResponse { data: lock }))
}

/// DELETE /api/v1/locks/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    find_and_authorize(&state.pool, id, &auth).await?;

    if LockRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, lock_id = id, "Lock deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::lock_not_found(id).into())
    }
}
