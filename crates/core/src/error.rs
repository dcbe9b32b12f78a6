use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Not owner: {entity} with id {id} belongs to another user")]
    NotOwner { entity: &'static str, id: DbId },

    #[error("Invalid position {position}: must be between 1 and {max}")]
    InvalidPosition { position: i64, max: i64 },

    #[error("Ambiguous target: provide either an item id or a selector, not both")]
    AmbiguousTarget,

    #[error("Missing target: provide an item id or a selector")]
    MissingTarget,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Entity name used for media item lookups.
pub const ENTITY_MEDIA_ITEM: &str = "MediaItem";

/// Entity name used for lock lookups.
pub const ENTITY_LOCK: &str = "Lock";

impl CoreError {
    /// Stable machine-readable kind, surfaced as the `code` field of error
    /// responses.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::NotFound { entity, .. } if *entity == ENTITY_MEDIA_ITEM => "ITEM_NOT_FOUND",
            CoreError::NotFound { entity, .. } if *entity == ENTITY_LOCK => "LOCK_NOT_FOUND",
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::NotOwner { .. } => "NOT_OWNER",
            CoreError::InvalidPosition { .. } => "INVALID_POSITION",
            CoreError::AmbiguousTarget => "AMBIGUOUS_TARGET",
            CoreError::MissingTarget => "MISSING_TARGET",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Unauthorized(_) => "UNAUTHORIZED",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn item_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: ENTITY_MEDIA_ITEM,
            id,
        }
    }

    pub fn lock_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: ENTITY_LOCK,
            id,
        }
    }
}

/// Check that `owner_id` matches the acting user.
///
/// Callers look the entity up first; this only runs for rows that exist.
pub fn ensure_owner(
    entity: &'static str,
    id: DbId,
    owner_id: DbId,
    acting_user_id: DbId,
) -> Result<(), CoreError> {
    if owner_id == acting_user_id {
        Ok(())
    } else {
        Err(CoreError::NotOwner { entity, id })
    }
}
