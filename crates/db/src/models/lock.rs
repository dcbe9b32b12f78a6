//! Lock (goal) entity model and DTOs.

use backlog_core::error::CoreError;
use backlog_core::lock::{LockAggregate, LockGoals, LockState, LockTarget};
use backlog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `locks` table.
///
/// `pages_completed` is the secondary aggregate: pages for books, units
/// for tasks.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lock {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub lock_type: String,
    pub target_item_id: Option<DbId>,
    pub target_selector: Option<String>,
    pub goal_time: Option<i32>,
    pub goal_pages: Option<i32>,
    pub goal_units: Option<i32>,
    pub completed_time: i32,
    pub pages_completed: i32,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lock {
    pub fn target(&self) -> Result<LockTarget, CoreError> {
        LockTarget::from_stored(
            &self.lock_type,
            self.target_item_id,
            self.target_selector.as_deref(),
        )
    }

    pub fn goals(&self) -> LockGoals {
        LockGoals {
            goal_time: self.goal_time,
            goal_pages: self.goal_pages,
            goal_units: self.goal_units,
        }
    }

    pub fn aggregate(&self) -> LockAggregate {
        LockAggregate {
            completed_time: self.completed_time,
            secondary_completed: self.pages_completed,
        }
    }

    /// The pure view used for matching and completion.
    pub fn state(&self) -> Result<LockState, CoreError> {
        Ok(LockState {
            id: self.id,
            target: self.target()?,
            goals: self.goals(),
            aggregate: self.aggregate(),
            completed: self.completed,
        })
    }
}

/// Request DTO for creating a lock.
///
/// Exactly one of `target_item_id` and `target_selector` must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLock {
    pub target_item_id: Option<DbId>,
    pub target_selector: Option<String>,
    pub title: Option<String>,
    pub goal_time: Option<i32>,
    pub goal_pages: Option<i32>,
    pub goal_units: Option<i32>,
}

impl CreateLock {
    pub fn goals(&self) -> LockGoals {
        LockGoals {
            goal_time: self.goal_time,
            goal_pages: self.goal_pages,
            goal_units: self.goal_units,
        }
    }
}

/// A validated lock ready to insert.
#[derive(Debug, Clone)]
pub struct NewLock {
    pub title: String,
    pub target: LockTarget,
    pub goals: LockGoals,
}

/// Query filter for listing locks.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LockListFilter {
    pub completed: Option<bool>,
}
