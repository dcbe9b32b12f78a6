//! Goal ("lock") targets, thresholds, and running aggregates.
//!
//! A lock targets exactly one of: a specific media item, every item of a
//! media type, or every item in a category. The target is resolved once,
//! when the lock is created or loaded, into a [`LockTarget`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::media::{self, MediaType};
use crate::types::DbId;

/// Maximum length of a lock title.
pub const MAX_TITLE_LEN: usize = 200;

/// Stored discriminator of a lock's target form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockType {
    Specific,
    MediaType,
    Category,
}

impl LockType {
    pub fn as_str(self) -> &'static str {
        match self {
            LockType::Specific => "specific",
            LockType::MediaType => "media_type",
            LockType::Category => "category",
        }
    }

    /// Matching priority: specific first, then media type, then category.
    pub fn priority(self) -> u8 {
        match self {
            LockType::Specific => 0,
            LockType::MediaType => 1,
            LockType::Category => 2,
        }
    }
}

impl fmt::Display for LockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "specific" => Ok(LockType::Specific),
            "media_type" => Ok(LockType::MediaType),
            "category" => Ok(LockType::Category),
            other => Err(CoreError::Internal(format!("Unknown lock type '{other}'"))),
        }
    }
}

/// What a lock aggregates progress over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockTarget {
    Specific(DbId),
    MediaType(MediaType),
    Category(String),
}

impl LockTarget {
    /// Resolve a creation request into a target.
    ///
    /// Exactly one of `item_id` and `selector` must be given; a blank
    /// selector counts as absent. A selector naming a media type yields a
    /// media-type lock, any other selector a category lock.
    pub fn resolve(item_id: Option<DbId>, selector: Option<&str>) -> Result<Self, CoreError> {
        let selector = selector.map(str::trim).filter(|s| !s.is_empty());

        match (item_id, selector) {
            (Some(_), Some(_)) => Err(CoreError::AmbiguousTarget),
            (None, None) => Err(CoreError::MissingTarget),
            (Some(id), None) => Ok(LockTarget::Specific(id)),
            (None, Some(sel)) => match MediaType::from_selector(sel) {
                Some(media_type) => Ok(LockTarget::MediaType(media_type)),
                None => Ok(LockTarget::Category(media::normalize_category(Some(sel))?)),
            },
        }
    }

    /// Rebuild a target from its stored columns.
    pub fn from_stored(
        lock_type: &str,
        item_id: Option<DbId>,
        selector: Option<&str>,
    ) -> Result<Self, CoreError> {
        let corrupt = || CoreError::Internal(format!("Stored {lock_type} lock has no target"));
        match lock_type.parse::<LockType>()? {
            LockType::Specific => item_id.map(LockTarget::Specific).ok_or_else(corrupt),
            LockType::MediaType => {
                let sel = selector.ok_or_else(corrupt)?;
                sel.parse::<MediaType>().map(LockTarget::MediaType).map_err(|_| {
                    CoreError::Internal(format!("Stored media type '{sel}' is invalid"))
                })
            }
            LockType::Category => selector
                .map(|s| LockTarget::Category(s.to_string()))
                .ok_or_else(corrupt),
        }
    }

    pub fn lock_type(&self) -> LockType {
        match self {
            LockTarget::Specific(_) => LockType::Specific,
            LockTarget::MediaType(_) => LockType::MediaType,
            LockTarget::Category(_) => LockType::Category,
        }
    }

    /// Value of the `target_item_id` column.
    pub fn item_id(&self) -> Option<DbId> {
        match self {
            LockTarget::Specific(id) => Some(*id),
            _ => None,
        }
    }

    /// Value of the `target_selector` column.
    pub fn selector(&self) -> Option<&str> {
        match self {
            LockTarget::Specific(_) => None,
            LockTarget::MediaType(media_type) => Some(media_type.as_str()),
            LockTarget::Category(category) => Some(category),
        }
    }

    /// Title used when the user does not name the lock.
    pub fn default_title(&self, item_title: Option<&str>) -> String {
        match self {
            LockTarget::Specific(id) => match item_title {
                Some(title) => format!("Finish {title}"),
                None => format!("Finish item #{id}"),
            },
            LockTarget::MediaType(media_type) => format!("All {media_type} items"),
            LockTarget::Category(category) => format!("Category: {category}"),
        }
    }
}

/// Thresholds of a lock. Which one applies depends on the media type of
/// the item contributing progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockGoals {
    pub goal_time: Option<i32>,
    pub goal_pages: Option<i32>,
    pub goal_units: Option<i32>,
}

impl LockGoals {
    pub fn is_empty(&self) -> bool {
        self.goal_time.is_none() && self.goal_pages.is_none() && self.goal_units.is_none()
    }

    /// Goals must be positive. Aggregating locks need at least one goal;
    /// a specific lock without one completes with its item.
    pub fn validate(&self, lock_type: LockType) -> Result<(), CoreError> {
        for (name, value) in [
            ("goal_time", self.goal_time),
            ("goal_pages", self.goal_pages),
            ("goal_units", self.goal_units),
        ] {
            if let Some(v) = value {
                if v <= 0 {
                    return Err(CoreError::Validation(format!("{name} must be positive")));
                }
            }
        }

        if self.is_empty() && lock_type != LockType::Specific {
            return Err(CoreError::Validation(format!(
                "A {lock_type} lock needs at least one of goal_time, goal_pages, goal_units"
            )));
        }
        Ok(())
    }
}

/// Running totals of a lock. `secondary_completed` holds pages or units,
/// depending on what the contributing items count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockAggregate {
    pub completed_time: i32,
    pub secondary_completed: i32,
}

/// The state of one lock needed to match and evaluate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockState {
    pub id: DbId,
    pub target: LockTarget,
    pub goals: LockGoals,
    pub aggregate: LockAggregate,
    pub completed: bool,
}

/// Validate and normalise an optional user-supplied title.
pub fn normalize_title(title: Option<&str>) -> Result<Option<String>, CoreError> {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) if t.chars().count() > MAX_TITLE_LEN => Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        ))),
        Some(t) => Ok(Some(t.to_string())),
        None => Ok(None),
    }
}
