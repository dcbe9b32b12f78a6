//! Progress values for a single media item and server-side deltas.
//!
//! Deltas are always computed against the stored record, never against
//! "before" values supplied by a client.

use serde::Serialize;

use crate::error::CoreError;
use crate::media::{MediaType, SecondaryMetric};

/// Absolute progress counters of one item, as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressValues {
    pub completed_duration: i32,
    pub pages_completed: i32,
    pub units_completed: i32,
    pub completed: bool,
}

/// A secondary counter value tagged with what it counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SecondaryAmount {
    pub metric: SecondaryMetric,
    pub amount: i32,
}

impl ProgressValues {
    /// The secondary counter relevant to `media_type`, if it has one.
    pub fn secondary(&self, media_type: MediaType) -> Option<SecondaryAmount> {
        media_type.secondary_metric().map(|metric| SecondaryAmount {
            metric,
            amount: match metric {
                SecondaryMetric::Pages => self.pages_completed,
                SecondaryMetric::Units => self.units_completed,
            },
        })
    }
}

/// New absolute values requested for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressUpdate {
    pub completed_duration: i32,
    pub pages_completed: Option<i32>,
    pub units_completed: Option<i32>,
    pub completed: bool,
}

/// Change in an item's progress caused by one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressDelta {
    pub time: i32,
    pub secondary: Option<SecondaryAmount>,
}

impl ProgressDelta {
    pub fn is_zero(&self) -> bool {
        self.time == 0 && self.secondary.map_or(true, |s| s.amount == 0)
    }
}

/// Merge a requested update into the stored values.
///
/// The requested values are absolute. A secondary counter that does not
/// apply to the item's media type is ignored, and an omitted one keeps its
/// stored value. `completed` never reverts from `true`.
pub fn merge_update(
    media_type: MediaType,
    previous: &ProgressValues,
    update: &ProgressUpdate,
) -> Result<ProgressValues, CoreError> {
    ensure_non_negative("completed_duration", Some(update.completed_duration))?;
    ensure_non_negative("pages_completed", update.pages_completed)?;
    ensure_non_negative("units_completed", update.units_completed)?;

    let mut next = ProgressValues {
        completed_duration: update.completed_duration,
        completed: previous.completed || update.completed,
        ..*previous
    };

    match media_type.secondary_metric() {
        Some(SecondaryMetric::Pages) => {
            next.pages_completed = update.pages_completed.unwrap_or(previous.pages_completed);
        }
        Some(SecondaryMetric::Units) => {
            next.units_completed = update.units_completed.unwrap_or(previous.units_completed);
        }
        None => {}
    }

    Ok(next)
}

/// Difference between two snapshots of the same item.
pub fn compute_delta(
    media_type: MediaType,
    previous: &ProgressValues,
    next: &ProgressValues,
) -> ProgressDelta {
    let secondary = match (previous.secondary(media_type), next.secondary(media_type)) {
        (Some(before), Some(after)) => Some(SecondaryAmount {
            metric: after.metric,
            amount: after.amount - before.amount,
        }),
        _ => None,
    };

    ProgressDelta {
        time: next.completed_duration - previous.completed_duration,
        secondary,
    }
}

/// Target amount for a new item, in the item's own unit.
///
/// Books are measured in pages, tasks in units, shows in episodes, and
/// everything else in minutes of runtime. Missing detail yields zero.
pub fn initial_duration(
    media_type: MediaType,
    runtime_minutes: Option<i32>,
    page_count: Option<i32>,
    episode_count: Option<i32>,
    unit_count: Option<i32>,
) -> i32 {
    let value = match media_type {
        MediaType::Book => page_count,
        MediaType::Task => unit_count,
        MediaType::Tv => episode_count.or(runtime_minutes),
        MediaType::Movie | MediaType::Game => runtime_minutes,
    };
    value.unwrap_or(0).max(0)
}

fn ensure_non_negative(field: &str, value: Option<i32>) -> Result<(), CoreError> {
    match value {
        Some(v) if v < 0 => Err(CoreError::Validation(format!(
            "{field} must not be negative"
        ))),
        _ => Ok(()),
    }
}
