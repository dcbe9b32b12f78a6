//! Applying an update to a matched lock and deciding completion.
//!
//! Completion is one-way: a lock that is already complete is left
//! untouched, and a lock transitions at most once.

use crate::lock::{LockAggregate, LockGoals, LockState};
use crate::lock_matching::Contribution;
use crate::media::{MediaType, SecondaryMetric};
use crate::progress::{ProgressDelta, ProgressValues};

/// Result of evaluating one lock against one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// The lock was already complete; nothing is written.
    Skipped,
    /// New aggregate, goal not yet reached.
    Progressed(LockAggregate),
    /// New aggregate, and the lock becomes complete now.
    Completed(LockAggregate),
}

impl LockOutcome {
    pub fn aggregate(&self) -> Option<LockAggregate> {
        match self {
            LockOutcome::Skipped => None,
            LockOutcome::Progressed(agg) | LockOutcome::Completed(agg) => Some(*agg),
        }
    }

    pub fn is_newly_completed(&self) -> bool {
        matches!(self, LockOutcome::Completed(_))
    }
}

/// Fold an update into a lock's aggregate.
///
/// `Absolute` replaces the totals with the item's current values;
/// `Delta` adds the change. Totals stay within `0..=i32::MAX`.
pub fn contribute(
    aggregate: LockAggregate,
    contribution: Contribution,
    media_type: MediaType,
    next: &ProgressValues,
    delta: &ProgressDelta,
) -> LockAggregate {
    match contribution {
        Contribution::Absolute => LockAggregate {
            completed_time: next.completed_duration,
            secondary_completed: next
                .secondary(media_type)
                .map_or(aggregate.secondary_completed, |s| s.amount),
        },
        Contribution::Delta => LockAggregate {
            completed_time: aggregate.completed_time.saturating_add(delta.time).max(0),
            secondary_completed: aggregate
                .secondary_completed
                .saturating_add(delta.secondary.map_or(0, |s| s.amount))
                .max(0),
        },
    }
}

/// Whether `aggregate` satisfies the goal family selected by `media_type`.
///
/// Books compare pages against `goal_pages`, tasks compare units against
/// `goal_units`, everything else compares time against `goal_time`. When
/// the selected goal is unset, only an `Absolute` lock whose item is
/// complete counts as met.
pub fn goal_met(
    goals: &LockGoals,
    aggregate: &LockAggregate,
    media_type: MediaType,
    contribution: Contribution,
    item_completed: bool,
) -> bool {
    let secondary = aggregate.secondary_completed;
    let threshold = match media_type.secondary_metric() {
        Some(SecondaryMetric::Pages) => goals.goal_pages.map(|g| secondary >= g),
        Some(SecondaryMetric::Units) => goals.goal_units.map(|g| secondary >= g),
        None => goals.goal_time.map(|g| aggregate.completed_time >= g),
    };

    threshold.unwrap_or(contribution == Contribution::Absolute && item_completed)
}

/// Evaluate one matched lock against an update to an item of `media_type`.
pub fn evaluate(
    lock: &LockState,
    contribution: Contribution,
    media_type: MediaType,
    next: &ProgressValues,
    delta: &ProgressDelta,
) -> LockOutcome {
    if lock.completed {
        return LockOutcome::Skipped;
    }

    let aggregate = contribute(lock.aggregate, contribution, media_type, next, delta);
    if goal_met(&lock.goals, &aggregate, media_type, contribution, next.completed) {
        LockOutcome::Completed(aggregate)
    } else {
        LockOutcome::Progressed(aggregate)
    }
}
