//! Dense queue ranking.
//!
//! A user's active (non-completed) items carry ranks that are exactly
//! `{1, 2, ..., N}`. Every operation here takes the current queue, ordered
//! by rank, and returns the minimal set of [`RankChange`]s that keeps the
//! rank space dense. The functions are pure; the caller applies the changes
//! atomically.

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::{DbId, Rank};

/// Where a queued item should move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTarget")]
pub enum QueueTarget {
    Top,
    Bottom,
    /// 1-indexed absolute position.
    Position(i64),
}

/// Wire form: `"top"`, `"bottom"`, an integer, or an integer in a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Number(i64),
    Text(String),
}

impl TryFrom<RawTarget> for QueueTarget {
    type Error = CoreError;

    fn try_from(raw: RawTarget) -> Result<Self, Self::Error> {
        match raw {
            RawTarget::Number(n) => Ok(QueueTarget::Position(n)),
            RawTarget::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("top") {
                    Ok(QueueTarget::Top)
                } else if text.eq_ignore_ascii_case("bottom") {
                    Ok(QueueTarget::Bottom)
                } else {
                    text.parse::<i64>().map(QueueTarget::Position).map_err(|_| {
                        CoreError::Validation(format!(
                            "Invalid position '{text}'. Expected \"top\", \"bottom\", or an integer"
                        ))
                    })
                }
            }
        }
    }
}

/// An item's current rank as read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSlot {
    pub item_id: DbId,
    pub rank: Rank,
}

/// A rank that must be written for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankChange {
    pub item_id: DbId,
    pub rank: Rank,
}

/// Rank given to an item appended to a queue of `active_count` items.
pub fn next_rank(active_count: usize) -> Rank {
    to_rank(active_count + 1)
}

/// Resolve a target to a 1-based rank within a queue of `len` items.
///
/// `Position(n)` must satisfy `1 <= n <= len`.
pub fn resolve_target(target: QueueTarget, len: usize) -> Result<Rank, CoreError> {
    match target {
        QueueTarget::Top => Ok(1),
        QueueTarget::Bottom => Ok(to_rank(len)),
        QueueTarget::Position(n) => {
            let max = i64::try_from(len).unwrap_or(i64::MAX);
            let out_of_range = || CoreError::InvalidPosition { position: n, max };
            if !(1..=max).contains(&n) {
                return Err(out_of_range());
            }
            Rank::try_from(n).map_err(|_| out_of_range())
        }
    }
}

/// Plan moving `item_id` to `target`.
///
/// Moving to `Top` shifts the items above the old rank down by one;
/// `Bottom` shifts the items below it up by one; `Position(n)` shifts only
/// the items between the old and the new rank. Only rows whose rank
/// actually changes are returned, so an identity move yields no changes.
pub fn plan_reorder(
    queue: &[QueueSlot],
    item_id: DbId,
    target: QueueTarget,
) -> Result<Vec<RankChange>, CoreError> {
    let mut order = ordered_ids(queue);
    let old_index = order
        .iter()
        .position(|&id| id == item_id)
        .ok_or_else(|| not_queued(item_id))?;

    let new_rank = resolve_target(target, order.len())?;
    let new_index = usize::try_from(new_rank - 1).unwrap_or_default();

    if old_index != new_index {
        let moved = order.remove(old_index);
        order.insert(new_index, moved);
    }

    Ok(diff_ranks(queue, &order))
}

/// Plan removing `item_id` from the queue (the item is being retired).
///
/// Items ranked after it move up by one. The removed item itself is not in
/// the returned changes; the caller clears its rank.
pub fn plan_removal(queue: &[QueueSlot], item_id: DbId) -> Result<Vec<RankChange>, CoreError> {
    let mut order = ordered_ids(queue);
    let index = order
        .iter()
        .position(|&id| id == item_id)
        .ok_or_else(|| not_queued(item_id))?;
    order.remove(index);
    Ok(diff_ranks(queue, &order))
}

/// Returns `true` if `ranks` is exactly `{1..N}` with no duplicates.
pub fn is_dense(ranks: &[Rank]) -> bool {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.iter().enumerate().all(|(i, &r)| r == to_rank(i + 1))
}

fn ordered_ids(queue: &[QueueSlot]) -> Vec<DbId> {
    let mut slots = queue.to_vec();
    slots.sort_by_key(|s| (s.rank, s.item_id));
    slots.into_iter().map(|s| s.item_id).collect()
}

/// Compare the desired order against the stored ranks. Stored gaps or
/// duplicates are rewritten as well.
fn diff_ranks(queue: &[QueueSlot], order: &[DbId]) -> Vec<RankChange> {
    order
        .iter()
        .enumerate()
        .filter_map(|(index, &item_id)| {
            let rank = to_rank(index + 1);
            let stored = queue.iter().find(|s| s.item_id == item_id).map(|s| s.rank);
            (stored != Some(rank)).then_some(RankChange { item_id, rank })
        })
        .collect()
}

fn not_queued(item_id: DbId) -> CoreError {
    CoreError::Validation(format!("Media item {item_id} is not in the queue"))
}

fn to_rank(n: usize) -> Rank {
    Rank::try_from(n).unwrap_or(Rank::MAX)
}
