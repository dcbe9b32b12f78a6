//! Selecting the locks a progress update contributes to.

use crate::lock::{LockState, LockTarget};
use crate::media::{category_matches, MediaType};
use crate::types::DbId;

/// How an update is applied to a matched lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    /// The lock tracks this one item: store the item's absolute values.
    Absolute,
    /// The lock sums many items: add this update's delta.
    Delta,
}

/// The facts about the updated item that matching depends on.
#[derive(Debug, Clone, Copy)]
pub struct ItemFacts<'a> {
    pub item_id: DbId,
    pub media_type: MediaType,
    pub category: &'a str,
}

/// How `target` relates to `item`, or `None` if it does not match.
pub fn contribution_for(target: &LockTarget, item: &ItemFacts<'_>) -> Option<Contribution> {
    match target {
        LockTarget::Specific(id) if *id == item.item_id => Some(Contribution::Absolute),
        LockTarget::MediaType(media_type) if *media_type == item.media_type => {
            Some(Contribution::Delta)
        }
        LockTarget::Category(category) if category_matches(category, item.category) => {
            Some(Contribution::Delta)
        }
        _ => None,
    }
}

/// Open locks that match `item`, in priority order: the item's own locks,
/// then media-type locks, then category locks (ties by id).
///
/// Completed locks are never returned.
pub fn select_matches<'l>(
    locks: &'l [LockState],
    item: &ItemFacts<'_>,
) -> Vec<(&'l LockState, Contribution)> {
    let mut matched: Vec<_> = locks
        .iter()
        .filter(|lock| !lock.completed)
        .filter_map(|lock| contribution_for(&lock.target, item).map(|c| (lock, c)))
        .collect();
    matched.sort_by_key(|(lock, _)| (lock.target.lock_type().priority(), lock.id));
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::{LockAggregate, LockGoals};

    fn lock(id: DbId, target: LockTarget) -> LockState {
        LockState {
            id,
            target,
            goals: LockGoals::default(),
            aggregate: LockAggregate::default(),
            completed: false,
        }
    }

    fn book(item_id: DbId, category: &str) -> ItemFacts<'_> {
        ItemFacts {
            item_id,
            media_type: MediaType::Book,
            category,
        }
    }

    #[test]
    fn matches_in_priority_order() {
        let locks = vec![
            lock(1, LockTarget::Category("Classics".into())),
            lock(2, LockTarget::MediaType(MediaType::Book)),
            lock(3, LockTarget::Specific(7)),
            lock(4, LockTarget::Specific(8)),
            lock(5, LockTarget::MediaType(MediaType::Movie)),
            lock(6, LockTarget::Category("Horror".into())),
        ];
        let matched = select_matches(&locks, &book(7, "classics"));
        let ids: Vec<_> = matched.iter().map(|(l, c)| (l.id, *c)).collect();
        assert_eq!(
            ids,
            vec![
                (3, Contribution::Absolute),
                (2, Contribution::Delta),
                (1, Contribution::Delta),
            ]
        );
    }

    #[test]
    fn completed_locks_are_skipped() {
        let mut done = lock(1, LockTarget::MediaType(MediaType::Book));
        done.completed = true;
        let locks = vec![done, lock(2, LockTarget::Specific(7))];
        let matched = select_matches(&locks, &book(7, "General"));
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].0.id, 2);
    }

    #[test]
    fn nothing_matches_unrelated_item() {
        let locks = vec![
            lock(1, LockTarget::Specific(100)),
            lock(2, LockTarget::MediaType(MediaType::Game)),
            lock(3, LockTarget::Category("Jazz".into())),
        ];
        assert!(select_matches(&locks, &book(7, "General")).is_empty());
    }
}
