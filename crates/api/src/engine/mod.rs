//! Queue and progress engine.
//!
//! Each operation runs in one transaction that first takes the acting
//! user's advisory lock, validates against freshly read rows, applies the
//! pure planning functions from `backlog_core`, and writes every affected
//! row before committing. Dropping the future rolls the transaction back.

pub mod propagation;
pub mod reorder;
pub mod retry;

pub use propagation::{apply_progress, ClientBaseline, ProgressCommand, PropagationOutcome};
pub use reorder::{reorder, ReorderOutcome};
pub use retry::read_with_retry;
