//! Domain logic for the media backlog service.
//!
//! Pure, database-free building blocks shared by the repository layer in
//! `backlog_db` and the HTTP service in `backlog_api`:
//!
//! - [`queue`] -- dense `1..N` rank arithmetic for a user's queue.
//! - [`progress`] -- progress values and server-side delta computation.
//! - [`lock`] -- goal ("lock") targets, goals, and aggregates.
//! - [`lock_matching`] -- selecting the locks an update contributes to.
//! - [`completion`] -- the one-way completion decision for a lock.

pub mod completion;
pub mod error;
pub mod lock;
pub mod lock_matching;
pub mod media;
pub mod progress;
pub mod queue;
pub mod types;
