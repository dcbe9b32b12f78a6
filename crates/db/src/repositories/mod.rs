//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Single-statement methods accept `&PgPool`; methods that must run inside
//! a caller-owned unit of work accept `&mut Transaction<'_, Postgres>`.

pub mod lock_repo;
pub mod media_item_repo;
pub mod progress_repo;
pub mod queue_repo;

pub use lock_repo::LockRepo;
pub use media_item_repo::MediaItemRepo;
pub use progress_repo::ProgressRepo;
pub use queue_repo::QueueRepo;
