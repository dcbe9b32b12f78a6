//! Backlog event bus.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope.
//! - Event type names published by the engine ([`LOCK_COMPLETED`],
//!   [`MEDIA_ITEM_COMPLETED`]).

pub mod bus;

pub use bus::{EventBus, PlatformEvent, DEFAULT_CAPACITY, LOCK_COMPLETED, MEDIA_ITEM_COMPLETED};
