//! Post-commit notification relay.
//!
//! - [`relay::NotificationRelay`] -- consumes completion events from the
//!   event bus and hands them to a [`relay::NotificationSink`].

pub mod relay;

pub use relay::{NotificationRelay, NotificationSink, TracingSink};
