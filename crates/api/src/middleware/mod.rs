//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the acting user, from the bearer token.
//! - [`extract`] -- JSON body, query and path extractors whose rejections
//!   use the API error envelope.

pub mod auth;
pub mod extract;
