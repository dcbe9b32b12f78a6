//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs where the entity is created over HTTP
//! - Conversions into the pure `backlog_core` types

pub mod lock;
pub mod media_item;
pub mod progress;
