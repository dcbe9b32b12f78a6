//! Authentication.
//!
//! This API never issues tokens; it only verifies them (see [`token`]).

pub mod token;
