//! Shared helpers for the automart crates: logging setup, startup
//! environment checks and small wire types.

pub mod types;
pub mod utils;
pub mod env;
