//! Commands module - CLI command implementations.
//!
//! Each command is implemented in its own module for separation of concerns.

pub mod analyze;
pub mod migrate;
pub mod monitor;
pub mod serve;
