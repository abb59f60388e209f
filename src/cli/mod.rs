//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server and the sentiment monitor
//! - `migrate` - Database migrations
//! - `monitor` - Sentiment sweeps without the HTTP server
//! - `analyze` - One-off company analysis printed to stdout

pub mod args;

pub use args::{Cli, Commands};
