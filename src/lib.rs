//! BizLens - business-intelligence API
//!
//! Runs strategic frameworks (SWOT, PESTEL, Porter's Five Forces, BCG,
//! McKinsey 7S) over web research or uploaded documents with a language
//! model, compares companies side by side, and tracks LinkedIn sentiment
//! for monitored companies on a schedule.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Business entities and framework artifacts
//! - **analysis**: Prompts, reply extraction and statistics
//! - **services**: Application use cases
//! - **jobs**: The periodic sentiment monitor
//! - **infra**: Database, Redis, language model, search, scraping, charts
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server (and the sentiment monitor when enabled)
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Analyze one company without persisting anything
//! cargo run -- analyze "Acme Corp" --json
//! ```

pub mod analysis;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
