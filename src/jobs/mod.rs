//! Background jobs.
//!
//! The only job is the periodic LinkedIn sentiment sweep over the monitored
//! companies. It runs inside `serve` or standalone via `monitor run`.

pub mod sentiment_monitor;

pub use sentiment_monitor::{SentimentMonitor, SkipList};
