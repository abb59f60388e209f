//! Monitored companies and their sentiment time series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::chart::ChartImage;
use super::frameworks::LinkedInSentiment;

/// A company swept periodically by the sentiment monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonitoredCompany {
    pub id: Uuid,
    #[schema(example = "Acme Corp")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// One recorded sentiment observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SentimentPoint {
    pub id: Uuid,
    pub company_name: String,
    /// Overall score in [-1, 1]
    pub score: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    /// Number of posts/snippets the score was inferred from
    pub sample_size: i32,
    pub themes: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Data for persisting a sentiment observation
#[derive(Debug, Clone)]
pub struct NewSentimentPoint {
    pub company_name: String,
    pub company_key: String,
    pub sentiment: LinkedInSentiment,
    pub sample_size: i32,
}

/// Direction of a sentiment time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    /// Fewer than two observations
    Insufficient,
}

/// Aggregate statistics over a sentiment time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SentimentSummary {
    pub count: usize,
    pub average: f64,
    pub latest: f64,
    pub min: f64,
    pub max: f64,
    /// Sample variance
    pub variance: f64,
    pub std_dev: f64,
    /// Least-squares slope in score units per day
    pub slope_per_day: f64,
    pub trend: Trend,
    pub first_recorded_at: DateTime<Utc>,
    pub last_recorded_at: DateTime<Utc>,
}

/// Summary and trend chart for one company
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SentimentReport {
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SentimentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartImage>,
}

/// Outcome of one sweep over the monitored companies
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SweepReport {
    /// Companies whose sentiment was captured
    pub processed: Vec<String>,
    /// Companies passed over because they are on the skip list
    pub skipped: Vec<String>,
    /// Companies whose capture failed
    pub failed: Vec<String>,
    /// Companies put on the skip list during this sweep
    pub newly_skipped: Vec<String>,
    /// Set when another instance held the sweep lock
    pub lock_contended: bool,
}
