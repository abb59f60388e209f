//! Multi-company comparisons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::analysis::UserAnalysis;
use super::chart::ChartImage;
use super::frameworks::BcgQuadrant;

/// Headline metrics derived from one company's analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompanyMetrics {
    #[schema(example = "Acme Corp")]
    pub company: String,
    pub analysis_id: Uuid,
    /// (strengths + opportunities) - (weaknesses + threats)
    pub swot_balance: i32,
    /// Mean Porter force intensity, 1 to 5
    pub competitive_pressure: Option<f64>,
    /// Mean PESTEL impact, 1 to 5
    pub pestel_impact: Option<f64>,
    /// LinkedIn sentiment score, -1 to 1
    pub sentiment_score: Option<f64>,
    pub star_products: usize,
}

impl CompanyMetrics {
    /// Derive metrics from a finished analysis.
    pub fn from_analysis(analysis: &UserAnalysis) -> Self {
        let report = &analysis.report;
        Self {
            company: analysis.company_name.clone(),
            analysis_id: analysis.id,
            swot_balance: report.swot.as_ref().map(|s| s.balance()).unwrap_or(0),
            competitive_pressure: report.porter.as_ref().map(|p| p.average_intensity()),
            pestel_impact: report.pestel.as_ref().map(|p| p.average_impact()),
            sentiment_score: report.sentiment.as_ref().map(|s| s.overall_score),
            star_products: report
                .bcg
                .as_ref()
                .map(|b| b.count(BcgQuadrant::Star))
                .unwrap_or(0),
        }
    }
}

/// A persisted comparison
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComparisonResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub companies: Vec<String>,
    pub metrics: Vec<CompanyMetrics>,
    pub insights: String,
    pub charts: Vec<ChartImage>,
    pub created_at: DateTime<Utc>,
}

/// Data for persisting a new comparison
#[derive(Debug, Clone)]
pub struct NewComparison {
    pub user_id: Uuid,
    pub companies: Vec<String>,
    pub metrics: Vec<CompanyMetrics>,
    pub insights: String,
    pub charts: Vec<ChartImage>,
}

/// Listing entry for comparisons
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComparisonSummary {
    pub id: Uuid,
    pub companies: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ComparisonResult> for ComparisonSummary {
    fn from(result: ComparisonResult) -> Self {
        Self {
            id: result.id,
            companies: result.companies,
            created_at: result.created_at,
        }
    }
}
