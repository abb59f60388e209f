//! Company and document analyses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::chart::ChartImage;
use super::frameworks::{
    BcgMatrix, LinkedInSentiment, McKinsey7S, PestelAnalysis, PorterFiveForces, SwotAnalysis,
};

/// What an analysis was run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Company,
    Document,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSource::Company => "company",
            AnalysisSource::Document => "document",
        }
    }
}

impl From<&str> for AnalysisSource {
    fn from(s: &str) -> Self {
        match s {
            "document" => AnalysisSource::Document,
            _ => AnalysisSource::Company,
        }
    }
}

/// A framework that could not be produced for an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FrameworkFailure {
    #[schema(example = "BCG Matrix")]
    pub framework: String,
    pub message: String,
}

/// All framework artifacts of one analysis. Absent frameworks failed and
/// are listed in `failures`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swot: Option<SwotAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pestel: Option<PestelAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub porter: Option<PorterFiveForces>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcg: Option<BcgMatrix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mckinsey: Option<McKinsey7S>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<LinkedInSentiment>,
    /// Web sources the research context was built from
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub failures: Vec<FrameworkFailure>,
}

impl AnalysisReport {
    /// Whether at least one framework artifact was produced.
    pub fn has_results(&self) -> bool {
        self.swot.is_some()
            || self.pestel.is_some()
            || self.porter.is_some()
            || self.bcg.is_some()
            || self.mckinsey.is_some()
            || self.sentiment.is_some()
    }
}

/// A persisted analysis
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserAnalysis {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Acme Corp")]
    pub company_name: String,
    pub source: AnalysisSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    pub report: AnalysisReport,
    pub charts: Vec<ChartImage>,
    pub created_at: DateTime<Utc>,
}

/// Data for persisting a new analysis
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub user_id: Uuid,
    pub company_name: String,
    pub company_key: String,
    pub source: AnalysisSource,
    pub document_name: Option<String>,
    pub report: AnalysisReport,
    pub charts: Vec<ChartImage>,
}

/// Listing entry without the heavy report and chart payloads
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisSummary {
    pub id: Uuid,
    pub company_name: String,
    pub source: AnalysisSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    /// Frameworks that failed for this analysis
    pub failed_frameworks: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserAnalysis> for AnalysisSummary {
    fn from(analysis: UserAnalysis) -> Self {
        Self {
            id: analysis.id,
            company_name: analysis.company_name,
            source: analysis.source,
            document_name: analysis.document_name,
            failed_frameworks: analysis
                .report
                .failures
                .into_iter()
                .map(|f| f.framework)
                .collect(),
            created_at: analysis.created_at,
        }
    }
}

/// An uploaded document awaiting analysis
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Company the document is about; defaults to the file stem
    pub company_name: Option<String>,
}

impl UploadedDocument {
    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        match self.filename.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.filename,
        }
    }
}
