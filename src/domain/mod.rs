//! Domain layer - Core business entities and value objects
//!
//! Users, analyses and their framework artifacts, comparisons, and the
//! monitored-company sentiment time series. Nothing here performs I/O.

pub mod analysis;
pub mod chart;
pub mod company;
pub mod comparison;
pub mod frameworks;
pub mod monitoring;
pub mod password;
pub mod user;

pub use analysis::{
    AnalysisReport, AnalysisSource, AnalysisSummary, FrameworkFailure, NewAnalysis,
    UploadedDocument, UserAnalysis,
};
pub use chart::{ChartImage, ChartKind};
pub use company::{company_key, CompanyName};
pub use comparison::{CompanyMetrics, ComparisonResult, ComparisonSummary, NewComparison};
pub use frameworks::{
    BcgMatrix, BcgProduct, BcgQuadrant, ForceAssessment, LinkedInSentiment, McKinsey7S,
    PestelAnalysis, PestelDimension, PorterFiveForces, SwotAnalysis,
};
pub use monitoring::{
    MonitoredCompany, NewSentimentPoint, SentimentPoint, SentimentReport, SentimentSummary,
    SweepReport, Trend,
};
pub use password::Password;
pub use user::{User, UserResponse, UserRole};
