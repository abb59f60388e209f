//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    analysis_handler, auth_handler, comparison_handler, monitoring_handler, sentiment_handler,
};
use crate::domain::{
    AnalysisReport, AnalysisSource, AnalysisSummary, BcgMatrix, BcgProduct, BcgQuadrant,
    ChartImage, ChartKind, CompanyMetrics, ComparisonResult, ComparisonSummary, ForceAssessment,
    FrameworkFailure, LinkedInSentiment, McKinsey7S, MonitoredCompany, PestelAnalysis,
    PestelDimension, PorterFiveForces, SentimentPoint, SentimentReport, SentimentSummary,
    SwotAnalysis, SweepReport, Trend, UserAnalysis, UserResponse, UserRole,
};
use crate::services::{SentimentCapture, TokenResponse};
use crate::types::MessageResponse;

/// OpenAPI documentation for BizLens
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BizLens",
        version = "0.1.0",
        description = "Company analysis with strategy frameworks, comparisons and LinkedIn sentiment monitoring"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::me,
        analysis_handler::analyze_company,
        analysis_handler::analyze_document,
        analysis_handler::list_analyses,
        analysis_handler::get_analysis,
        analysis_handler::delete_analysis,
        comparison_handler::compare,
        comparison_handler::list_comparisons,
        comparison_handler::get_comparison,
        monitoring_handler::list_companies,
        monitoring_handler::add_company,
        monitoring_handler::remove_company,
        monitoring_handler::list_skipped,
        monitoring_handler::skip_company,
        monitoring_handler::unskip_company,
        monitoring_handler::sweep,
        sentiment_handler::history,
        sentiment_handler::summary,
        sentiment_handler::capture,
    ),
    components(
        schemas(
            // Accounts
            UserRole,
            UserResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            // Analyses
            analysis_handler::AnalyzeCompanyRequest,
            analysis_handler::DocumentUpload,
            UserAnalysis,
            AnalysisSummary,
            AnalysisSource,
            AnalysisReport,
            FrameworkFailure,
            SwotAnalysis,
            PestelAnalysis,
            PestelDimension,
            PorterFiveForces,
            ForceAssessment,
            BcgMatrix,
            BcgProduct,
            BcgQuadrant,
            McKinsey7S,
            LinkedInSentiment,
            ChartImage,
            ChartKind,
            // Comparisons
            comparison_handler::CompareRequest,
            ComparisonResult,
            ComparisonSummary,
            CompanyMetrics,
            // Monitoring and sentiment
            monitoring_handler::AddCompanyRequest,
            MonitoredCompany,
            SweepReport,
            SentimentPoint,
            SentimentSummary,
            SentimentReport,
            SentimentCapture,
            Trend,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and the current account"),
        (name = "Analyses", description = "Company and document analyses"),
        (name = "Comparisons", description = "Side-by-side company comparisons"),
        (name = "Monitoring", description = "Companies swept for sentiment, and the skip list"),
        (name = "Sentiment", description = "LinkedIn sentiment history and trends")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
