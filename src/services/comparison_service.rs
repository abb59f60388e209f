//! Comparison service - side-by-side metrics and insights for 2 to 5 companies.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::AnalysisService;
use crate::analysis::extract::{lookup, text};
use crate::analysis::{build_prompt, model_output_to_value, Framework, Subject, SYSTEM_PROMPT};
use crate::config::{MAX_COMPARISON_COMPANIES, MIN_COMPARISON_COMPANIES};
use crate::domain::{
    ChartImage, CompanyMetrics, CompanyName, ComparisonResult, NewComparison,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::charts::{bar_chart, grouped_bar_chart};
use crate::infra::{LanguageModel, UnitOfWork};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const METRIC_LABELS: [&str; 5] = [
    "SWOT balance",
    "Competitive pressure",
    "PESTEL impact",
    "Sentiment",
    "Star products",
];

/// SWOT balances beyond this magnitude are drawn at the edge of the chart
const SWOT_BALANCE_SPAN: f64 = 10.0;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ComparisonService: Send + Sync {
    /// Compare 2 to 5 distinct companies, reusing the user's latest analyses.
    async fn compare(&self, user_id: Uuid, companies: Vec<String>) -> AppResult<ComparisonResult>;

    async fn get(&self, id: Uuid) -> AppResult<ComparisonResult>;

    async fn list(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<ComparisonResult>, u64)>;
}

/// Validate names and drop duplicates by company key, keeping first spellings.
fn distinct_companies(companies: &[String]) -> AppResult<Vec<CompanyName>> {
    let mut seen = HashSet::new();
    let mut distinct = Vec::new();
    for raw in companies {
        let name = CompanyName::parse(raw)?;
        if seen.insert(name.key().to_string()) {
            distinct.push(name);
        }
    }

    if distinct.len() < MIN_COMPARISON_COMPANIES || distinct.len() > MAX_COMPARISON_COMPANIES {
        return Err(AppError::validation(format!(
            "A comparison needs {} to {} distinct companies",
            MIN_COMPARISON_COMPANIES, MAX_COMPARISON_COMPANIES
        )));
    }
    Ok(distinct)
}

/// Every metric on a 0 to 1 scale, in `METRIC_LABELS` order.
fn normalized(metrics: &CompanyMetrics, most_stars: usize) -> Vec<f64> {
    let swot = (metrics.swot_balance as f64).clamp(-SWOT_BALANCE_SPAN, SWOT_BALANCE_SPAN);
    vec![
        (swot + SWOT_BALANCE_SPAN) / (2.0 * SWOT_BALANCE_SPAN),
        metrics.competitive_pressure.map(|p| p / 5.0).unwrap_or(0.0),
        metrics.pestel_impact.map(|p| p / 5.0).unwrap_or(0.0),
        metrics
            .sentiment_score
            .map(|s| (s.clamp(-1.0, 1.0) + 1.0) / 2.0)
            .unwrap_or(0.0),
        metrics.star_products as f64 / most_stars.max(1) as f64,
    ]
}

fn comparison_charts(metrics: &[CompanyMetrics]) -> Vec<ChartImage> {
    let mut charts = Vec::new();
    let companies: Vec<String> = metrics.iter().map(|m| m.company.clone()).collect();
    let categories: Vec<String> = METRIC_LABELS.iter().map(|l| l.to_string()).collect();
    let most_stars = metrics.iter().map(|m| m.star_products).max().unwrap_or(0);
    let values: Vec<Vec<f64>> = metrics.iter().map(|m| normalized(m, most_stars)).collect();

    match grouped_bar_chart("Normalized metrics", &companies, &categories, &values, 1.0) {
        Ok(chart) => charts.push(chart),
        Err(e) => tracing::warn!(error = %e, "Comparison chart skipped"),
    }

    let scored: Vec<(String, f64)> = metrics
        .iter()
        .filter_map(|m| m.sentiment_score.map(|s| (m.company.clone(), (s + 1.0) * 50.0)))
        .collect();
    if !scored.is_empty() {
        let (labels, values): (Vec<String>, Vec<f64>) = scored.into_iter().unzip();
        match bar_chart("LinkedIn sentiment index (0-100)", &labels, &values, 100.0) {
            Ok(chart) => charts.push(chart),
            Err(e) => tracing::warn!(error = %e, "Sentiment chart skipped"),
        }
    }
    charts
}

/// Insight text used when the model is unavailable.
fn fallback_insights(metrics: &[CompanyMetrics]) -> String {
    let mut lines = Vec::new();

    if let Some(best) = metrics.iter().max_by_key(|m| m.swot_balance) {
        lines.push(format!(
            "{} has the strongest SWOT balance ({:+}).",
            best.company, best.swot_balance
        ));
    }
    if let Some(calmest) = metrics
        .iter()
        .filter_map(|m| m.competitive_pressure.map(|p| (m, p)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
    {
        lines.push(format!(
            "{} faces the lowest competitive pressure ({:.1}/5).",
            calmest.0.company, calmest.1
        ));
    }
    if let Some(liked) = metrics
        .iter()
        .filter_map(|m| m.sentiment_score.map(|s| (m, s)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
    {
        lines.push(format!(
            "{} has the most positive LinkedIn sentiment ({:.2}).",
            liked.0.company, liked.1
        ));
    }
    let stars: usize = metrics.iter().map(|m| m.star_products).sum();
    if stars > 0 {
        lines.push(format!("{} BCG star products across the group.", stars));
    }

    if lines.is_empty() {
        "Not enough framework data to compare these companies.".to_string()
    } else {
        lines.join(" ")
    }
}

/// The `summary` field of a JSON reply, else the reply itself.
fn insight_text(reply: &str) -> Option<String> {
    let value = model_output_to_value(reply);
    let summary = match &value {
        Value::Object(_) => lookup(&value, &["summary", "insights", "analysis"]).map(text),
        _ => None,
    };

    summary
        .filter(|s| !s.trim().is_empty())
        .or_else(|| Some(reply.trim().to_string()))
        .filter(|s| !s.is_empty())
}

/// Concrete implementation of ComparisonService.
pub struct Comparator<U: UnitOfWork> {
    uow: Arc<U>,
    llm: Arc<dyn LanguageModel>,
    analyses: Arc<dyn AnalysisService>,
}

impl<U: UnitOfWork> Comparator<U> {
    pub fn new(uow: Arc<U>, llm: Arc<dyn LanguageModel>, analyses: Arc<dyn AnalysisService>) -> Self {
        Self { uow, llm, analyses }
    }

    async fn insights(&self, companies: &[CompanyName], metrics: &[CompanyMetrics]) -> String {
        let names = companies
            .iter()
            .map(CompanyName::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let metrics_json = serde_json::to_string_pretty(metrics).unwrap_or_default();
        let prompt = build_prompt(
            Framework::ComparisonInsights,
            Subject::Company(&names),
            &metrics_json,
        );

        match self.llm.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => insight_text(&reply).unwrap_or_else(|| fallback_insights(metrics)),
            Err(e) => {
                tracing::warn!(error = %e, "Comparison insights unavailable, using fallback");
                fallback_insights(metrics)
            }
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> ComparisonService for Comparator<U> {
    async fn compare(&self, user_id: Uuid, companies: Vec<String>) -> AppResult<ComparisonResult> {
        let companies = distinct_companies(&companies)?;

        let mut metrics = Vec::with_capacity(companies.len());
        for company in &companies {
            let existing = self
                .uow
                .analyses()
                .latest_for_company(user_id, company.key())
                .await?;
            let analysis = match existing {
                Some(analysis) => {
                    tracing::debug!(company = %company, analysis_id = %analysis.id, "Reusing analysis");
                    analysis
                }
                None => self.analyses.analyze_company(user_id, company.as_str()).await?,
            };
            metrics.push(CompanyMetrics::from_analysis(&analysis));
        }

        let insights = self.insights(&companies, &metrics).await;
        let charts = comparison_charts(&metrics);

        let comparison = self
            .uow
            .comparisons()
            .create(NewComparison {
                user_id,
                companies: companies.iter().map(|c| c.as_str().to_string()).collect(),
                metrics,
                insights,
                charts,
            })
            .await?;

        tracing::info!(
            comparison_id = %comparison.id,
            companies = comparison.companies.len(),
            "Comparison created"
        );
        Ok(comparison)
    }

    async fn get(&self, id: Uuid) -> AppResult<ComparisonResult> {
        self.uow.comparisons().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<ComparisonResult>, u64)> {
        self.uow.comparisons().list_for_user(user_id, params).await
    }
}
