//! Sentiment service - LinkedIn sentiment capture and its time series.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::analysis::{build_prompt, summarize, Framework, FromModelOutput, Subject, SYSTEM_PROMPT};
use crate::config::{MAX_SEARCH_RESULTS, MAX_SENTIMENT_HISTORY};
use crate::domain::{
    CompanyName, LinkedInSentiment, NewSentimentPoint, SentimentPoint, SentimentReport,
};
use crate::errors::{AppError, AppResult};
use crate::infra::charts::line_chart;
use crate::infra::{LanguageModel, SearchHit, UnitOfWork, WebSearch};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A freshly captured observation and the full model assessment behind it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SentimentCapture {
    pub point: SentimentPoint,
    pub sentiment: LinkedInSentiment,
}

/// Sentiment service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SentimentService: Send + Sync {
    /// Search LinkedIn mentions, score them and record the observation.
    async fn capture(&self, company: &str) -> AppResult<SentimentCapture>;

    /// Recorded points, oldest first, at most `limit` (capped).
    async fn history(&self, company: &str, limit: u64) -> AppResult<Vec<SentimentPoint>>;

    /// Statistics and a trend chart over the recorded points.
    async fn summary(&self, company: &str, limit: u64) -> AppResult<SentimentReport>;
}

fn linkedin_query(company: &str) -> String {
    format!("{} site:linkedin.com", company)
}

/// Search hits as prompt context, one block per hit.
fn hits_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("- {}\n  {}\n  ({})", hit.title, hit.snippet, hit.url))
        .collect::<Vec<_>>()
        .join("\n")
}

fn capped(limit: u64) -> u64 {
    limit.clamp(1, MAX_SENTIMENT_HISTORY)
}

/// Concrete implementation of SentimentService.
pub struct SentimentTracker<U: UnitOfWork> {
    uow: Arc<U>,
    llm: Arc<dyn LanguageModel>,
    search: Arc<dyn WebSearch>,
}

impl<U: UnitOfWork> SentimentTracker<U> {
    pub fn new(uow: Arc<U>, llm: Arc<dyn LanguageModel>, search: Arc<dyn WebSearch>) -> Self {
        Self { uow, llm, search }
    }
}

#[async_trait]
impl<U: UnitOfWork> SentimentService for SentimentTracker<U> {
    async fn capture(&self, company: &str) -> AppResult<SentimentCapture> {
        let company = CompanyName::parse(company)?;

        let hits = self
            .search
            .search(&linkedin_query(company.as_str()), MAX_SEARCH_RESULTS)
            .await?;
        if hits.is_empty() {
            return Err(AppError::upstream(format!(
                "No LinkedIn mentions found for {}",
                company
            )));
        }

        let prompt = build_prompt(
            Framework::LinkedInSentiment,
            Subject::Company(company.as_str()),
            &hits_context(&hits),
        );
        let reply = self.llm.complete(SYSTEM_PROMPT, &prompt).await?;
        let sentiment = LinkedInSentiment::from_model_output(&reply)
            .map_err(|e| AppError::upstream(format!("LinkedIn sentiment: {}", e)))?;

        let point = self
            .uow
            .sentiment()
            .insert(NewSentimentPoint {
                company_name: company.as_str().to_string(),
                company_key: company.key().to_string(),
                sentiment: sentiment.clone(),
                sample_size: hits.len() as i32,
            })
            .await?;

        tracing::info!(
            company = %company,
            score = point.score,
            sample_size = point.sample_size,
            "Sentiment captured"
        );
        Ok(SentimentCapture { point, sentiment })
    }

    async fn history(&self, company: &str, limit: u64) -> AppResult<Vec<SentimentPoint>> {
        let company = CompanyName::parse(company)?;
        self.uow
            .sentiment()
            .history(company.key(), capped(limit))
            .await
    }

    async fn summary(&self, company: &str, limit: u64) -> AppResult<SentimentReport> {
        let name = CompanyName::parse(company)?;
        let points = self.uow.sentiment().history(name.key(), capped(limit)).await?;

        let series: Vec<_> = points.iter().map(|p| (p.recorded_at, p.score)).collect();
        let summary = summarize(&series);

        let chart = if points.is_empty() {
            None
        } else {
            let labels: Vec<String> = points
                .iter()
                .map(|p| p.recorded_at.format("%m-%d %H:%M").to_string())
                .collect();
            let scores: Vec<f64> = points.iter().map(|p| p.score).collect();
            Some(line_chart(
                &format!("{} LinkedIn sentiment", name),
                &labels,
                &scores,
                -1.0,
                1.0,
            )?)
        };

        Ok(SentimentReport {
            company: name.as_str().to_string(),
            summary,
            chart,
        })
    }
}
