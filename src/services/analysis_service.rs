//! Analysis service - runs the strategic frameworks over a company or an
//! uploaded document and persists the report.
//!
//! A company analysis first gathers research context (search snippets plus a
//! few scraped pages), then prompts every core framework concurrently and
//! captures LinkedIn sentiment alongside. Each framework degrades on its own:
//! a failed prompt or an unusable reply is recorded in `report.failures`
//! and the analysis only fails when nothing at all was produced.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use uuid::Uuid;

use super::SentimentService;
use crate::analysis::{build_prompt, Framework, FromModelOutput, Subject, SYSTEM_PROMPT};
use crate::config::{
    is_supported_document_type, DEFAULT_SEARCH_RESULTS, MAX_CHARS_PER_PAGE,
    MAX_CONCURRENT_PROMPTS, MAX_DOCUMENT_BYTES, MAX_SCRAPED_PAGES,
};
use crate::domain::{
    AnalysisReport, AnalysisSource, BcgMatrix, BcgQuadrant, ChartImage, CompanyName,
    FrameworkFailure, McKinsey7S, NewAnalysis, PestelAnalysis, PorterFiveForces, SwotAnalysis,
    UploadedDocument, UserAnalysis,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::charts::{bar_chart, scatter_chart};
use crate::infra::scraper::html_to_text;
use crate::infra::{LanguageModel, PageScraper, UnitOfWork, WebSearch};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Analysis service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Research `company` on the web and run every framework over it.
    async fn analyze_company(&self, user_id: Uuid, company: &str) -> AppResult<UserAnalysis>;

    /// Run the core frameworks over an uploaded document.
    async fn analyze_document(
        &self,
        user_id: Uuid,
        document: UploadedDocument,
    ) -> AppResult<UserAnalysis>;

    async fn get(&self, id: Uuid) -> AppResult<UserAnalysis>;

    /// Page of a user's analyses, newest first, with the total count.
    async fn list(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<UserAnalysis>, u64)>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// A coerced framework reply
enum Artifact {
    Swot(SwotAnalysis),
    Pestel(PestelAnalysis),
    Porter(PorterFiveForces),
    Bcg(BcgMatrix),
    McKinsey(McKinsey7S),
}

fn coerce(framework: Framework, reply: &str) -> Result<Artifact, String> {
    let artifact = match framework {
        Framework::Swot => SwotAnalysis::from_model_output(reply).map(Artifact::Swot),
        Framework::Pestel => PestelAnalysis::from_model_output(reply).map(Artifact::Pestel),
        Framework::PorterFiveForces => {
            PorterFiveForces::from_model_output(reply).map(Artifact::Porter)
        }
        Framework::BcgMatrix => BcgMatrix::from_model_output(reply).map(Artifact::Bcg),
        Framework::McKinsey7S => McKinsey7S::from_model_output(reply).map(Artifact::McKinsey),
        other => return Err(format!("{} is not a core framework", other)),
    };
    artifact.map_err(|e| e.to_string())
}

impl AnalysisReport {
    fn record(&mut self, artifact: Artifact) {
        match artifact {
            Artifact::Swot(swot) => self.swot = Some(swot),
            Artifact::Pestel(pestel) => self.pestel = Some(pestel),
            Artifact::Porter(porter) => self.porter = Some(porter),
            Artifact::Bcg(bcg) => self.bcg = Some(bcg),
            Artifact::McKinsey(mckinsey) => self.mckinsey = Some(mckinsey),
        }
    }

    fn fail(&mut self, framework: Framework, message: impl Into<String>) {
        self.failures.push(FrameworkFailure {
            framework: framework.display_name().to_string(),
            message: message.into(),
        });
    }
}

/// Research context gathered for a company
#[derive(Debug, Default)]
struct Research {
    context: String,
    sources: Vec<String>,
}

fn research_query(company: &str) -> String {
    format!("{} company overview strategy market", company)
}

fn first_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Charts for whichever artifacts the report holds. A chart that cannot be
/// drawn is left out.
pub(crate) fn render_charts(subject: &str, report: &AnalysisReport) -> Vec<ChartImage> {
    let mut charts = Vec::new();
    let mut push = |chart: AppResult<ChartImage>| match chart {
        Ok(chart) => charts.push(chart),
        Err(e) => tracing::warn!(subject = %subject, error = %e, "Chart skipped"),
    };

    if let Some(pestel) = &report.pestel {
        let labels: Vec<String> = PestelAnalysis::LABELS.iter().map(|l| l.to_string()).collect();
        let values: Vec<f64> = pestel.dimensions().iter().map(|d| d.impact as f64).collect();
        push(bar_chart(&format!("{} PESTEL impact", subject), &labels, &values, 5.0));
    }

    if let Some(porter) = &report.porter {
        let labels: Vec<String> = PorterFiveForces::LABELS.iter().map(|l| l.to_string()).collect();
        let values: Vec<f64> = porter.forces().iter().map(|f| f.intensity as f64).collect();
        push(bar_chart(
            &format!("{} Porter's Five Forces intensity", subject),
            &labels,
            &values,
            5.0,
        ));
    }

    if let Some(bcg) = report.bcg.as_ref().filter(|b| !b.products.is_empty()) {
        let labels: Vec<String> = bcg.products.iter().map(|p| p.name.clone()).collect();
        let points: Vec<(f64, f64)> = bcg
            .products
            .iter()
            .map(|p| (p.relative_market_share, p.market_growth_rate))
            .collect();
        push(scatter_chart(
            &format!("{} BCG growth-share matrix", subject),
            &labels,
            &points,
            Some((BcgQuadrant::SHARE_THRESHOLD, BcgQuadrant::GROWTH_THRESHOLD)),
        ));
    }

    if let Some(sentiment) = &report.sentiment {
        let labels = vec![
            "Positive".to_string(),
            "Neutral".to_string(),
            "Negative".to_string(),
        ];
        push(bar_chart(
            &format!("{} LinkedIn sentiment distribution", subject),
            &labels,
            &[sentiment.positive, sentiment.neutral, sentiment.negative],
            100.0,
        ));
    }

    charts
}

/// Concrete implementation of AnalysisService.
pub struct Analyzer<U: UnitOfWork> {
    uow: Arc<U>,
    llm: Arc<dyn LanguageModel>,
    search: Arc<dyn WebSearch>,
    scraper: Arc<dyn PageScraper>,
    sentiment: Arc<dyn SentimentService>,
}

impl<U: UnitOfWork> Analyzer<U> {
    pub fn new(
        uow: Arc<U>,
        llm: Arc<dyn LanguageModel>,
        search: Arc<dyn WebSearch>,
        scraper: Arc<dyn PageScraper>,
        sentiment: Arc<dyn SentimentService>,
    ) -> Self {
        Self {
            uow,
            llm,
            search,
            scraper,
            sentiment,
        }
    }

    /// Search snippets plus the text of the first few result pages. Every
    /// failure here only shrinks the context.
    async fn research(&self, company: &CompanyName) -> Research {
        let hits = match self
            .search
            .search(&research_query(company.as_str()), DEFAULT_SEARCH_RESULTS)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(company = %company, error = %e, "Research search failed");
                return Research::default();
            }
        };

        let pages = futures::future::join_all(
            hits.iter()
                .take(MAX_SCRAPED_PAGES)
                .map(|hit| self.scraper.fetch_text(&hit.url)),
        )
        .await;

        let mut context = String::new();
        for hit in &hits {
            context.push_str(&format!("- {}: {}\n", hit.title, hit.snippet));
        }
        for (hit, page) in hits.iter().zip(pages) {
            match page {
                Ok(text) if !text.trim().is_empty() => {
                    context.push_str(&format!(
                        "\nSource: {}\n{}\n",
                        hit.url,
                        first_chars(text.trim(), MAX_CHARS_PER_PAGE)
                    ));
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(url = %hit.url, error = %e, "Scrape failed"),
            }
        }

        Research {
            context,
            sources: hits.into_iter().map(|hit| hit.url).collect(),
        }
    }

    /// Prompt one framework and coerce its reply.
    async fn run_framework(
        &self,
        framework: Framework,
        prompt: String,
    ) -> (Framework, Result<Artifact, String>) {
        let outcome = match self.llm.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => coerce(framework, &reply),
            Err(e) => Err(e.to_string()),
        };
        (framework, outcome)
    }

    /// Prompt every core framework, at most `MAX_CONCURRENT_PROMPTS` at once.
    async fn run_frameworks(&self, subject: Subject<'_>, context: &str) -> AnalysisReport {
        let prompts: Vec<(Framework, String)> = Framework::CORE
            .into_iter()
            .map(|framework| (framework, build_prompt(framework, subject, context)))
            .collect();

        let mut outcomes: Vec<(Framework, Result<Artifact, String>)> = stream::iter(prompts)
            .map(|(framework, prompt)| self.run_framework(framework, prompt))
            .buffer_unordered(MAX_CONCURRENT_PROMPTS)
            .collect()
            .await;
        outcomes.sort_by_key(|(framework, _)| {
            Framework::CORE.iter().position(|f| f == framework)
        });

        let mut report = AnalysisReport::default();
        for (framework, outcome) in outcomes {
            match outcome {
                Ok(artifact) => report.record(artifact),
                Err(message) => {
                    tracing::warn!(framework = %framework, error = %message, "Framework failed");
                    report.fail(framework, message);
                }
            }
        }
        report
    }

    async fn persist(
        &self,
        user_id: Uuid,
        company: &CompanyName,
        source: AnalysisSource,
        document_name: Option<String>,
        report: AnalysisReport,
    ) -> AppResult<UserAnalysis> {
        if !report.has_results() {
            return Err(AppError::upstream(format!(
                "No framework could be produced for {}",
                company
            )));
        }

        let charts = render_charts(company.as_str(), &report);
        self.uow
            .analyses()
            .create(NewAnalysis {
                user_id,
                company_name: company.as_str().to_string(),
                company_key: company.key().to_string(),
                source,
                document_name,
                report,
                charts,
            })
            .await
    }
}

#[async_trait]
impl<U: UnitOfWork> AnalysisService for Analyzer<U> {
    async fn analyze_company(&self, user_id: Uuid, company: &str) -> AppResult<UserAnalysis> {
        let company = CompanyName::parse(company)?;
        tracing::info!(company = %company, %user_id, "Company analysis started");

        let research = self.research(&company).await;
        let (mut report, sentiment) = tokio::join!(
            self.run_frameworks(Subject::Company(company.as_str()), &research.context),
            self.sentiment.capture(company.as_str()),
        );

        match sentiment {
            Ok(captured) => report.sentiment = Some(captured.sentiment),
            Err(e) => {
                tracing::warn!(company = %company, error = %e, "Sentiment capture failed");
                report.fail(Framework::LinkedInSentiment, e.to_string());
            }
        }
        report.sources = research.sources;

        let analysis = self
            .persist(user_id, &company, AnalysisSource::Company, None, report)
            .await?;
        tracing::info!(
            analysis_id = %analysis.id,
            company = %company,
            failures = analysis.report.failures.len(),
            "Company analysis finished"
        );
        Ok(analysis)
    }

    async fn analyze_document(
        &self,
        user_id: Uuid,
        document: UploadedDocument,
    ) -> AppResult<UserAnalysis> {
        if !is_supported_document_type(&document.content_type) {
            return Err(AppError::UnsupportedMediaType(document.content_type));
        }
        if document.bytes.is_empty() {
            return Err(AppError::validation("Document is empty"));
        }
        if document.bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(AppError::validation(format!(
                "Document exceeds {} bytes",
                MAX_DOCUMENT_BYTES
            )));
        }

        let company = CompanyName::parse(
            document
                .company_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| document.stem()),
        )?;

        let raw = String::from_utf8_lossy(&document.bytes);
        let text = if document.content_type.to_ascii_lowercase().starts_with("text/html") {
            html_to_text(&raw)
        } else {
            raw.into_owned()
        };
        if text.trim().is_empty() {
            return Err(AppError::validation("Document contains no text"));
        }

        tracing::info!(
            document = %document.filename,
            company = %company,
            bytes = document.bytes.len(),
            "Document analysis started"
        );
        let report = self
            .run_frameworks(
                Subject::Document {
                    name: &document.filename,
                    text: &text,
                },
                "",
            )
            .await;

        self.persist(
            user_id,
            &company,
            AnalysisSource::Document,
            Some(document.filename.clone()),
            report,
        )
        .await
    }

    async fn get(&self, id: Uuid) -> AppResult<UserAnalysis> {
        self.uow.analyses().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<UserAnalysis>, u64)> {
        self.uow.analyses().list_for_user(user_id, params).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.uow.analyses().delete(id).await?;
        tracing::info!(analysis_id = %id, "Analysis deleted");
        Ok(())
    }
}
