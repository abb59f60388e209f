//! Hand-written fakes shared by the integration tests.
//!
//! `MemoryStore` keeps every repository in memory; the fake model answers
//! by the `Framework:` line each prompt starts with; search and scraping
//! return canned pages.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use bizlens::config::Config;
use bizlens::domain::{
    ComparisonResult, MonitoredCompany, NewAnalysis, NewComparison, NewSentimentPoint,
    SentimentPoint, User, UserAnalysis, UserRole,
};
use bizlens::errors::{AppError, AppResult};
use bizlens::infra::{
    AnalysisRepository, ComparisonRepository, LanguageModel, MonitoredCompanyRepository,
    PageScraper, RepositorySet, SearchHit, SentimentRepository, UserRepository, WebSearch,
};
use bizlens::services::{Backends, Services};
use bizlens::types::PaginationParams;

// =============================================================================
// Persistence
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    /// Analyses with their company keys
    analyses: Mutex<Vec<(String, UserAnalysis)>>,
    comparisons: Mutex<Vec<ComparisonResult>>,
    /// Monitored companies with their company keys
    monitored: Mutex<Vec<(String, MonitoredCompany)>>,
    /// Sentiment points with their company keys
    sentiment: Mutex<Vec<(String, SentimentPoint)>>,
}

impl MemoryStore {
    pub fn analysis_count(&self) -> usize {
        self.analyses.lock().unwrap().len()
    }

    pub fn sentiment_count(&self, company_key: &str) -> usize {
        self.sentiment
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key == company_key)
            .count()
    }

    /// Insert a sentiment point with an explicit timestamp.
    pub fn seed_sentiment(&self, company: &str, score: f64, recorded_at: DateTime<Utc>) {
        let point = SentimentPoint {
            id: Uuid::new_v4(),
            company_name: company.to_string(),
            score,
            positive: 50.0,
            neutral: 30.0,
            negative: 20.0,
            sample_size: 5,
            themes: vec![],
            recorded_at,
        };
        self.sentiment
            .lock()
            .unwrap()
            .push((bizlens::domain::company_key(company), point));
    }
}

fn page<T: Clone>(items: &[T], params: &PaginationParams) -> Vec<T> {
    items
        .iter()
        .skip(params.offset() as usize)
        .take(params.limit() as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, email: String, password_hash: String, name: String) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::conflict("Email"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl AnalysisRepository for MemoryStore {
    async fn create(&self, analysis: NewAnalysis) -> AppResult<UserAnalysis> {
        let created = UserAnalysis {
            id: Uuid::new_v4(),
            user_id: analysis.user_id,
            company_name: analysis.company_name,
            source: analysis.source,
            document_name: analysis.document_name,
            report: analysis.report,
            charts: analysis.charts,
            created_at: Utc::now(),
        };
        self.analyses
            .lock()
            .unwrap()
            .push((analysis.company_key, created.clone()));
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserAnalysis>> {
        Ok(self
            .analyses
            .lock()
            .unwrap()
            .iter()
            .find(|(_, a)| a.id == id)
            .map(|(_, a)| a.clone()))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<UserAnalysis>, u64)> {
        let owned: Vec<UserAnalysis> = self
            .analyses
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(_, a)| a.user_id == user_id)
            .map(|(_, a)| a.clone())
            .collect();
        Ok((page(&owned, params), owned.len() as u64))
    }

    async fn latest_for_company(
        &self,
        user_id: Uuid,
        company_key: &str,
    ) -> AppResult<Option<UserAnalysis>> {
        Ok(self
            .analyses
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(key, a)| key == company_key && a.user_id == user_id)
            .map(|(_, a)| a.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut analyses = self.analyses.lock().unwrap();
        let before = analyses.len();
        analyses.retain(|(_, a)| a.id != id);
        if analyses.len() == before {
            Err(AppError::NotFound)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ComparisonRepository for MemoryStore {
    async fn create(&self, comparison: NewComparison) -> AppResult<ComparisonResult> {
        let created = ComparisonResult {
            id: Uuid::new_v4(),
            user_id: comparison.user_id,
            companies: comparison.companies,
            metrics: comparison.metrics,
            insights: comparison.insights,
            charts: comparison.charts,
            created_at: Utc::now(),
        };
        self.comparisons.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ComparisonResult>> {
        Ok(self
            .comparisons
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<ComparisonResult>, u64)> {
        let owned: Vec<ComparisonResult> = self
            .comparisons
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        Ok((page(&owned, params), owned.len() as u64))
    }
}

#[async_trait]
impl MonitoredCompanyRepository for MemoryStore {
    async fn create(
        &self,
        name: String,
        company_key: String,
        added_by: Option<Uuid>,
    ) -> AppResult<MonitoredCompany> {
        let mut monitored = self.monitored.lock().unwrap();
        if monitored.iter().any(|(key, _)| *key == company_key) {
            return Err(AppError::conflict("Monitored company"));
        }
        let company = MonitoredCompany {
            id: Uuid::new_v4(),
            name,
            added_by,
            created_at: Utc::now(),
            last_checked_at: None,
        };
        monitored.push((company_key, company.clone()));
        Ok(company)
    }

    async fn find_by_key(&self, company_key: &str) -> AppResult<Option<MonitoredCompany>> {
        Ok(self
            .monitored
            .lock()
            .unwrap()
            .iter()
            .find(|(key, _)| key == company_key)
            .map(|(_, c)| c.clone()))
    }

    async fn list(&self) -> AppResult<Vec<MonitoredCompany>> {
        let mut companies: Vec<MonitoredCompany> = self
            .monitored
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.clone())
            .collect();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    async fn delete_by_key(&self, company_key: &str) -> AppResult<bool> {
        let mut monitored = self.monitored.lock().unwrap();
        let before = monitored.len();
        monitored.retain(|(key, _)| key != company_key);
        Ok(monitored.len() != before)
    }

    async fn touch_checked(&self, company_key: &str, at: DateTime<Utc>) -> AppResult<()> {
        let mut monitored = self.monitored.lock().unwrap();
        match monitored.iter_mut().find(|(key, _)| key == company_key) {
            Some((_, company)) => {
                company.last_checked_at = Some(at);
                Ok(())
            }
            None => Err(AppError::NotFound),
        }
    }
}

#[async_trait]
impl SentimentRepository for MemoryStore {
    async fn insert(&self, point: NewSentimentPoint) -> AppResult<SentimentPoint> {
        let sentiment = point.sentiment;
        let created = SentimentPoint {
            id: Uuid::new_v4(),
            company_name: point.company_name,
            score: sentiment.overall_score,
            positive: sentiment.positive,
            neutral: sentiment.neutral,
            negative: sentiment.negative,
            sample_size: point.sample_size,
            themes: sentiment.key_themes,
            recorded_at: Utc::now(),
        };
        self.sentiment
            .lock()
            .unwrap()
            .push((point.company_key, created.clone()));
        Ok(created)
    }

    async fn history(&self, company_key: &str, limit: u64) -> AppResult<Vec<SentimentPoint>> {
        let mut points: Vec<SentimentPoint> = self
            .sentiment
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key == company_key)
            .map(|(_, p)| p.clone())
            .collect();
        points.sort_by_key(|p| p.recorded_at);
        let skip = points.len().saturating_sub(limit as usize);
        Ok(points.split_off(skip))
    }
}

// =============================================================================
// Outbound clients
// =============================================================================

pub const SWOT_REPLY: &str = r#"{"strengths": ["Strong brand", "Loyal customers"], "weaknesses": ["High costs"], "opportunities": ["Asia expansion"], "threats": ["New rivals"]}"#;

pub const PESTEL_REPLY: &str = r#"{"political": {"factors": ["Trade policy"], "impact": 3}, "economic": {"factors": ["Inflation"], "impact": 4}, "social": {"factors": ["Remote work"], "impact": 2}, "technological": {"factors": ["AI"], "impact": 5}, "environmental": {"factors": ["Emissions rules"], "impact": 2}, "legal": {"factors": ["Privacy law"], "impact": 3}}"#;

pub const PORTER_REPLY: &str = r#"{"competitive_rivalry": {"intensity": 4, "analysis": "Crowded market"}, "supplier_power": {"intensity": 2, "analysis": "Many suppliers"}, "buyer_power": {"intensity": 3, "analysis": "Price sensitive"}, "threat_of_substitutes": {"intensity": 3, "analysis": "Some substitutes"}, "threat_of_new_entrants": {"intensity": 2, "analysis": "High capital needs"}}"#;

pub const BCG_REPLY: &str = r#"{"products": [{"name": "Widgets", "market_growth_rate": 15, "relative_market_share": 1.4}, {"name": "Gadgets", "market_growth_rate": 3, "relative_market_share": 0.5}]}"#;

pub const MCKINSEY_REPLY: &str = r#"{"strategy": "Premium positioning", "structure": "Divisional", "systems": "Shared ERP", "shared_values": "Customer first", "style": "Collaborative", "staff": "Experienced engineers", "skills": "Product design"}"#;

pub const SENTIMENT_REPLY: &str = r#"{"overall_score": 0.4, "positive": 55, "neutral": 30, "negative": 15, "key_themes": ["hiring", "product launch"], "summary": "Mostly upbeat"}"#;

pub const INSIGHTS_REPLY: &str = r#"{"summary": "Acme leads on sentiment while Globex faces more competitive pressure.", "leader": "Acme", "recommendations": ["Globex should cut costs"]}"#;

/// Language model answering each framework with a canned JSON reply
#[derive(Default)]
pub struct FakeModel {
    /// Frameworks (by display name) that fail with an upstream error
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl FakeModel {
    pub fn failing(frameworks: &[&str]) -> Self {
        Self {
            failing: Mutex::new(frameworks.iter().map(|f| f.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn complete(&self, _system: &str, prompt: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let framework = prompt
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("Framework: "))
            .unwrap_or_default()
            .to_string();

        if self.failing.lock().unwrap().contains(&framework) {
            return Err(AppError::upstream(format!("{} unavailable", framework)));
        }

        let reply = match framework.as_str() {
            "SWOT Analysis" => SWOT_REPLY,
            "PESTEL Analysis" => PESTEL_REPLY,
            "Porter's Five Forces" => PORTER_REPLY,
            "BCG Growth-Share Matrix" => BCG_REPLY,
            "McKinsey 7S Framework" => MCKINSEY_REPLY,
            "LinkedIn Sentiment" => SENTIMENT_REPLY,
            "Comparative Insights" => INSIGHTS_REPLY,
            other => return Err(AppError::upstream(format!("unexpected prompt: {}", other))),
        };
        Ok(reply.to_string())
    }
}

/// Search returning three hits for any query, except LinkedIn queries about
/// companies listed as quiet, which find nothing.
#[derive(Default)]
pub struct FakeSearch {
    quiet: HashSet<String>,
}

impl FakeSearch {
    pub fn with_quiet(companies: &[&str]) -> Self {
        Self {
            quiet: companies.iter().map(|c| c.to_lowercase()).collect(),
        }
    }
}

#[async_trait]
impl WebSearch for FakeSearch {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<SearchHit>> {
        let lowered = query.to_lowercase();
        if lowered.contains("site:linkedin.com")
            && self.quiet.iter().any(|company| lowered.starts_with(company.as_str()))
        {
            return Ok(Vec::new());
        }

        Ok((1..=3)
            .take(limit)
            .map(|i| SearchHit {
                title: format!("Result {}", i),
                url: format!("https://news.example.com/{}", i),
                snippet: format!("Snippet {} for {}", i, query),
            })
            .collect())
    }
}

/// Scraper serving a short article for every URL
pub struct FakeScraper;

#[async_trait]
impl PageScraper for FakeScraper {
    async fn fetch_text(&self, url: &str) -> AppResult<String> {
        Ok(format!("Article at {} about quarterly results and strategy.", url))
    }
}

// =============================================================================
// Wiring
// =============================================================================

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub model: Arc<FakeModel>,
    pub services: Services,
}

pub fn harness_with(model: FakeModel, search: FakeSearch) -> Harness {
    let store = Arc::new(MemoryStore::default());
    let model = Arc::new(model);
    let backends = Backends {
        llm: model.clone(),
        search: Arc::new(search),
        scraper: Arc::new(FakeScraper),
    };
    let services = Services::build(
        Arc::new(RepositorySet::uniform(store.clone())),
        Config::for_tests(),
        backends,
    );
    Harness {
        store,
        model,
        services,
    }
}

pub fn harness() -> Harness {
    harness_with(FakeModel::default(), FakeSearch::default())
}
