//! Repositories that keep nothing.
//!
//! Creates hand back the record they would have stored, reads find nothing.
//! Used by one-off CLI analyses that print their result instead of saving it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    AnalysisRepository, ComparisonRepository, MonitoredCompanyRepository, SentimentRepository,
    UserRepository,
};
use crate::domain::{
    ComparisonResult, MonitoredCompany, NewAnalysis, NewComparison, NewSentimentPoint,
    SentimentPoint, User, UserAnalysis, UserRole,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[derive(Debug, Clone, Copy, Default)]
pub struct EphemeralStore;

#[async_trait]
impl UserRepository for EphemeralStore {
    async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<User>> {
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> AppResult<Option<User>> {
        Ok(None)
    }

    async fn create(&self, email: String, password_hash: String, name: String) -> AppResult<User> {
        let now = Utc::now();
        Ok(User {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        })
    }
}

#[async_trait]
impl AnalysisRepository for EphemeralStore {
    async fn create(&self, analysis: NewAnalysis) -> AppResult<UserAnalysis> {
        Ok(UserAnalysis {
            id: Uuid::new_v4(),
            user_id: analysis.user_id,
            company_name: analysis.company_name,
            source: analysis.source,
            document_name: analysis.document_name,
            report: analysis.report,
            charts: analysis.charts,
            created_at: Utc::now(),
        })
    }

    async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<UserAnalysis>> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user_id: Uuid,
        _params: &PaginationParams,
    ) -> AppResult<(Vec<UserAnalysis>, u64)> {
        Ok((Vec::new(), 0))
    }

    async fn latest_for_company(
        &self,
        _user_id: Uuid,
        _company_key: &str,
    ) -> AppResult<Option<UserAnalysis>> {
        Ok(None)
    }

    async fn delete(&self, _id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }
}

#[async_trait]
impl ComparisonRepository for EphemeralStore {
    async fn create(&self, comparison: NewComparison) -> AppResult<ComparisonResult> {
        Ok(ComparisonResult {
            id: Uuid::new_v4(),
            user_id: comparison.user_id,
            companies: comparison.companies,
            metrics: comparison.metrics,
            insights: comparison.insights,
            charts: comparison.charts,
            created_at: Utc::now(),
        })
    }

    async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<ComparisonResult>> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user_id: Uuid,
        _params: &PaginationParams,
    ) -> AppResult<(Vec<ComparisonResult>, u64)> {
        Ok((Vec::new(), 0))
    }
}

#[async_trait]
impl MonitoredCompanyRepository for EphemeralStore {
    async fn create(
        &self,
        name: String,
        _company_key: String,
        added_by: Option<Uuid>,
    ) -> AppResult<MonitoredCompany> {
        Ok(MonitoredCompany {
            id: Uuid::new_v4(),
            name,
            added_by,
            created_at: Utc::now(),
            last_checked_at: None,
        })
    }

    async fn find_by_key(&self, _company_key: &str) -> AppResult<Option<MonitoredCompany>> {
        Ok(None)
    }

    async fn list(&self) -> AppResult<Vec<MonitoredCompany>> {
        Ok(Vec::new())
    }

    async fn delete_by_key(&self, _company_key: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn touch_checked(&self, _company_key: &str, _at: DateTime<Utc>) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl SentimentRepository for EphemeralStore {
    async fn insert(&self, point: NewSentimentPoint) -> AppResult<SentimentPoint> {
        let sentiment = point.sentiment;
        Ok(SentimentPoint {
            id: Uuid::new_v4(),
            company_name: point.company_name,
            score: sentiment.overall_score,
            positive: sentiment.positive,
            neutral: sentiment.neutral,
            negative: sentiment.negative,
            sample_size: point.sample_size,
            themes: sentiment.key_themes,
            recorded_at: Utc::now(),
        })
    }

    async fn history(&self, _company_key: &str, _limit: u64) -> AppResult<Vec<SentimentPoint>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisReport, AnalysisSource};

    #[tokio::test]
    async fn test_create_echoes_and_nothing_is_kept() {
        let store = EphemeralStore;
        let created = AnalysisRepository::create(
            &store,
            NewAnalysis {
                user_id: Uuid::nil(),
                company_name: "Acme".to_string(),
                company_key: "acme".to_string(),
                source: AnalysisSource::Company,
                document_name: None,
                report: AnalysisReport::default(),
                charts: vec![],
            },
        )
        .await
        .unwrap();

        assert_eq!(created.company_name, "Acme");
        assert!(AnalysisRepository::find_by_id(&store, created.id)
            .await
            .unwrap()
            .is_none());
    }
}
