//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod analysis_repository;
mod comparison_repository;
mod ephemeral;
pub(crate) mod entities;
mod monitoring_repository;
mod sentiment_repository;
mod user_repository;

use sea_orm::{DbErr, SqlErr};

pub use analysis_repository::{AnalysisRepository, AnalysisStore};
pub use comparison_repository::{ComparisonRepository, ComparisonStore};
pub use ephemeral::EphemeralStore;
pub use monitoring_repository::{MonitoredCompanyRepository, MonitoredCompanyStore};
pub use sentiment_repository::{SentimentRepository, SentimentStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use analysis_repository::MockAnalysisRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use comparison_repository::MockComparisonRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use monitoring_repository::MockMonitoredCompanyRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use sentiment_repository::MockSentimentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

/// Whether an insert failed on a unique index.
pub(crate) fn unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
