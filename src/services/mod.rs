//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services reach persistence through the Unit of Work and the outside
//! world through the `LanguageModel`, `WebSearch` and `PageScraper` traits.

mod analysis_service;
mod auth_service;
mod comparison_service;
pub mod container;
mod monitoring_service;
mod sentiment_service;

// Service Container
pub use container::{Backends, ServiceContainer, Services};

// Service traits and implementations
pub use analysis_service::{AnalysisService, Analyzer};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use comparison_service::{Comparator, ComparisonService};
pub use monitoring_service::{MonitorRegistry, MonitoringService};
pub use sentiment_service::{SentimentCapture, SentimentService, SentimentTracker};

#[cfg(any(test, feature = "test-utils"))]
pub use analysis_service::MockAnalysisService;
#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use comparison_service::MockComparisonService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use monitoring_service::MockMonitoringService;
#[cfg(any(test, feature = "test-utils"))]
pub use sentiment_service::MockSentimentService;
