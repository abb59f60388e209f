//! HTTP request handlers.

pub mod analysis_handler;
pub mod auth_handler;
pub mod comparison_handler;
pub mod monitoring_handler;
pub mod sentiment_handler;

pub use analysis_handler::analysis_routes;
pub use auth_handler::{account_routes, auth_routes};
pub use comparison_handler::comparison_routes;
pub use monitoring_handler::monitoring_routes;
pub use sentiment_handler::sentiment_routes;
