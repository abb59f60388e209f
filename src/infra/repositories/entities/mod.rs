//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Structured artifacts are stored as jsonb and decoded on the way out.

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{AppError, AppResult};

pub mod comparison_result;
pub mod monitored_company;
pub mod sentiment_data;
pub mod user;
pub mod user_analysis;

/// Decode a jsonb column into its domain type.
pub(crate) fn from_json<T: DeserializeOwned>(value: sea_orm::prelude::Json, column: &str) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::internal(format!("Corrupt {} column: {}", column, e)))
}

/// Encode a domain value for a jsonb column.
pub(crate) fn to_json<T: Serialize>(value: &T) -> AppResult<sea_orm::prelude::Json> {
    serde_json::to_value(value)
        .map_err(|e| AppError::internal(format!("JSON encoding failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisReport, SwotAnalysis};

    #[test]
    fn test_report_json_round_trip() {
        let report = AnalysisReport {
            swot: Some(SwotAnalysis {
                strengths: vec!["Brand".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let json = to_json(&report).unwrap();
        let back: AnalysisReport = from_json(json, "report").unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_corrupt_column_is_internal_error() {
        let err = from_json::<Vec<String>>(serde_json::json!({"not": "a list"}), "themes")
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
