//! Company name value object.

use serde::Serialize;

use crate::config::MAX_COMPANY_NAME_LENGTH;
use crate::errors::{AppError, AppResult};

/// A validated company name together with its lookup key.
///
/// The key is the trimmed name, lower-cased, with whitespace runs collapsed,
/// so `"  Acme   Corp"` and `"acme corp"` address the same company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyName {
    display: String,
    key: String,
}

impl CompanyName {
    /// Validate and normalize a user-supplied company name.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let display = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if display.is_empty() {
            return Err(AppError::validation("Company name is required"));
        }
        if display.chars().count() > MAX_COMPANY_NAME_LENGTH {
            return Err(AppError::validation(format!(
                "Company name must be at most {} characters",
                MAX_COMPANY_NAME_LENGTH
            )));
        }

        let key = company_key(&display);
        Ok(Self { display, key })
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Display for CompanyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

/// Normalized lookup key for a company name.
pub fn company_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_and_case_normalized() {
        let name = CompanyName::parse("  Acme   Corp ").unwrap();
        assert_eq!(name.as_str(), "Acme Corp");
        assert_eq!(name.key(), "acme corp");
        assert_eq!(company_key("ACME\tcorp"), "acme corp");
    }

    #[test]
    fn test_blank_rejected() {
        assert!(matches!(
            CompanyName::parse("   ").unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn test_too_long_rejected() {
        let long = "x".repeat(MAX_COMPANY_NAME_LENGTH + 1);
        assert!(CompanyName::parse(&long).is_err());
        assert!(CompanyName::parse(&long[1..]).is_ok());
    }
}
