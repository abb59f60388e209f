//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use super::constants::{
    DEFAULT_COMPARISON_TIMEOUT_SECONDS, DEFAULT_CORS_ALLOWED_ORIGINS, DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS,
    DEFAULT_LLM_API_URL, DEFAULT_LLM_MAX_TOKENS, DEFAULT_LLM_MODEL, DEFAULT_LLM_TEMPERATURE,
    DEFAULT_LLM_TIMEOUT_SECONDS, DEFAULT_MONITOR_FAILURE_THRESHOLD,
    DEFAULT_MONITOR_INTERVAL_SECONDS, DEFAULT_REDIS_URL, DEFAULT_REQUEST_TIMEOUT_SECONDS,
    DEFAULT_SCRAPER_MAX_BYTES, DEFAULT_SCRAPER_TIMEOUT_SECONDS, DEFAULT_SEARCH_API_URL,
    MIN_JWT_SECRET_LENGTH,
};

/// Language model endpoint settings
#[derive(Clone)]
pub struct LlmSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

/// Web search and scraping settings
#[derive(Clone)]
pub struct SearchSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
    pub scraper_timeout_seconds: u64,
    pub scraper_max_bytes: usize,
}

/// Sentiment monitor settings
#[derive(Clone, Debug)]
pub struct MonitorSettings {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub failure_threshold: u32,
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub request_timeout_seconds: u64,
    pub comparison_timeout_seconds: u64,
    pub cors_allowed_origins: Vec<String>,
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub monitor: MonitorSettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("comparison_timeout_seconds", &self.comparison_timeout_seconds)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("llm_api_url", &self.llm.api_url)
            .field("llm_api_key", &self.llm.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("llm_model", &self.llm.model)
            .field("search_api_url", &self.search.api_url)
            .field("search_api_key", &self.search.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("monitor", &self.monitor)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set in release builds or is too short.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: parsed("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS),
            request_timeout_seconds: parsed(
                "REQUEST_TIMEOUT_SECONDS",
                DEFAULT_REQUEST_TIMEOUT_SECONDS,
            ),
            comparison_timeout_seconds: parsed(
                "COMPARISON_TIMEOUT_SECONDS",
                DEFAULT_COMPARISON_TIMEOUT_SECONDS,
            ),
            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGINS.to_string()),
            ),
            llm: LlmSettings {
                api_url: env::var("LLM_API_URL")
                    .unwrap_or_else(|_| DEFAULT_LLM_API_URL.to_string()),
                api_key: non_empty("LLM_API_KEY"),
                model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
                temperature: parsed("LLM_TEMPERATURE", DEFAULT_LLM_TEMPERATURE),
                max_tokens: parsed("LLM_MAX_TOKENS", DEFAULT_LLM_MAX_TOKENS),
                timeout_seconds: parsed("LLM_TIMEOUT_SECONDS", DEFAULT_LLM_TIMEOUT_SECONDS),
            },
            search: SearchSettings {
                api_url: env::var("SEARCH_API_URL")
                    .unwrap_or_else(|_| DEFAULT_SEARCH_API_URL.to_string()),
                api_key: non_empty("SEARCH_API_KEY"),
                engine_id: non_empty("SEARCH_ENGINE_ID"),
                scraper_timeout_seconds: parsed(
                    "SCRAPER_TIMEOUT_SECONDS",
                    DEFAULT_SCRAPER_TIMEOUT_SECONDS,
                ),
                scraper_max_bytes: parsed("SCRAPER_MAX_BYTES", DEFAULT_SCRAPER_MAX_BYTES),
            },
            monitor: MonitorSettings {
                enabled: env::var("MONITOR_ENABLED")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(true),
                interval_seconds: parsed(
                    "MONITOR_INTERVAL_SECONDS",
                    DEFAULT_MONITOR_INTERVAL_SECONDS,
                )
                .max(1),
                failure_threshold: parsed(
                    "MONITOR_FAILURE_THRESHOLD",
                    DEFAULT_MONITOR_FAILURE_THRESHOLD,
                )
                .max(1),
            },
        }
    }

    /// Fixed configuration that never reads the environment, for tests.
    pub fn for_tests() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: "test-secret-key-with-32-characters!".to_string(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            comparison_timeout_seconds: DEFAULT_COMPARISON_TIMEOUT_SECONDS,
            cors_allowed_origins: vec!["*".to_string()],
            llm: LlmSettings {
                api_url: DEFAULT_LLM_API_URL.to_string(),
                api_key: None,
                model: DEFAULT_LLM_MODEL.to_string(),
                temperature: DEFAULT_LLM_TEMPERATURE,
                max_tokens: DEFAULT_LLM_MAX_TOKENS,
                timeout_seconds: DEFAULT_LLM_TIMEOUT_SECONDS,
            },
            search: SearchSettings {
                api_url: DEFAULT_SEARCH_API_URL.to_string(),
                api_key: None,
                engine_id: None,
                scraper_timeout_seconds: DEFAULT_SCRAPER_TIMEOUT_SECONDS,
                scraper_max_bytes: DEFAULT_SCRAPER_MAX_BYTES,
            },
            monitor: MonitorSettings {
                enabled: false,
                interval_seconds: DEFAULT_MONITOR_INTERVAL_SECONDS,
                failure_threshold: DEFAULT_MONITOR_FAILURE_THRESHOLD,
            },
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Whether CORS should allow any origin.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example ,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_env();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("dev-secret-key"));
    }
}
