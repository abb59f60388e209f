//! Web search client (Google Custom Search JSON API shape).

use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use crate::config::{SearchSettings, MAX_SEARCH_RESULTS};
use crate::errors::{AppError, AppResult};

/// One organic search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Web search backend used to gather research context.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Up to `limit` hits for `query`, best first.
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<SearchHit>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

impl From<SearchItem> for SearchHit {
    fn from(item: SearchItem) -> Self {
        Self {
            title: item.title,
            url: item.link,
            snippet: item.snippet.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

pub struct CustomSearchClient {
    client: Client,
    settings: SearchSettings,
}

impl CustomSearchClient {
    pub fn new(settings: SearchSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.scraper_timeout_seconds))
            .build()?;

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl WebSearch for CustomSearchClient {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<SearchHit>> {
        let (Some(key), Some(engine_id)) = (
            self.settings.api_key.as_deref(),
            self.settings.engine_id.as_deref(),
        ) else {
            return Err(AppError::upstream(
                "SEARCH_API_KEY and SEARCH_ENGINE_ID must be configured",
            ));
        };

        let num = limit.clamp(1, MAX_SEARCH_RESULTS).to_string();
        let response = self
            .client
            .get(&self.settings.api_url)
            .query(&[("key", key), ("cx", engine_id), ("q", query), ("num", num.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!("Search API returned {}", status)));
        }

        let parsed: SearchResponse = response.json().await?;
        let hits: Vec<SearchHit> = parsed
            .items
            .into_iter()
            .take(limit)
            .map(SearchHit::from)
            .collect();

        tracing::debug!(query = %query, hits = hits.len(), "Web search completed");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_items_means_no_hits() {
        let parsed: SearchResponse =
            serde_json::from_str(r#"{"searchInformation": {"totalResults": "0"}}"#).unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_item_to_hit_collapses_snippet() {
        let parsed: SearchResponse = serde_json::from_str(
            r#"{"items": [{"title": "Acme", "link": "https://acme.example", "snippet": "Acme\n makes   anvils"}]}"#,
        )
        .unwrap();
        let hit = SearchHit::from(parsed.items.into_iter().next().unwrap());
        assert_eq!(hit.url, "https://acme.example");
        assert_eq!(hit.snippet, "Acme makes anvils");
    }

    #[tokio::test]
    async fn test_unconfigured_client_is_upstream_error() {
        let client = CustomSearchClient::new(SearchSettings {
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            engine_id: None,
            scraper_timeout_seconds: 1,
            scraper_max_bytes: 1024,
        })
        .unwrap();
        let err = client.search("acme", 5).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
