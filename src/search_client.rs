use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::config::AnalyserConfig;
use crate::error::{AnalyserError, SearchError};

const TEXT_MATCH_MEDIA_TYPE: &str = "application/vnd.github.text-match+json";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = "files-letter-analyzer";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Ask for text-match metadata alongside each hit.
    pub text_match: bool,
}

/// What the fetcher needs from one search response.
///
/// `total` is only meaningful when `status` is a success.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub total: u64,
}

/// Issues code-search queries.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search_code(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError>;
}

#[async_trait]
impl<T: SearchClient + ?Sized> SearchClient for Arc<T> {
    async fn search_code(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError> {
        (**self).search_code(query, options).await
    }
}

/// [`SearchClient`] backed by the GitHub REST API.
pub struct GitHubClient {
    client: Client,
    token: String,
    base_url: String,
}

impl GitHubClient {
    /// Create a new GitHubClient from the run configuration
    pub fn new(config: &AnalyserConfig) -> Result<Self, AnalyserError> {
        if config.token.trim().is_empty() {
            return Err(AnalyserError::MissingToken);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(AnalyserError::ClientBuild)?;

        Ok(GitHubClient {
            client,
            token: config.token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search/code", self.base_url)
    }
}

#[async_trait]
impl SearchClient for GitHubClient {
    async fn search_code(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError> {
        let url = self.search_url();
        let accept = if options.text_match {
            TEXT_MATCH_MEDIA_TYPE
        } else {
            GITHUB_MEDIA_TYPE
        };

        debug!("Requesting URL: {} q={}", url, query);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .header("Accept", accept)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();

        // Error bodies are left for the caller to judge by status and headers
        if !status.is_success() {
            return Ok(SearchResponse {
                status,
                headers,
                total: 0,
            });
        }

        let json: Value = response.json().await?;
        let total = total_count(&json)?;

        Ok(SearchResponse {
            status,
            headers,
            total,
        })
    }
}

fn total_count(json: &Value) -> Result<u64, SearchError> {
    json["total_count"]
        .as_u64()
        .ok_or_else(|| SearchError::InvalidBody("missing or non-integer 'total_count'".into()))
}
