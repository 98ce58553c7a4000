//! GitHub repository search feed

use std::collections::VecDeque;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{RepositoryRecord, RepositorySource, SourceError, SourceResult};
use crate::credentials::Credentials;

pub const API_ROOT: &str = "https://api.github.com";
/// Results per search page (the API maximum)
pub const PER_PAGE: usize = 100;
/// The search API never returns more than this many results for one query
pub const MAX_RESULTS: usize = 1000;

const ACCEPT: &str = "application/vnd.github+json";
const INVALID_CREDENTIALS: &str = "GitHub rejected the access token. Generate a valid token for your account at https://github.com/settings/personal-access-tokens";

#[derive(Debug, Deserialize)]
struct SearchPage {
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    full_name: String,
    clone_url: String,
    /// KiB
    size: u64,
}

/// Pages through repositories written in one language
#[derive(Debug)]
pub struct GitHubSearch {
    client: reqwest::Client,
    api_root: String,
    language: String,
    credentials: Option<Credentials>,
    next_page: usize,
    buffer: VecDeque<RepositoryRecord>,
    yielded: usize,
    exhausted: bool,
}

impl GitHubSearch {
    pub fn new(language: impl Into<String>, credentials: Option<Credentials>) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Http {
                url: API_ROOT.to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self::with_client(language, credentials, client))
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(
        language: impl Into<String>,
        credentials: Option<Credentials>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            api_root: API_ROOT.to_string(),
            language: language.into(),
            credentials,
            next_page: 1,
            buffer: VecDeque::new(),
            yielded: 0,
            exhausted: false,
        }
    }

    /// Talk to a different API endpoint
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into().trim_end_matches('/').to_string();
        self
    }

    /// Check that the API is reachable and accepts the credentials
    pub async fn verify(&self) -> SourceResult<()> {
        let url = format!("{}/", self.api_root);
        self.get(&url).await?;
        log::info!("Connected to {}", self.api_root);
        Ok(())
    }

    /// Search page URL with the query form-encoded, so languages like `c++` survive
    fn search_url(&self, page: usize) -> SourceResult<String> {
        let base = format!("{}/search/repositories", self.api_root);
        let params = [
            ("q", format!("language:{}", self.language)),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        reqwest::Url::parse_with_params(&base, &params)
            .map(String::from)
            .map_err(|e| SourceError::InvalidUrl {
                url: base,
                message: e.to_string(),
            })
    }

    async fn get(&self, url: &str) -> SourceResult<String> {
        let mut request = self.client.get(url).header(reqwest::header::ACCEPT, ACCEPT);
        if let Some(credentials) = &self.credentials {
            request = request.bearer_auth(credentials.token());
        }

        let response = request.send().await.map_err(|e| SourceError::Http {
            url: url.to_string(),
            message: format!("Network request failed: {}", e),
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SourceError::Authentication {
                message: INVALID_CREDENTIALS.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Response {
                url: url.to_string(),
                message: format!(
                    "HTTP {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
            });
        }

        response.text().await.map_err(|e| SourceError::Http {
            url: url.to_string(),
            message: format!("Failed to read response body: {}", e),
        })
    }

    async fn fetch_page(&mut self) -> SourceResult<()> {
        let url = self.search_url(self.next_page)?;
        log::debug!("Fetching search page {}", self.next_page);
        let body = self.get(&url).await?;
        let records = parse_search_page(&url, &body)?;

        if records.len() < PER_PAGE {
            self.exhausted = true;
        }
        self.next_page += 1;
        self.buffer.extend(records);
        Ok(())
    }
}

#[async_trait]
impl RepositorySource for GitHubSearch {
    fn name(&self) -> &str {
        "GitHub search"
    }

    async fn next(&mut self) -> SourceResult<Option<RepositoryRecord>> {
        if self.yielded >= MAX_RESULTS {
            return Ok(None);
        }
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_page().await?;
        }

        let record = self.buffer.pop_front();
        if record.is_some() {
            self.yielded += 1;
        }
        Ok(record)
    }
}

/// Records from one search response body; sizes are converted from KiB to bytes
pub fn parse_search_page(url: &str, body: &str) -> SourceResult<Vec<RepositoryRecord>> {
    let page: SearchPage = serde_json::from_str(body).map_err(|e| SourceError::Response {
        url: url.to_string(),
        message: format!("Invalid search response: {}", e),
    })?;

    Ok(page
        .items
        .into_iter()
        .map(|item| {
            RepositoryRecord::new(
                item.full_name,
                item.clone_url,
                Some(item.size.saturating_mul(1024)),
            )
        })
        .collect())
}
