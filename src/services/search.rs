// src/services/search.rs

//! Search provider adapters and the candidate source.
//!
//! A `SearchProvider` turns one query into one request against an external
//! search engine. `CandidateSource` wraps a provider and drops URLs that were
//! already classified in this process.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::config::SearchCredentials;
use crate::error::{AppError, Result};
use crate::models::{ProviderKind, SearchConfig};
use crate::services::VisitedSet;
use crate::utils::http;

/// Google Custom Search JSON API endpoint.
const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// DuckDuckGo HTML endpoint.
const DDG_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

/// External web search boundary.
///
/// One call is one provider request; implementations do not paginate or
/// retry. Transport and authorization failures are reported as
/// `AppError::Provider`.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Run one query and return result URLs in rank order.
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}

/// Build the provider selected in the configuration.
///
/// Missing credentials fail here, before any query is attempted.
pub fn create_provider(config: &SearchConfig) -> Result<Arc<dyn SearchProvider>> {
    create_provider_with(config, |name| std::env::var(name).ok())
}

pub(crate) fn create_provider_with(
    config: &SearchConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn SearchProvider>> {
    match config.provider {
        ProviderKind::Google => {
            let credentials = SearchCredentials::resolve_with(config, lookup)?;
            Ok(Arc::new(GoogleSearchProvider::new(config, credentials)?))
        }
        ProviderKind::DuckDuckGo => Ok(Arc::new(DuckDuckGoProvider::new(config)?)),
    }
}

// --- Google ---

/// Google Custom Search provider.
pub struct GoogleSearchProvider {
    client: Client,
    endpoint: String,
    credentials: SearchCredentials,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Option<Vec<GoogleItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    link: String,
}

impl GoogleSearchProvider {
    pub fn new(config: &SearchConfig, credentials: SearchCredentials) -> Result<Self> {
        Ok(Self {
            client: http::create_client(&config.user_agent, config.timeout_secs)?,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| GOOGLE_SEARCH_URL.to_string()),
            credentials,
        })
    }

    /// Extract result links. A response without `items` has no results.
    fn parse_links(body: &str) -> serde_json::Result<Vec<String>> {
        let response: GoogleResponse = serde_json::from_str(body)?;
        Ok(response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.link)
            .collect())
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        log::debug!("Google search: {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("key", self.credentials.api_key.as_str()),
                ("cx", self.credentials.cx.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::provider(query, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::provider(query, format!("Google returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::provider(query, e))?;
        Self::parse_links(&body).map_err(|e| AppError::provider(query, e))
    }
}

// --- DuckDuckGo ---

/// DuckDuckGo HTML search provider. Needs no credentials.
pub struct DuckDuckGoProvider {
    client: Client,
    endpoint: String,
    result_selector: Selector,
}

impl DuckDuckGoProvider {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_client(&config.user_agent, config.timeout_secs)?,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DDG_SEARCH_URL.to_string()),
            result_selector: http::parse_selector("a.result__a")?,
        })
    }

    fn parse_results(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let links: Vec<String> = document
            .select(&self.result_selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(Self::extract_url)
            .collect();

        log::debug!("Parsed {} results from DuckDuckGo", links.len());
        links
    }

    /// Extract the target URL from DuckDuckGo's redirect links.
    fn extract_url(href: &str) -> Option<String> {
        if href.starts_with("//duckduckgo.com/l/") {
            // //duckduckgo.com/l/?uddg=<encoded_url>&...
            let start = href.find("uddg=")? + 5;
            let encoded = &href[start..];
            let end = encoded.find('&').unwrap_or(encoded.len());
            urlencoding::decode(&encoded[..end])
                .ok()
                .map(|s| s.into_owned())
        } else if href.starts_with("http://") || href.starts_with("https://") {
            Some(href.to_string())
        } else if href.starts_with("//") {
            Some(format!("https:{href}"))
        } else {
            None
        }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        log::debug!("DuckDuckGo search: {}", query);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query), ("kl", "fr-fr")])
            .send()
            .await
            .map_err(|e| AppError::provider(query, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::provider(
                query,
                format!("DuckDuckGo returned {status}"),
            ));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::provider(query, e))?;
        Ok(self.parse_results(&html))
    }
}

// --- Candidate source ---

/// Provider results minus already-visited URLs.
#[derive(Clone)]
pub struct CandidateSource {
    provider: Arc<dyn SearchProvider>,
    visited: Arc<VisitedSet>,
}

impl CandidateSource {
    pub fn new(provider: Arc<dyn SearchProvider>, visited: Arc<VisitedSet>) -> Self {
        Self { provider, visited }
    }

    /// One provider request for `query`, with visited URLs removed.
    pub async fn fetch(&self, query: &str) -> Result<Vec<String>> {
        let urls = self.provider.search(query).await?;
        let total = urls.len();
        let fresh: Vec<String> = urls
            .into_iter()
            .filter(|url| !self.visited.contains(url))
            .collect();

        log::debug!(
            "{} returned {} URLs for '{}' ({} unseen)",
            self.provider.name(),
            total,
            query,
            fresh.len()
        );
        Ok(fresh)
    }
}
