// Web Summary Fetcher: search for a page title, then fetch that page's extract

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{StatusCode, Url};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{PageSummary, SearchResponse};

#[derive(Clone)]
pub struct SummaryFetcher {
    http: reqwest::Client,
    search_url: String,
    summary_url: String,
    user_agent: String,
    timeout: Duration,
}

impl SummaryFetcher {
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            search_url: config.wiki_search_url.clone(),
            summary_url: config.wiki_summary_url.clone(),
            user_agent: config.web_user_agent.clone(),
            timeout: Duration::from_secs(config.web_timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Every failure collapses to `None`; nothing is cached.
    pub async fn fetch_summary(&self, query: &str) -> Option<String> {
        match self.try_fetch(query).await {
            Ok(Some(extract)) => {
                info!("Web summary found for query ({} chars)", extract.len());
                Some(extract)
            }
            Ok(None) => {
                info!("No web summary for query");
                None
            }
            Err(e) => {
                warn!("Web summary lookup failed: {:#}", e);
                None
            }
        }
    }

    async fn try_fetch(&self, query: &str) -> Result<Option<String>> {
        let Some(title) = self.search_title(query).await? else {
            return Ok(None);
        };
        self.page_extract(&title).await
    }

    async fn search_title(&self, query: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(&self.search_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("utf8", "1"),
            ])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .context("search request failed")?;

        let results: SearchResponse = response
            .json()
            .await
            .context("search response was not the expected JSON")?;

        Ok(results.query.search.into_iter().next().map(|hit| hit.title))
    }

    async fn page_extract(&self, title: &str) -> Result<Option<String>> {
        let url = self.summary_page_url(title)?;

        let response = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .context("summary request failed")?;

        if response.status() != StatusCode::OK {
            info!("Summary for {:?} returned {}", title, response.status());
            return Ok(None);
        }

        let summary: PageSummary = response
            .json()
            .await
            .context("summary response was not the expected JSON")?;

        Ok(summary.extract.filter(|extract| !extract.trim().is_empty()))
    }

    /// The title goes in verbatim as a single, percent-encoded path segment.
    fn summary_page_url(&self, title: &str) -> Result<Url> {
        let mut url = Url::parse(&self.summary_url)
            .with_context(|| format!("invalid summary url {}", self.summary_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("summary url cannot take a path: {}", self.summary_url))?
            .pop_if_empty()
            .push(title);
        Ok(url)
    }
}
