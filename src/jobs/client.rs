use std::time::Duration;

use reqwest::Client;

use super::error::JobSearchError;
use super::types::SearchResponse;
use crate::ledger::JobListing;

pub struct JobSearchClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl JobSearchClient {
    /// Create a client for the search API rooted at `base_url`.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            api_key,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn host(&self) -> &str {
        self.base_url
            .split("://")
            .nth(1)
            .unwrap_or(self.base_url.as_str())
            .split('/')
            .next()
            .unwrap_or_default()
    }

    /// Search postings for `query`, `num_pages` pages deep.
    pub async fn search(&self, query: &str, num_pages: u32) -> Result<Vec<JobListing>, JobSearchError> {
        if self.api_key.is_empty() {
            return Err(JobSearchError::MissingApiKey);
        }

        let pages = num_pages.max(1).to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", self.host())
            .query(&[("query", query), ("num_pages", pages.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(JobSearchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<SearchResponse>().await?;
        Ok(body.data.into_iter().map(JobListing::from).collect())
    }
}
