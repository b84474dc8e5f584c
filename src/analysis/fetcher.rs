use std::time::{Duration, Instant};

use log::{debug, warn};
use reqwest::{Client, redirect::Policy};

use crate::{config::AppConfig, error::AppResult};

const MAX_REDIRECTS: usize = 10;

/// A page downloaded for analysis.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub status: u16,
    pub html: String,
    /// Milliseconds from sending the request until the response headers arrived.
    pub load_time_ms: u64,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(config.fetch_timeout(), &config.fetch_user_agent)
    }

    /// GETs `url`, following redirects. Non-2xx responses are still returned;
    /// an error page is scored like any other page.
    pub async fn fetch(&self, url: &str) -> AppResult<FetchedPage> {
        let started = Instant::now();
        let resp = self.client.get(url).send().await.inspect_err(|e| {
            warn!("Fetching {} failed: {}", url, e);
        })?;
        let load_time_ms = started.elapsed().as_millis() as u64;

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let html = resp.text().await?;
        debug!(
            "Fetched {} ({} -> {}, {} bytes in {}ms)",
            url,
            status,
            final_url,
            html.len(),
            load_time_ms
        );

        Ok(FetchedPage {
            final_url,
            status,
            html,
            load_time_ms,
        })
    }
}
