use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use spider_client::shapes::request::{ReturnFormat, ReturnFormatHandling};
use spider_client::{RequestParams, Spider};
use tracing::{info, warn};

use crate::extract;

const USER_AGENT: &str = "Mozilla/5.0";
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
const PAGE_SAFETY_LIMIT: u64 = 100;

/// How page HTML is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchBackend {
    /// Plain HTTP GET; enough when the server embeds its state in the markup.
    Http,
    /// spider.cloud rendering session, for pages that hydrate client-side.
    Rendered,
}

/// Explicit fetch configuration. Rendering is a capability the caller grants
/// here, never ambient state.
pub struct FetchConfig {
    pub backend: FetchBackend,
    /// Cookie header attached to plain HTTP fetches (session passthrough).
    pub cookies: Option<String>,
    /// Tracks requested per page during pagination.
    pub per_page: u64,
    /// When false, fetch the URL exactly once, as given.
    pub paginate: bool,
    /// Directory receiving one page_<n>.html artifact per fetched page.
    pub debug_dir: Option<PathBuf>,
}

pub struct Fetcher {
    config: FetchConfig,
    http: reqwest::Client,
    spider: Option<Spider>,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        let spider = match config.backend {
            FetchBackend::Rendered => {
                let api_key = std::env::var("SPIDER_API_KEY").map_err(|_| {
                    anyhow::anyhow!(
                        "SPIDER_API_KEY environment variable must be set for rendered fetches (or pass --plain)"
                    )
                })?;
                let client = Spider::new(Some(api_key))
                    .map_err(|e| anyhow::anyhow!("Failed to create spider.cloud client: {}", e))?;
                Some(client)
            }
            FetchBackend::Http => None,
        };

        Ok(Self { config, http, spider })
    }

    /// Fetch every page of a playlist. Requests page=N&per_page=M variants of
    /// the URL until a page comes back short, the hydration payload reports no
    /// next cursor, or the safety limit trips. Returns page sources in order.
    pub async fn fetch_playlist_pages(&self, url: &str) -> Result<Vec<String>> {
        if !self.config.paginate {
            let html = self.fetch_page(url).await?;
            info!("Retrieved {} bytes of HTML", html.len());
            self.write_debug_page(1, &html);
            return Ok(vec![html]);
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} fetching {msg}")?);

        let mut pages = Vec::new();
        let mut page = 1u64;
        loop {
            let paginated = paginated_url(url, page, self.config.per_page);
            pb.set_message(format!("page {}", page));

            let html = self.fetch_page(&paginated).await?;
            self.write_debug_page(page, &html);

            let window = extract::hydrated_page_window(&html);
            let count = window.as_ref().map(|w| w.results).unwrap_or(0);
            info!("Page {}: {} tracks", page, count);
            pages.push(html);

            let short_page = (count as u64) < self.config.per_page;
            let exhausted = window.is_some_and(|w| !w.has_next);
            if short_page || exhausted {
                break;
            }

            page += 1;
            if page > PAGE_SAFETY_LIMIT {
                warn!("Reached safety limit of {} pages", PAGE_SAFETY_LIMIT);
                break;
            }
        }

        pb.finish_and_clear();
        info!("Completed pagination: {} page(s)", pages.len());
        Ok(pages)
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        match &self.spider {
            Some(spider) => fetch_rendered_with_retry(spider, url).await,
            None => self.fetch_http(url).await,
        }
    }

    async fn fetch_http(&self, url: &str) -> Result<String> {
        let mut request = self.http.get(url);
        if let Some(cookies) = &self.config.cookies {
            request = request.header(reqwest::header::COOKIE, cookies.clone());
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Server rejected {}", url))?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))
    }

    fn write_debug_page(&self, page: u64, html: &str) {
        let Some(dir) = &self.config.debug_dir else {
            return;
        };
        let path = dir.join(format!("page_{}.html", page));
        match std::fs::write(&path, html) {
            Ok(()) => info!("Page source saved: {}", path.display()),
            Err(e) => warn!("Failed to save page source {}: {}", path.display(), e),
        }
    }
}

async fn fetch_rendered_with_retry(spider: &Spider, url: &str) -> Result<String> {
    for attempt in 0..=MAX_RETRIES {
        match fetch_rendered(spider, url).await {
            Ok(html) => return Ok(html),
            Err(e) => {
                let msg = e.to_string();
                let should_retry = msg.contains("429")
                    || msg.contains("rate")
                    || msg.contains("500")
                    || msg.contains("502")
                    || msg.contains("503");
                if !should_retry || attempt == MAX_RETRIES {
                    return Err(e);
                }
                let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                warn!(
                    "Fetch failed for {} (attempt {}/{}), backing off {:.1}s: {}",
                    url,
                    attempt + 1,
                    MAX_RETRIES,
                    backoff.as_secs_f64(),
                    msg
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }

    fetch_rendered(spider, url).await
}

async fn fetch_rendered(spider: &Spider, url: &str) -> Result<String> {
    let params = RequestParams {
        return_format: Some(ReturnFormatHandling::Single(ReturnFormat::Raw)),
        ..Default::default()
    };

    let response = spider
        .scrape_url(url, Some(params), "application/json")
        .await
        .map_err(|e| anyhow::anyhow!("spider.cloud scrape failed: {}", e))?;

    let parsed: serde_json::Value = match response.as_str() {
        Some(s) => serde_json::from_str(s).unwrap_or(response.clone()),
        None => response,
    };

    parsed
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|obj| obj.get("content"))
        .and_then(|content| content.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No content in spider.cloud response"))
}

fn paginated_url(url: &str, page: u64, per_page: u64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}page={}&per_page={}", url, sep, page, per_page)
}

// ── Tests ──
