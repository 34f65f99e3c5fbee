//! Browser driver backed by plain HTTP requests and static HTML parsing.
//!
//! Pages are fetched with `reqwest` and queried with `scraper` CSS selectors.
//! No JavaScript runs, so content injected client-side is invisible to this
//! driver; use the `webdriver` feature for such sites.

use crate::config::BrowserConfig;
use crate::domain::model::Link;
use crate::domain::ports::Browser;
use crate::utils::error::{CrawlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

struct LoadedPage {
    url: Url,
    html: String,
}

pub struct HttpBrowser {
    client: Client,
    page: Option<LoadedPage>,
}

impl HttpBrowser {
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client, page: None })
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        tracing::debug!("GET {}", url);
        self.page = None;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::NavigationError {
                url: url.to_string(),
                message: format!("HTTP status {}", status),
            });
        }

        // 重新導向後的最終網址，用來解析相對連結
        let final_url = response.url().clone();
        let html = response.text().await?;
        tracing::debug!("Loaded {} ({} bytes)", final_url, html.len());

        self.page = Some(LoadedPage {
            url: final_url,
            html,
        });
        Ok(())
    }

    async fn find_elements(&mut self, selector: &str) -> Result<Vec<Link>> {
        let page = self.page.as_ref().ok_or_else(|| CrawlError::BrowserError {
            message: "no page loaded".to_string(),
        })?;
        extract_links(&page.html, &page.url, selector)
    }

    async fn quit(&mut self) -> Result<()> {
        self.page = None;
        Ok(())
    }
}

/// Queries `html` with a CSS selector, returning each match's normalized text and
/// its `href` resolved against `base`.
pub fn extract_links(html: &str, base: &Url, selector: &str) -> Result<Vec<Link>> {
    let parsed = Selector::parse(selector).map_err(|e| CrawlError::SelectorError {
        selector: selector.to_string(),
        message: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    let links = document
        .select(&parsed)
        .map(|element| {
            let text = element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ");
            let href = element.value().attr("href").map(|raw| resolve_href(base, raw));
            Link { text, href }
        })
        .collect();

    Ok(links)
}

fn resolve_href(base: &Url, raw: &str) -> String {
    let raw = raw.trim();
    match base.join(raw) {
        Ok(url) => url.to_string(),
        Err(_) => raw.to_string(),
    }
}
