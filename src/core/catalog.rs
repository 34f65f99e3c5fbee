//! Directory crawl: portal page → category pages → institution links.

use crate::config::CatalogConfig;
use crate::core::filters::{category_from_link, is_university_link};
use crate::core::wait::wait_for_links;
use crate::domain::model::{CatalogReport, Category, UniversityRecord};
use crate::domain::ports::Browser;
use crate::utils::error::Result;
use std::time::Duration;

pub struct CatalogScraper<B: Browser> {
    browser: B,
    config: CatalogConfig,
    poll_interval: Duration,
}

impl<B: Browser> CatalogScraper<B> {
    pub fn new(browser: B, config: CatalogConfig, poll_interval: Duration) -> Self {
        Self {
            browser,
            config,
            poll_interval,
        }
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    /// Full traversal. Never fails: a broken directory page yields no
    /// categories, a broken category yields no universities.
    pub async fn crawl(&mut self) -> CatalogReport {
        tracing::info!("Starting university catalog crawl at {}", self.config.base_url);
        let mut report = CatalogReport::default();

        let categories = match self.extract_categories().await {
            Ok(categories) => categories,
            Err(e) => {
                tracing::error!("Failed to extract categories: {}", e);
                Vec::new()
            }
        };
        report.categories_seen = categories.len();
        tracing::info!("Found {} categories", categories.len());
        if categories.is_empty() {
            tracing::warn!("No categories found at {}", self.config.base_url);
        }

        for category in &categories {
            match self.extract_universities(category).await {
                Ok(universities) => {
                    tracing::info!(
                        "Found {} universities in category '{}'",
                        universities.len(),
                        category.name
                    );
                    report.universities.extend(universities);
                }
                Err(e) => {
                    tracing::error!("Error processing category '{}': {}", category.name, e);
                    report.failed_categories.push(category.name.clone());
                }
            }
        }

        report
    }

    pub async fn extract_categories(&mut self) -> Result<Vec<Category>> {
        tracing::info!("Loading directory page...");
        self.browser.navigate(&self.config.base_url).await?;

        let marker = self.config.category_marker.as_str();
        let links = wait_for_links(
            &mut self.browser,
            &self.config.category_selector,
            Duration::from_secs(self.config.directory_wait_secs),
            self.poll_interval,
            |link| category_from_link(link, marker).is_some(),
        )
        .await?;

        Ok(links
            .iter()
            .filter_map(|link| category_from_link(link, marker))
            .collect())
    }

    pub async fn extract_universities(&mut self, category: &Category) -> Result<Vec<UniversityRecord>> {
        tracing::info!("Loading category '{}': {}", category.name, category.url);
        self.browser.navigate(&category.url).await?;

        let keywords = &self.config.exclude_keywords;
        let names = &self.config.exclude_names;
        let links = wait_for_links(
            &mut self.browser,
            &self.config.university_selector,
            Duration::from_secs(self.config.category_wait_secs),
            self.poll_interval,
            |link| is_university_link(link, keywords, names),
        )
        .await?;

        let mut universities = Vec::new();
        for link in links {
            if is_university_link(&link, keywords, names) {
                tracing::debug!("University found: {} - {:?}", link.text, link.href);
                universities.push(UniversityRecord {
                    category: category.name.clone(),
                    name: link.text,
                    url: link.href.unwrap_or_default(),
                });
            } else {
                tracing::debug!("Discarded: {} - {:?}", link.text, link.href);
            }
        }
        Ok(universities)
    }
}
