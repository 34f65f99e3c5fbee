use crate::config::CatalogConfig;
use crate::core::catalog::CatalogScraper;
use crate::core::tables::write_table;
use crate::domain::model::{CatalogReport, JobSummary};
use crate::domain::ports::{Browser, Job, Storage};
use crate::utils::error::Result;
use std::time::Duration;

pub struct CatalogJob<B: Browser, S: Storage> {
    scraper: CatalogScraper<B>,
    storage: S,
    output_file: String,
}

impl<B: Browser, S: Storage> CatalogJob<B, S> {
    pub fn new(browser: B, storage: S, config: CatalogConfig, poll_interval: Duration) -> Self {
        let output_file = config.output_file.clone();
        Self {
            scraper: CatalogScraper::new(browser, config, poll_interval),
            storage,
            output_file,
        }
    }
}

#[async_trait::async_trait]
impl<B: Browser, S: Storage> Job for CatalogJob<B, S> {
    type Output = CatalogReport;

    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn extract(&mut self) -> Result<CatalogReport> {
        Ok(self.scraper.crawl().await)
    }

    async fn load(&mut self, report: CatalogReport) -> Result<JobSummary> {
        if !report.failed_categories.is_empty() {
            tracing::warn!(
                "{} of {} categories failed: {}",
                report.failed_categories.len(),
                report.categories_seen,
                report.failed_categories.join(", ")
            );
        }

        let mut summary = JobSummary {
            records: report.universities.len(),
            outputs: Vec::new(),
        };
        if write_table(&self.storage, &self.output_file, &report.universities).await? {
            tracing::info!(
                "💾 Saved {} universities to {}",
                report.universities.len(),
                self.output_file
            );
            summary.outputs.push(self.output_file.clone());
        } else {
            tracing::warn!("No universities found, {} not written", self.output_file);
        }
        Ok(summary)
    }

    async fn finish(&mut self) -> Result<()> {
        self.scraper.browser_mut().quit().await
    }
}
