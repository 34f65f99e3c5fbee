use crate::config::ProgramsConfig;
use crate::core::programs::ProgramScraper;
use crate::core::tables::{read_table, write_table};
use crate::domain::model::{JobSummary, ProgramReport, UniversityRow};
use crate::domain::ports::{Browser, Job, Storage};
use crate::utils::error::Result;
use std::time::Duration;

pub struct ProgramsJob<B: Browser, S: Storage> {
    scraper: ProgramScraper<B>,
    storage: S,
    input_file: String,
    programs_file: String,
    unresolved_file: String,
}

impl<B: Browser, S: Storage> ProgramsJob<B, S> {
    pub fn new(browser: B, storage: S, config: ProgramsConfig, poll_interval: Duration) -> Self {
        let input_file = config.input_file.clone();
        let programs_file = config.programs_file.clone();
        let unresolved_file = config.unresolved_file.clone();
        Self {
            scraper: ProgramScraper::new(browser, config, poll_interval),
            storage,
            input_file,
            programs_file,
            unresolved_file,
        }
    }
}

#[async_trait::async_trait]
impl<B: Browser, S: Storage> Job for ProgramsJob<B, S> {
    type Output = ProgramReport;

    fn name(&self) -> &'static str {
        "programs"
    }

    /// A missing or malformed university table aborts the run before any
    /// site is visited.
    async fn extract(&mut self) -> Result<ProgramReport> {
        let universities: Vec<UniversityRow> = read_table(&self.storage, &self.input_file).await?;
        tracing::info!(
            "Loaded {} universities from {}",
            universities.len(),
            self.input_file
        );
        Ok(self.scraper.crawl(&universities).await)
    }

    async fn load(&mut self, report: ProgramReport) -> Result<JobSummary> {
        let mut summary = JobSummary {
            records: report.programs.len(),
            outputs: Vec::new(),
        };

        if write_table(&self.storage, &self.programs_file, &report.programs).await? {
            tracing::info!(
                "💾 Saved {} programs to {}",
                report.programs.len(),
                self.programs_file
            );
            summary.outputs.push(self.programs_file.clone());
        } else {
            tracing::warn!("No programs found, {} not written", self.programs_file);
        }

        if write_table(&self.storage, &self.unresolved_file, &report.unresolved).await? {
            tracing::info!(
                "💾 Saved {} universities without programs to {}",
                report.unresolved.len(),
                self.unresolved_file
            );
            summary.outputs.push(self.unresolved_file.clone());
        }

        Ok(summary)
    }

    async fn finish(&mut self) -> Result<()> {
        self.scraper.browser_mut().quit().await
    }
}
