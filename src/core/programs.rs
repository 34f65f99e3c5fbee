//! Per-university search for postgraduate programs.

use crate::config::ProgramsConfig;
use crate::core::filters::{is_offer_section_link, is_program_link};
use crate::core::wait::wait_for_links;
use crate::domain::model::{ProgramRecord, ProgramReport, UniversityRow};
use crate::domain::ports::Browser;
use crate::utils::error::Result;
use std::time::Duration;

/// Outcome of visiting one university.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    Programs(Vec<ProgramRecord>),
    NoOfferSection,
    NoPrograms { offer_url: String },
}

pub struct ProgramScraper<B: Browser> {
    browser: B,
    config: ProgramsConfig,
    poll_interval: Duration,
}

impl<B: Browser> ProgramScraper<B> {
    pub fn new(browser: B, config: ProgramsConfig, poll_interval: Duration) -> Self {
        Self {
            browser,
            config,
            poll_interval,
        }
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    /// Visits every row in order. Both "nothing found" outcomes and errors put
    /// the university on the unresolved list; an error discards anything
    /// gathered for that university.
    pub async fn crawl(&mut self, universities: &[UniversityRow]) -> ProgramReport {
        let mut report = ProgramReport::default();

        for row in universities {
            tracing::info!("Visiting university: {} - {}", row.name, row.url);
            match self.visit(row).await {
                Ok(Visit::Programs(programs)) => report.programs.extend(programs),
                Ok(Visit::NoOfferSection) => {
                    tracing::warn!("No academic offer section found for {}", row.name);
                    report.mark_unresolved(row);
                }
                Ok(Visit::NoPrograms { offer_url }) => {
                    tracing::warn!(
                        "No postgraduate programs found for {} at {}",
                        row.name,
                        offer_url
                    );
                    report.mark_unresolved(row);
                }
                Err(e) => {
                    tracing::error!("Error processing {}: {}", row.name, e);
                    report.mark_unresolved(row);
                }
            }
        }

        report
    }

    pub async fn visit(&mut self, row: &UniversityRow) -> Result<Visit> {
        let Some(offer_url) = self.find_offer_section(&row.url).await? else {
            return Ok(Visit::NoOfferSection);
        };
        tracing::info!("Academic offer section for {}: {}", row.name, offer_url);

        let programs = self.find_programs(row, &offer_url).await?;
        if programs.is_empty() {
            return Ok(Visit::NoPrograms { offer_url });
        }
        Ok(Visit::Programs(programs))
    }

    /// URL of the first link whose text names an offer section. A first match
    /// without a usable href counts as not found.
    async fn find_offer_section(&mut self, university_url: &str) -> Result<Option<String>> {
        self.browser.navigate(university_url).await?;

        let wait = self.page_wait();
        let keywords = &self.config.offer_keywords;
        let links = wait_for_links(
            &mut self.browser,
            &self.config.link_selector,
            wait,
            self.poll_interval,
            |link| is_offer_section_link(link, keywords),
        )
        .await?;

        Ok(links
            .iter()
            .find(|link| is_offer_section_link(link, keywords))
            .and_then(|link| link.target())
            .map(str::to_string))
    }

    async fn find_programs(&mut self, row: &UniversityRow, offer_url: &str) -> Result<Vec<ProgramRecord>> {
        self.browser.navigate(offer_url).await?;

        let wait = self.page_wait();
        let keywords = &self.config.program_keywords;
        let links = wait_for_links(
            &mut self.browser,
            &self.config.link_selector,
            wait,
            self.poll_interval,
            |link| is_program_link(link, keywords),
        )
        .await?;

        let programs: Vec<ProgramRecord> = links
            .into_iter()
            .filter(|link| is_program_link(link, keywords))
            .map(|link| {
                tracing::info!("Program found: {} - {:?}", link.text, link.href);
                ProgramRecord {
                    university_name: row.name.clone(),
                    university_url: row.url.clone(),
                    program_url: link.href.unwrap_or_default(),
                    program_name: link.text,
                }
            })
            .collect();
        Ok(programs)
    }

    fn page_wait(&self) -> Duration {
        Duration::from_secs(self.config.page_wait_secs)
    }
}
