//! Headless Chrome through a WebDriver server (chromedriver), for sites that
//! render their links client-side.

use crate::domain::model::Link;
use crate::domain::ports::Browser;
use crate::utils::error::{CrawlError, Result};
use async_trait::async_trait;
use thirtyfour::prelude::*;

const CHROME_ARGS: [&str; 3] = ["--headless", "--no-sandbox", "--disable-dev-shm-usage"];

pub struct WebDriverBrowser {
    driver: Option<WebDriver>,
}

fn browser_error(e: WebDriverError) -> CrawlError {
    CrawlError::BrowserError {
        message: e.to_string(),
    }
}

impl WebDriverBrowser {
    pub async fn connect(webdriver_url: &str) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        for arg in CHROME_ARGS {
            caps.add_arg(arg).map_err(browser_error)?;
        }

        let driver = WebDriver::new(webdriver_url, caps)
            .await
            .map_err(browser_error)?;
        tracing::info!("Connected to WebDriver at {}", webdriver_url);

        Ok(Self {
            driver: Some(driver),
        })
    }

    fn driver(&self) -> Result<&WebDriver> {
        self.driver.as_ref().ok_or_else(|| CrawlError::BrowserError {
            message: "session already closed".to_string(),
        })
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.driver()?
            .goto(url)
            .await
            .map_err(|e| CrawlError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn find_elements(&mut self, selector: &str) -> Result<Vec<Link>> {
        let elements = self
            .driver()?
            .find_all(By::Css(selector))
            .await
            .map_err(browser_error)?;

        let mut links = Vec::with_capacity(elements.len());
        for element in elements {
            let text = element.text().await.map_err(browser_error)?;
            // The DOM property is already absolute, like the attribute lookup in Selenium.
            let href = element.prop("href").await.map_err(browser_error)?;
            links.push(Link::new(text, href.as_deref()));
        }
        Ok(links)
    }

    async fn quit(&mut self) -> Result<()> {
        match self.driver.take() {
            Some(driver) => driver.quit().await.map_err(browser_error),
            None => Ok(()),
        }
    }
}
