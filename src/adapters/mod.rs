// Adapters layer: concrete implementations of the domain ports (storage, browser drivers).

pub mod http_browser;
pub mod storage;
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use http_browser::HttpBrowser;
pub use storage::LocalStorage;

use crate::config::{BrowserConfig, DriverKind};
use crate::domain::ports::Browser;
use crate::utils::error::Result;

/// Opens the browser session selected by `[browser] driver`.
pub async fn connect_browser(config: &BrowserConfig) -> Result<Box<dyn Browser>> {
    match config.driver {
        DriverKind::Http => Ok(Box::new(HttpBrowser::new(config)?)),
        DriverKind::Webdriver => connect_webdriver(config).await,
    }
}

#[cfg(feature = "webdriver")]
async fn connect_webdriver(config: &BrowserConfig) -> Result<Box<dyn Browser>> {
    let url = crate::utils::validation::validate_required_field(
        "browser.webdriver_url",
        &config.webdriver_url,
    )?;
    Ok(Box::new(webdriver::WebDriverBrowser::connect(url).await?))
}

#[cfg(not(feature = "webdriver"))]
async fn connect_webdriver(_config: &BrowserConfig) -> Result<Box<dyn Browser>> {
    Err(crate::utils::error::CrawlError::ConfigError {
        message: "driver = \"webdriver\" requires building with the `webdriver` feature"
            .to_string(),
    })
}
