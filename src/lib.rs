pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{connect_browser, HttpBrowser, LocalStorage};
pub use app::jobs::{CatalogJob, CertificateJob, ProgramsJob};
pub use config::AppConfig;
#[cfg(feature = "cli")]
pub use config::{Cli, Command};
pub use core::engine::JobEngine;
pub use utils::error::{CrawlError, Result};
