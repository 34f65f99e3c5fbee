use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("PDF error: {0}")]
    PdfError(#[from] lopdf::Error),


    #[error("Names list '{path}' is unreadable: {message}")]
    NamesFileError { path: String, message: String },

    #[error("Template error for '{path}': {message}")]
    TemplateError { path: String, message: String },

    #[error("Font error for '{path}': {message}")]
    FontError { path: String, message: String },

    #[error("Font has no glyph for character {character:?} in '{text}'")]
    MissingGlyphError { character: char, text: String },

    #[error("Navigation to '{url}' failed: {message}")]
    NavigationError { url: String, message: String },

    #[error("Invalid selector '{selector}': {message}")]
    SelectorError { selector: String, message: String },

    #[error("Browser error: {message}")]
    BrowserError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, CrawlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Rendering,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CrawlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CrawlError::ConfigError { .. }
            | CrawlError::ConfigValidationError { .. }
            | CrawlError::InvalidConfigValueError { .. }
            | CrawlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CrawlError::CsvError(_)
            | CrawlError::NamesFileError { .. }
            | CrawlError::TemplateError { .. } => ErrorCategory::Input,
            CrawlError::HttpError(_)
            | CrawlError::NavigationError { .. }
            | CrawlError::SelectorError { .. }
            | CrawlError::BrowserError { .. } => ErrorCategory::Network,
            CrawlError::PdfError(_)
            | CrawlError::FontError { .. }
            | CrawlError::MissingGlyphError { .. } => ErrorCategory::Rendering,
            CrawlError::IoError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Rendering => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CrawlError::NamesFileError { .. } => "Save the names list as UTF-8 text, one name per line",
            CrawlError::TemplateError { .. } => {
                "Check that the template PDF exists and has at least one page"
            }
            CrawlError::FontError { .. } => "Check that the font file is a valid TrueType font",
            CrawlError::MissingGlyphError { .. } => {
                "Use a font that covers every character of the names list, or fix the name"
            }
            CrawlError::CsvError(_) => {
                "Check that the input table has a header row with 'name' and 'url' columns"
            }
            CrawlError::HttpError(_) | CrawlError::NavigationError { .. } => {
                "Check network connectivity and that the target site is reachable"
            }
            CrawlError::BrowserError { .. } => {
                "Check that the WebDriver server is running at the configured address"
            }
            CrawlError::SelectorError { .. } => "Fix the CSS selector in the configuration file",
            CrawlError::PdfError(_) => "The template PDF may be damaged; try re-exporting it",
            CrawlError::IoError(_) => "Check file paths and permissions",
            CrawlError::ConfigError { .. }
            | CrawlError::ConfigValidationError { .. }
            | CrawlError::InvalidConfigValueError { .. }
            | CrawlError::MissingConfigError { .. } => "Review the TOML configuration file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read input: {}", self),
            ErrorCategory::Network => format!("Could not reach the site: {}", self),
            ErrorCategory::Rendering => format!("Could not render certificate: {}", self),
            ErrorCategory::Output => format!("Could not write output: {}", self),
        }
    }
}
