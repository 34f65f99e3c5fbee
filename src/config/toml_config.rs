use crate::utils::error::{CrawlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Every field defaults to the constant the batch scripts were run with, so an
/// empty file (or no file at all) reproduces their behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub certificates: CertificateConfig,
    pub catalog: CatalogConfig,
    pub programs: ProgramsConfig,
    pub browser: BrowserConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConfig {
    pub template: String,
    pub names_file: String,
    pub font_file: String,
    pub font_size: f32,
    pub y_position: f32,
    pub output_dir: String,
    pub output_prefix: String,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            template: "sxablono_instruistoj.pdf".to_string(),
            names_file: "instruistoj.txt".to_string(),
            font_file: "AlexBrush-Regular.ttf".to_string(),
            font_size: 48.0,
            y_position: 470.0,
            output_dir: "Atestiloj".to_string(),
            output_prefix: "KEL_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub category_selector: String,
    pub category_marker: String,
    pub university_selector: String,
    pub exclude_keywords: Vec<String>,
    pub exclude_names: Vec<String>,
    pub directory_wait_secs: u64,
    pub category_wait_secs: u64,
    pub output_file: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://educacionsuperior.sep.gob.mx/".to_string(),
            category_selector: "div.link a.btn-primary".to_string(),
            category_marker: "/Instituciones-SES/".to_string(),
            university_selector: "li a[href]".to_string(),
            exclude_keywords: to_strings(&[
                "gob.mx",
                "educacionsuperior.sep.gob.mx",
                "tramites",
                "programas",
                "estructura",
                "aviso-de-privacidad",
                "historial",
                "direccion-general",
                "Normatividad",
                "conócenos",
                "acciones",
                "sep",
                "inicio",
                "búsqueda",
                "direcciones",
                "instituciones",
                "prensa",
            ]),
            exclude_names: to_strings(&[
                "Inicio",
                "Trámites",
                "Gobierno",
                "Búsqueda",
                "Prensa",
                "Conócenos",
                "Direcciones",
                "Normatividad",
                "Instituciones",
                "Acciones y Programas",
                "Aviso de privacidad",
                "SEP",
            ]),
            directory_wait_secs: 5,
            category_wait_secs: 3,
            output_file: "universidades_mexico_limpio.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramsConfig {
    pub input_file: String,
    pub link_selector: String,
    pub offer_keywords: Vec<String>,
    pub program_keywords: Vec<String>,
    pub page_wait_secs: u64,
    pub programs_file: String,
    pub unresolved_file: String,
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            input_file: "universidades_mexico_limpio.csv".to_string(),
            link_selector: "a".to_string(),
            offer_keywords: to_strings(&[
                "oferta académica",
                "oferta educativa",
                "programas",
                "estudios",
            ]),
            program_keywords: to_strings(&["maestría", "especialización", "posgrado", "doctorado"]),
            page_wait_secs: 3,
            programs_file: "maestrias_especializaciones_mexico.csv".to_string(),
            unresolved_file: "universidades_sin_maestrias.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Http,
    Webdriver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub driver: DriverKind,
    pub webdriver_url: Option<String>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::Http,
            webdriver_url: Some("http://localhost:9515".to_string()),
            user_agent: concat!("cert-crawl/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            poll_interval_ms: 250,
        }
    }
}

impl BrowserConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Base directory every relative input and output path resolves against.
    pub output_path: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: ".".to_string(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CrawlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CrawlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})；未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CrawlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn validate_certificates(&self) -> Result<()> {
        let c = &self.certificates;
        validation::validate_path("certificates.template", &c.template)?;
        validation::validate_path("certificates.names_file", &c.names_file)?;
        validation::validate_path("certificates.output_dir", &c.output_dir)?;
        validation::validate_file_extensions(
            "certificates.template",
            std::slice::from_ref(&c.template),
            &["pdf"],
        )?;
        validation::validate_file_extensions(
            "certificates.font_file",
            std::slice::from_ref(&c.font_file),
            &["ttf", "otf"],
        )?;
        validation::validate_range("certificates.font_size", c.font_size, 1.0, 400.0)?;
        validation::validate_range("certificates.y_position", c.y_position, 0.0, 14400.0)?;
        Ok(())
    }

    fn validate_catalog(&self) -> Result<()> {
        let c = &self.catalog;
        validation::validate_url("catalog.base_url", &c.base_url)?;
        validation::validate_path("catalog.output_file", &c.output_file)?;
        validation::validate_non_empty_list(
            "catalog.category_selector",
            std::slice::from_ref(&c.category_selector),
        )?;
        validation::validate_non_empty_list(
            "catalog.university_selector",
            std::slice::from_ref(&c.university_selector),
        )?;
        validation::validate_range("catalog.directory_wait_secs", c.directory_wait_secs, 0, 300)?;
        validation::validate_range("catalog.category_wait_secs", c.category_wait_secs, 0, 300)?;
        Ok(())
    }

    fn validate_programs(&self) -> Result<()> {
        let p = &self.programs;
        validation::validate_path("programs.input_file", &p.input_file)?;
        validation::validate_path("programs.programs_file", &p.programs_file)?;
        validation::validate_path("programs.unresolved_file", &p.unresolved_file)?;
        validation::validate_non_empty_list("programs.offer_keywords", &p.offer_keywords)?;
        validation::validate_non_empty_list("programs.program_keywords", &p.program_keywords)?;
        validation::validate_range("programs.page_wait_secs", p.page_wait_secs, 0, 300)?;
        Ok(())
    }

    fn validate_browser(&self) -> Result<()> {
        let b = &self.browser;
        validation::validate_positive_number("browser.poll_interval_ms", b.poll_interval_ms, 1)?;
        validation::validate_positive_number(
            "browser.request_timeout_secs",
            b.request_timeout_secs,
            1,
        )?;
        if b.driver == DriverKind::Webdriver {
            let url = validation::validate_required_field("browser.webdriver_url", &b.webdriver_url)?;
            validation::validate_url("browser.webdriver_url", url)?;
        }
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_certificates()?;
        self.validate_catalog()?;
        self.validate_programs()?;
        self.validate_browser()?;
        validation::validate_path("load.output_path", &self.load.output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_script_constants() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.certificates.font_size, 48.0);
        assert_eq!(config.certificates.y_position, 470.0);
        assert_eq!(config.certificates.output_prefix, "KEL_");
        assert_eq!(config.catalog.directory_wait_secs, 5);
        assert_eq!(config.catalog.category_wait_secs, 3);
        assert_eq!(config.catalog.exclude_keywords.len(), 17);
        assert_eq!(config.catalog.exclude_names.len(), 12);
        assert_eq!(config.programs.page_wait_secs, 3);
        assert_eq!(config.browser.driver, DriverKind::Http);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let toml_content = r#"
[certificates]
font_size = 36.0
output_prefix = "ESP_"

[browser]
driver = "webdriver"
webdriver_url = "http://127.0.0.1:4444"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.certificates.font_size, 36.0);
        assert_eq!(config.certificates.output_prefix, "ESP_");
        assert_eq!(config.certificates.template, "sxablono_instruistoj.pdf");
        assert_eq!(config.browser.driver, DriverKind::Webdriver);
        assert_eq!(config.browser.poll_interval_ms, 250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CERT_CRAWL_TEST_BASE_URL", "https://portal.example.mx/");

        let toml_content = r#"
[catalog]
base_url = "${CERT_CRAWL_TEST_BASE_URL}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.catalog.base_url, "https://portal.example.mx/");

        std::env::remove_var("CERT_CRAWL_TEST_BASE_URL");
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let bad_url = AppConfig::from_toml_str("[catalog]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_font =
            AppConfig::from_toml_str("[certificates]\nfont_file = \"font.woff2\"\n").unwrap();
        assert!(bad_font.validate().is_err());

        let no_keywords = AppConfig::from_toml_str("[programs]\nprogram_keywords = []\n").unwrap();
        assert!(no_keywords.validate().is_err());

        let missing_driver_url = AppConfig {
            browser: BrowserConfig {
                driver: DriverKind::Webdriver,
                webdriver_url: None,
                ..BrowserConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(matches!(
            missing_driver_url.validate(),
            Err(CrawlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = AppConfig::from_toml_str("[catalog\nbase_url = 1");
        assert!(matches!(
            result,
            Err(CrawlError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[load]\noutput_path = \"./tables\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_path(), "./tables");
    }
}
