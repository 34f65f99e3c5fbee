use crate::config::CertificateConfig;
use crate::core::certificates::{certificate_file_name, parse_names, CertificateGenerator};
use crate::core::font::TrueTypeFont;
use crate::core::overlay::Template;
use crate::domain::model::JobSummary;
use crate::domain::ports::{Job, Storage};
use crate::utils::error::{CrawlError, Result};
use std::path::Path;

/// Everything loaded up front; rendering starts only once all of it is valid.
pub struct CertificateBatch {
    pub generator: CertificateGenerator<TrueTypeFont>,
    pub names: Vec<String>,
}

pub struct CertificateJob<S: Storage> {
    storage: S,
    config: CertificateConfig,
}

impl<S: Storage> CertificateJob<S> {
    pub fn new(storage: S, config: CertificateConfig) -> Self {
        Self { storage, config }
    }

    async fn load_names(&self) -> Result<Vec<String>> {
        let path = &self.config.names_file;
        let bytes = self.storage.read_file(path).await?;
        let content = String::from_utf8(bytes).map_err(|e| CrawlError::NamesFileError {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(parse_names(&content))
    }

    async fn load_template(&self) -> Result<Template> {
        let path = &self.config.template;
        let bytes = self
            .storage
            .read_file(path)
            .await
            .map_err(|e| CrawlError::TemplateError {
                path: path.clone(),
                message: e.to_string(),
            })?;
        Template::from_bytes(&bytes, path)
    }

    async fn load_font(&self) -> Result<TrueTypeFont> {
        let path = &self.config.font_file;
        let bytes = self
            .storage
            .read_file(path)
            .await
            .map_err(|e| CrawlError::FontError {
                path: path.clone(),
                message: e.to_string(),
            })?;
        TrueTypeFont::from_bytes(bytes, path)
    }

    fn output_path(&self, name: &str) -> String {
        let file_name = certificate_file_name(&self.config.output_prefix, name);
        Path::new(&self.config.output_dir)
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage> Job for CertificateJob<S> {
    type Output = CertificateBatch;

    fn name(&self) -> &'static str {
        "certificates"
    }

    async fn extract(&mut self) -> Result<CertificateBatch> {
        let names = self.load_names().await?;
        tracing::info!("Loaded {} names from {}", names.len(), self.config.names_file);
        if names.is_empty() {
            tracing::warn!("Names list {} is empty", self.config.names_file);
        }

        let template = self.load_template().await?;
        let font = self.load_font().await?;
        self.storage.create_dir(&self.config.output_dir).await?;

        Ok(CertificateBatch {
            generator: CertificateGenerator::new(
                template,
                font,
                self.config.font_size,
                self.config.y_position,
            ),
            names,
        })
    }

    /// Stops at the first name that fails to render; files already written stay.
    async fn load(&mut self, batch: CertificateBatch) -> Result<JobSummary> {
        let mut summary = JobSummary::default();

        for name in &batch.names {
            let bytes = batch.generator.render(name)?;
            let path = self.output_path(name);
            self.storage.write_file(&path, &bytes).await?;
            tracing::info!("Certificate generated: {}", path);

            summary.records += 1;
            summary.outputs.push(path);
        }

        Ok(summary)
    }
}
