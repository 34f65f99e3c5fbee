use crate::domain::model::{JobSummary, Link};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn create_dir(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// A run of one utility: `extract` gathers (inputs or crawl results), `load`
/// writes outputs, `finish` releases held resources. The engine calls `finish`
/// exactly once whatever the other two return.
#[async_trait]
pub trait Job: Send {
    type Output: Send;

    fn name(&self) -> &'static str;

    async fn extract(&mut self) -> Result<Self::Output>;

    async fn load(&mut self, output: Self::Output) -> Result<JobSummary>;

    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// The slice of browser automation the scrapers rely on.
#[async_trait]
pub trait Browser: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn find_elements(&mut self, selector: &str) -> Result<Vec<Link>>;

    async fn sleep(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn quit(&mut self) -> Result<()>;
}

#[async_trait]
impl<B: Browser + ?Sized> Browser for Box<B> {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        (**self).navigate(url).await
    }

    async fn find_elements(&mut self, selector: &str) -> Result<Vec<Link>> {
        (**self).find_elements(selector).await
    }

    async fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration).await
    }

    async fn quit(&mut self) -> Result<()> {
        (**self).quit().await
    }
}
