use crate::domain::model::JobSummary;
use crate::domain::ports::Job;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a [`Job`] through extract → load and always finishes it, so a browser
/// session is released even when the run fails halfway.
pub struct JobEngine<J: Job> {
    job: J,
    monitor: Option<SystemMonitor>,
}

impl<J: Job> JobEngine<J> {
    pub fn new(job: J) -> Self {
        Self { job, monitor: None }
    }

    pub fn new_with_monitoring(job: J, monitor_enabled: bool) -> Self {
        Self {
            job,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn job(&self) -> &J {
        &self.job
    }

    pub async fn run(&mut self) -> Result<JobSummary> {
        let name = self.job.name();
        tracing::info!("🚀 Starting {} job", name);
        self.log_phase("Start");

        let result = self.extract_and_load().await;

        // 無論成功與否都要釋放資源
        if let Err(e) = self.job.finish().await {
            tracing::warn!("Failed to release resources of {} job: {}", name, e);
        }
        self.log_phase("Complete");

        let summary = result?;
        tracing::info!(
            "✅ {} job finished: {} record(s), {} file(s) written",
            name,
            summary.records,
            summary.outputs.len()
        );
        Ok(summary)
    }

    async fn extract_and_load(&mut self) -> Result<JobSummary> {
        tracing::info!("Extracting...");
        let output = self.job.extract().await?;
        self.log_phase("Extract");

        tracing::info!("Loading...");
        let summary = self.job.load(output).await?;
        self.log_phase("Load");

        Ok(summary)
    }

    fn log_phase(&mut self, phase: &str) {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.log_phase(phase);
        }
    }
}
