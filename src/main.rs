use anyhow::Context;
use cert_crawl::core::JobSummary;
use cert_crawl::utils::error::ErrorSeverity;
use cert_crawl::utils::{logger, validation::Validate};
use cert_crawl::{
    connect_browser, AppConfig, CatalogJob, CertificateJob, Cli, Command, CrawlError, JobEngine,
    LocalStorage, ProgramsJob,
};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting cert-crawl {:?}", cli.command);

    let config = match cli.load_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    if cli.verbose {
        tracing::debug!("Config: {:?}", config);
    }
    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run(&cli, config).await {
        Ok(summary) => {
            println!("✅ {:?} completed: {} record(s)", cli.command, summary.records);
            for output in &summary.outputs {
                println!("📁 {}", output);
            }
        }
        Err(e) => {
            let Some(crawl_error) = e.downcast_ref::<CrawlError>() else {
                tracing::error!("❌ Run failed: {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            };

            tracing::error!(
                "❌ Run failed: {:#} (Category: {:?}, Severity: {:?})",
                e,
                crawl_error.category(),
                crawl_error.severity()
            );
            eprintln!("❌ {}", crawl_error.user_friendly_message());
            eprintln!("💡 建議: {}", crawl_error.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match crawl_error.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

async fn run(cli: &Cli, config: AppConfig) -> anyhow::Result<JobSummary> {
    let storage = LocalStorage::new(config.output_path());
    let poll_interval = config.browser.poll_interval();

    let summary = match cli.command {
        Command::Certificates => {
            let job = CertificateJob::new(storage, config.certificates);
            JobEngine::new_with_monitoring(job, cli.monitor)
                .run()
                .await
                .context("Certificate generation failed")?
        }
        Command::Catalog => {
            let browser = connect_browser(&config.browser)
                .await
                .context("Failed to open browser session")?;
            let job = CatalogJob::new(browser, storage, config.catalog, poll_interval);
            JobEngine::new_with_monitoring(job, cli.monitor)
                .run()
                .await
                .context("Catalog crawl failed")?
        }
        Command::Programs => {
            let browser = connect_browser(&config.browser)
                .await
                .context("Failed to open browser session")?;
            let job = ProgramsJob::new(browser, storage, config.programs, poll_interval);
            JobEngine::new_with_monitoring(job, cli.monitor)
                .run()
                .await
                .context("Program crawl failed")?
        }
    };

    Ok(summary)
}
