use anyhow::Result;
use clap::Parser;
use job_fit_analyzer::cli::Cli;
use job_fit_analyzer::config::Settings;
use job_fit_analyzer::logging::init_logging;
use job_fit_analyzer::utils::{run_timestamp, timestamped_path};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Settings come first: the log directory is one of them.
    let settings = match Settings::load(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(None)?;
            error!(error = %e, "Configuration error");
            return Err(e.into());
        }
    };

    settings.ensure_directories().await?;

    let timestamp = run_timestamp();
    let log_path = timestamped_path(&settings.logs_dir, "analyzer_log", &timestamp, "log");
    init_logging(Some(&log_path))?;
    info!(log_file = %log_path.display(), "Logging initialized");

    match job_fit_analyzer::run(&settings, &timestamp).await {
        Ok(outcome) => {
            match &outcome.report {
                Some(paths) => info!(
                    csv = %paths.csv.display(),
                    summary = %paths.summary.display(),
                    "Run complete"
                ),
                None => info!("Run complete, nothing to report"),
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Fatal error");
            Err(e)
        }
    }
}
