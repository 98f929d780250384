mod clients;
mod config;
mod error;
mod helpers;
mod models;
mod report;
#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};

use tracing::info;

use clients::ManagerClient;
use clients::aggregator::{Aggregator, ReportOptions};
use error::Result;
use models::views::ReportOutcome;
use report::{ReportSink, StdoutSink};

const DEFAULT_CONFIG_PATH: &str = "/etc/cm-report/config.yaml";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cm_report=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let result = run(&PathBuf::from(&config_path), &mut StdoutSink).await;
    match &result {
        Ok(outcome) => {
            info!(
                clusters = outcome.cluster_count,
                cluster = outcome.selected_cluster.as_deref().unwrap_or("-"),
                services = outcome.service_count,
                distinguished = outcome.distinguished.as_deref().unwrap_or("-"),
                "report complete"
            );
            if let Some(reason) = &outcome.skipped {
                info!("report ended early: {}", reason);
            }
        }
        Err(e) => eprintln!("error: {}", e),
    }
    std::process::exit(exit_code(&result));
}

/// Loads the config, connects, and writes the whole report into `sink`.
async fn run(config_path: &Path, sink: &mut dyn ReportSink) -> Result<ReportOutcome> {
    let cfg = config::Config::load(config_path)?;
    let client = ManagerClient::new(&cfg)?;

    info!("querying cluster manager at {}", cfg.base_url());

    sink.line(helpers::report_banner(&cfg.host, chrono::Utc::now()));
    sink.blank();

    Aggregator::new(client, ReportOptions::from(&cfg))
        .run(sink)
        .await
}

/// Skipped sections and a missing target service still count as success.
fn exit_code(result: &Result<ReportOutcome>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
