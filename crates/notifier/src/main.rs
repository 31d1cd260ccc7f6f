//! Fetch alerts from Alertmanager and print them as chat notifications.
//!
//! Run with: cargo run --bin alert-notifier -- [OPTIONS]

use std::sync::Arc;

use alert_notifier::{
    alertmanager::{AlertmanagerClient, RetryingTransport},
    config::{Config, DurationStyle},
    notifier::{Notifier, StatusFilter},
    sinks::{OutputFormat, StdoutSink},
};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Render Alertmanager alerts as chat notifications", long_about = None)]
struct Cli {
    /// Log level (debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Alertmanager base URL (defaults to ALERTMANAGER_URL)
    #[arg(short, long)]
    alertmanager_url: Option<String>,

    /// Output format (defaults to OUTPUT_FORMAT)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Duration phrasing (defaults to DURATION_STYLE)
    #[arg(long, value_enum)]
    duration_style: Option<DurationStyle>,

    /// Only deliver alerts with this status
    #[arg(short, long, value_enum, default_value_t = StatusFilter::All)]
    status: StatusFilter,

    /// Poll every N seconds instead of running once (defaults to POLL_INTERVAL_SECS)
    #[arg(short, long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for notifications
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration, then apply command line overrides
    let mut config = Config::load().context("loading configuration")?;
    if let Some(url) = cli.alertmanager_url {
        config.alertmanager.url = url;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if cli.pretty {
        config.output.pretty = true;
    }
    if let Some(style) = cli.duration_style {
        config.output.duration_style = style;
    }
    if cli.interval.is_some() {
        config.poll_interval_secs = cli.interval;
    }
    config.validate().context("validating configuration")?;
    info!("Loaded configuration: {:?}", config);

    let transport = RetryingTransport::new(config.retry.policy(), config.timeout())
        .context("creating HTTP transport")?;
    let client = AlertmanagerClient::new(config.alertmanager.url.clone(), Arc::new(transport));
    let sink = Arc::new(StdoutSink::new(None, config.output.format, config.output.pretty));
    let notifier = Notifier::new(client, config.output.duration_style.formatter(), sink)
        .with_filter(cli.status);

    match config.poll_interval() {
        Some(interval) => {
            info!(?interval, url = %config.alertmanager.url, "polling Alertmanager");
            notifier.run(interval).await;
        }
        None => {
            notifier
                .run_once()
                .await
                .with_context(|| format!("fetching alerts from {}", config.alertmanager.url))?;
        }
    }

    Ok(())
}
