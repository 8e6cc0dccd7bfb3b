//! PestOps revenue analytics: serve the dashboard API or print a one-off report.

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use pestops_api::rest::ReportQuery;
use pestops_api::ApiServer;
use pestops_core::config::{AppConfig, StoreConfig};
use pestops_reporting::ExportFormat;
use pestops_revenue::RevenueReportService;
use pestops_store::{InMemoryRepository, JsonSnapshotRepository, RecordRepository};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Every workspace crate logs under its own target.
const DEFAULT_LOG_FILTER: &str =
    "pestops=info,pestops_revenue=info,pestops_store=info,pestops_api=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "pestops")]
#[command(about = "Subscription revenue analytics for the pest-control portal")]
#[command(version)]
struct Cli {
    /// Config file (TOML/YAML/JSON); environment variables still apply
    #[arg(long, global = true)]
    config: Option<String>,

    /// Node identifier (overrides config)
    #[arg(long, global = true, env = "PESTOPS__NODE_ID")]
    node_id: Option<String>,

    /// Directory with customers.json, cases.json and monthly_spend.json
    #[arg(long, global = true, env = "PESTOPS__STORE__SNAPSHOT_DIR")]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST API and metrics exporter
    Serve {
        /// HTTP port (overrides config)
        #[arg(long, env = "PESTOPS__API__HTTP_PORT")]
        http_port: Option<u16>,

        /// Metrics port (overrides config)
        #[arg(long, env = "PESTOPS__METRICS__PORT")]
        metrics_port: Option<u16>,
    },
    /// Generate one report and print it to stdout
    Report {
        /// json, csv or table
        #[arg(long, default_value = "table")]
        format: ExportFormat,

        /// Report date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Reporting window start (YYYY-MM-DD); requires --window-end
        #[arg(long)]
        window_start: Option<NaiveDate>,

        /// Reporting window end (YYYY-MM-DD); requires --window-start
        #[arg(long)]
        window_end: Option<NaiveDate>,

        /// Trailing period for retention, in days
        #[arg(long)]
        trailing_days: Option<u32>,

        /// Years of ARR projection
        #[arg(long)]
        years: Option<u32>,

        /// Number of upsell candidates
        #[arg(long)]
        top_k: Option<usize>,

        /// Month for unit economics (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(Some(path))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }),
    };
    if let Some(node_id) = &cli.node_id {
        config.node_id = node_id.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.store.snapshot_dir = Some(dir.clone());
    }
    Ok(config)
}

fn build_repository(store: &StoreConfig) -> Arc<dyn RecordRepository> {
    match store.snapshot_dir.as_deref() {
        Some(dir) => {
            info!(dir, "Using JSON snapshot record store");
            Arc::new(JsonSnapshotRepository::new(dir))
        }
        None if store.seed_demo_data => {
            info!("Using in-memory record store with demo data");
            Arc::new(InMemoryRepository::with_demo_data(Utc::now().date_naive()))
        }
        None => {
            warn!("Using empty in-memory record store");
            Arc::new(InMemoryRepository::new())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so report output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Serve {
            http_port,
            metrics_port,
        } => {
            if let Some(port) = http_port {
                config.api.http_port = port;
            }
            if let Some(port) = metrics_port {
                config.metrics.port = port;
            }
            info!(
                node_id = %config.node_id,
                http_port = config.api.http_port,
                metrics_port = config.metrics.port,
                "Configuration loaded"
            );

            let repository = build_repository(&config.store);
            let service = RevenueReportService::new(repository, config.analytics.clone());
            let api_server = ApiServer::new(config, service);

            if let Err(e) = api_server.start_metrics() {
                error!(error = %e, "Failed to start metrics exporter");
            }

            info!("PestOps revenue API is ready to serve traffic");
            api_server.start_http().await?;
        }
        Command::Report {
            format,
            as_of,
            window_start,
            window_end,
            trailing_days,
            years,
            top_k,
            month,
        } => {
            let repository = build_repository(&config.store);
            let service = RevenueReportService::new(repository, config.analytics.clone());
            let query = ReportQuery {
                as_of,
                window_start,
                window_end,
                trailing_days,
                years,
                top_k,
                month,
            };
            let request = query.into_request(&service, Utc::now())?;
            let report = service.generate(&request).await?;
            println!("{}", pestops_reporting::render(&report, format)?);
        }
    }

    Ok(())
}
