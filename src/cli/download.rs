//! Download command implementation

use crate::config::{
    Credentials, PollConfig, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS,
};
use crate::output::spreadsheet::write_spreadsheet;
use crate::output::tsv::decode_tsv;
use crate::pipeline::{ListingsPipeline, LoggingObserver, PipelineEvent, ProgressObserver};
use crate::sp_api::endpoints::LWA_TOKEN_URL;
use crate::sp_api::{Region, SpApiEndpoints};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::CliError;

/// Default spreadsheet file name
pub const DEFAULT_OUTPUT_FILE: &str = "amazon_listings.xlsx";

/// Default number of rows shown after a download
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

/// Listings Report Downloader CLI
#[derive(Parser, Debug)]
#[command(name = "listings-report-downloader")]
#[command(about = "Download all seller listings from the Amazon SP-API as a spreadsheet", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request, wait for and download the listings report
    Download(DownloadArgs),
}

/// Download command arguments
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// LWA client id
    #[arg(long, env = "CLIENT_ID", hide_env_values = true)]
    pub client_id: String,

    /// LWA client secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// LWA refresh token
    #[arg(long, env = "REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: String,

    /// Marketplace to report on (e.g., ATVPDKIKX0DER)
    #[arg(long, env = "MARKETPLACE_ID")]
    pub marketplace_id: String,

    /// Seller the credentials belong to
    #[arg(long, env = "SELLER_ID")]
    pub seller_id: String,

    /// SP-API region
    #[arg(long, value_enum, default_value = "north-america")]
    pub region: Region,

    /// Override the regional API host (e.g., the SP-API sandbox)
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Override the LWA token endpoint
    #[arg(long)]
    pub token_url: Option<String>,

    /// Maximum number of report status checks
    #[arg(long, default_value_t = DEFAULT_MAX_POLL_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_poll_attempts: u32,

    /// Seconds to wait before each status check
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,

    /// Spreadsheet file to write (`.xlsx` workbook, or CSV for a `.csv` path)
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Number of rows to preview after download
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview_rows: usize,
}

impl DownloadArgs {
    /// Credentials from flags or environment
    pub fn credentials(&self) -> Result<Credentials, CliError> {
        Ok(Credentials::new(
            &self.client_id,
            &self.client_secret,
            &self.refresh_token,
            &self.marketplace_id,
            &self.seller_id,
        )?)
    }

    /// Poll cadence from flags
    pub fn poll_config(&self) -> Result<PollConfig, CliError> {
        Ok(PollConfig::new(
            self.max_poll_attempts,
            Duration::from_secs(self.poll_interval_secs),
        )?)
    }

    /// Endpoints for the selected region, with overrides applied
    pub fn endpoints(&self) -> SpApiEndpoints {
        let token_url = self.token_url.as_deref().unwrap_or(LWA_TOKEN_URL);
        let api_base_url = self
            .api_base_url
            .as_deref()
            .unwrap_or_else(|| self.region.api_base_url());
        SpApiEndpoints::new(token_url, api_base_url)
    }

    /// Run the pipeline, write the spreadsheet and print a preview
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let poll_config = self.poll_config()?;
        let pipeline =
            ListingsPipeline::with_reqwest(self.credentials()?, self.endpoints(), poll_config);

        info!(
            region = ?self.region,
            max_attempts = poll_config.max_attempts(),
            interval_secs = poll_config.interval().as_secs(),
            "Starting listings download"
        );

        let outcome = match cli.output_format {
            OutputFormat::Human => {
                let observer = SpinnerObserver::new();
                let result = pipeline.run(&observer).await;
                observer.finish();
                result?
            }
            OutputFormat::Json => pipeline.run(&LoggingObserver).await?,
        };

        let table = decode_tsv(&outcome.bytes)?;
        let rows_written = write_spreadsheet(&self.output, &table)?;

        match cli.output_format {
            OutputFormat::Human => {
                println!("Report downloaded and parsed");
                println!("  Report ID: {}", outcome.report);
                println!("  Document ID: {}", outcome.document);
                println!("  Rows: {rows_written}");
                println!("  Saved to: {}", self.output.display());

                if self.preview_rows > 0 {
                    println!();
                    println!(
                        "Preview (first {} of {} rows):",
                        self.preview_rows.min(table.len()),
                        table.len()
                    );
                    for line in table.preview_lines(self.preview_rows) {
                        println!("{line}");
                    }
                }
            }
            OutputFormat::Json => {
                let output = json!({
                    "status": "success",
                    "report_id": outcome.report.report_id,
                    "document_id": outcome.document.document_id,
                    "rows": rows_written,
                    "columns": table.headers(),
                    "output": self.output.display().to_string(),
                    "preview": table.preview_json(self.preview_rows),
                });
                println!("{output}");
            }
        }

        Ok(())
    }
}

/// Spinner shown while the report is generated
///
/// Every event is also printed as a lasting line above the spinner. When stderr
/// is not a terminal indicatif hides the spinner, so the lines go to stderr
/// directly.
struct SpinnerObserver {
    bar: ProgressBar,
}

impl SpinnerObserver {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for SpinnerObserver {
    fn on_event(&self, event: &PipelineEvent) {
        let line = progress_line(event);
        if self.bar.is_hidden() {
            eprintln!("{line}");
        } else {
            self.bar.println(&line);
            self.bar.set_message(line);
        }
    }
}

/// One line of human-readable progress for `event`
pub fn progress_line(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::Authenticating => "Authenticating with Amazon SP-API...".to_string(),
        PipelineEvent::RequestingReport => "Requesting listings report...".to_string(),
        PipelineEvent::WaitingForReport { report } => {
            format!("Waiting for report {report} to finish...")
        }
        PipelineEvent::PollAttempt(observation) => format!(
            "Polling attempt {}/{}: {}",
            observation.attempt, observation.max_attempts, observation.status
        ),
        PipelineEvent::Downloading { .. } => "Downloading report contents...".to_string(),
        PipelineEvent::Completed { bytes } => format!("Downloaded {bytes} bytes"),
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}
