//! # Listings Report Downloader Library
//!
//! Retrieves a seller's full listings export from the Amazon Selling Partner API
//! (SP-API) and hands it back as a table ready to be written to a spreadsheet.
//!
//! ## Workflow
//!
//! Every run is a fresh, strictly sequential pipeline:
//!
//! 1. Exchange the Login-with-Amazon refresh token for an access token
//! 2. Request a `GET_MERCHANT_LISTINGS_ALL_DATA` report for one marketplace
//! 3. Poll the report status at a fixed cadence until it is `DONE`
//! 4. Resolve the report document to a signed URL and download it
//! 5. Decode the tab-separated payload and write a spreadsheet
//!
//! ## Quick Start
//!
//! ```no_run
//! use listings_report_downloader::config::{Credentials, PollConfig};
//! use listings_report_downloader::pipeline::{ListingsPipeline, LoggingObserver};
//! use listings_report_downloader::sp_api::{Region, SpApiEndpoints};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new(
//!     "amzn1.application-oa2-client.example",
//!     "client-secret",
//!     "Atzr|refresh-token",
//!     "ATVPDKIKX0DER",
//!     "A1SELLERID",
//! )?;
//!
//! let pipeline = ListingsPipeline::with_reqwest(
//!     credentials,
//!     SpApiEndpoints::for_region(Region::NorthAmerica),
//!     PollConfig::default(),
//! );
//! let outcome = pipeline.run(&LoggingObserver).await?;
//! let table = listings_report_downloader::output::tsv::decode_tsv(&outcome.bytes)?;
//! println!("{} listings", table.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Credentials and poll cadence
//! - [`sp_api`] - Token exchange, report request, status polling, document fetch
//! - [`pipeline`] - Orchestration of the SP-API calls with progress events
//! - [`output`] - TSV decoding and spreadsheet writing
//! - [`cli`] - Command-line surface

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// CLI command implementations
pub mod cli;

/// Credentials and polling configuration
pub mod config;

/// Report decoding and spreadsheet output
pub mod output;

/// Sequential report retrieval pipeline
pub mod pipeline;

/// Selling Partner API client components
pub mod sp_api;

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "listings_report_downloader=info";

/// Report type requested on every run
pub const LISTINGS_REPORT_TYPE: &str = "GET_MERCHANT_LISTINGS_ALL_DATA";

/// Short-lived LWA access token
///
/// The value is a bearer secret, so `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token value for the `x-amz-access-token` header
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"<redacted>").finish()
    }
}

/// Identifier of a report the vendor is generating
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportHandle {
    /// Opaque report id returned by `createReport`
    pub report_id: String,
}

impl ReportHandle {
    /// Create a handle from a report id
    pub fn new(report_id: impl Into<String>) -> Self {
        Self {
            report_id: report_id.into(),
        }
    }
}

impl fmt::Display for ReportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report_id)
    }
}

/// Identifier of the finished report document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportDocumentHandle {
    /// Opaque document id reported once processing is `DONE`
    pub document_id: String,
}

impl ReportDocumentHandle {
    /// Create a handle from a document id
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
        }
    }
}

impl fmt::Display for ReportDocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.document_id)
    }
}

/// Processing status of a report
///
/// Only [`ReportStatus::Done`] ends polling successfully. `CANCELLED` and
/// `FATAL` end it with a failure; every other value, including statuses this
/// crate does not know about, keeps polling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportStatus {
    /// Waiting to be processed
    InQueue,
    /// Being generated
    InProgress,
    /// Finished, document available
    Done,
    /// Cancelled by the vendor (e.g. no data to report)
    Cancelled,
    /// Generation failed
    Fatal,
    /// Any other vendor-defined status, kept verbatim
    Other(String),
}

impl ReportStatus {
    /// Parse a vendor status string
    pub fn parse(value: &str) -> Self {
        match value {
            "IN_QUEUE" => ReportStatus::InQueue,
            "IN_PROGRESS" => ReportStatus::InProgress,
            "DONE" => ReportStatus::Done,
            "CANCELLED" => ReportStatus::Cancelled,
            "FATAL" => ReportStatus::Fatal,
            other => ReportStatus::Other(other.to_string()),
        }
    }

    /// Vendor string for this status
    pub fn as_str(&self) -> &str {
        match self {
            ReportStatus::InQueue => "IN_QUEUE",
            ReportStatus::InProgress => "IN_PROGRESS",
            ReportStatus::Done => "DONE",
            ReportStatus::Cancelled => "CANCELLED",
            ReportStatus::Fatal => "FATAL",
            ReportStatus::Other(value) => value,
        }
    }

    /// Whether the report finished and its document can be fetched
    pub fn is_done(&self) -> bool {
        matches!(self, ReportStatus::Done)
    }

    /// Whether the report ended without producing a document
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, ReportStatus::Cancelled | ReportStatus::Fatal)
    }
}

impl From<String> for ReportStatus {
    fn from(value: String) -> Self {
        ReportStatus::parse(&value)
    }
}

impl From<ReportStatus> for String {
    fn from(status: ReportStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
