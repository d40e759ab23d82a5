//! Selling Partner API client components
//!
//! Each step of the report workflow is its own component sharing one
//! [`HttpTransport`]:
//!
//! - [`token::TokenExchanger`] - LWA refresh grant
//! - [`reports::ReportRequester`] - `createReport`
//! - [`poller::ReportPoller`] - fixed-cadence `getReport` polling
//! - [`documents::DocumentFetcher`] - `getReportDocument` plus signed URL download
//!
//! None of them retry. The first failure is returned to the caller as a
//! [`ReportError`] variant naming the step that failed.

use crate::ReportStatus;

pub mod documents;
pub mod endpoints;
pub mod poller;
pub mod reports;
pub mod token;
pub mod transport;

pub use documents::{DocumentFetcher, DownloadDescriptor};
pub use endpoints::{Region, SpApiEndpoints};
pub use poller::{PollObservation, ReportPoller};
pub use reports::{ReportRequest, ReportRequester};
pub use token::TokenExchanger;
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, ReqwestTransport,
    TransportError, TransportErrorKind,
};

/// Why a single upstream call failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamFailure {
    /// Non-2xx response, with the body as sent by the vendor
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (lossy UTF-8)
        body: String,
    },

    /// Request never produced a response
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// 2xx response whose body lacked what the call needs
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Report workflow errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Refresh token exchange failed
    #[error("authentication failed: {0}")]
    Authentication(UpstreamFailure),

    /// Report creation failed
    #[error("report request failed: {0}")]
    ReportRequest(UpstreamFailure),

    /// A status check failed
    #[error("report status check failed for report {report_id}: {failure}")]
    ReportStatus {
        /// Report being polled
        report_id: String,
        /// Underlying failure
        failure: UpstreamFailure,
    },

    /// The vendor ended the report without a document
    #[error("report {report_id} ended with status {status}")]
    ReportFailed {
        /// Report being polled
        report_id: String,
        /// Terminal status (CANCELLED or FATAL)
        status: ReportStatus,
    },

    /// Attempt budget exhausted before the report was done
    #[error("report {report_id} timed out after {attempts} status checks (last status: {last_status})")]
    ReportTimeout {
        /// Report being polled
        report_id: String,
        /// Number of status checks performed
        attempts: u32,
        /// Status seen on the final check
        last_status: ReportStatus,
    },

    /// Document metadata or signed URL download failed
    #[error("document fetch failed: {0}")]
    DocumentFetch(UpstreamFailure),
}

/// Result type for report workflow operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Header carrying the LWA access token on SP-API calls
pub const ACCESS_TOKEN_HEADER: &str = "x-amz-access-token";
