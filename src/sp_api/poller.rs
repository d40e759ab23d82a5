//! Report status polling (`getReport`)
//!
//! State machine per attempt: sleep the configured interval, fetch the status,
//! report the observation, then
//!
//! - `DONE` → return the document id
//! - `CANCELLED` / `FATAL` → fail immediately, remaining attempts are not used
//! - anything else → next attempt, or [`ReportError::ReportTimeout`] once the
//!   budget is spent
//!
//! A failed status call is fatal as well; nothing here retries.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::endpoints::SpApiEndpoints;
use super::transport::{HttpRequest, HttpTransport};
use super::{ReportError, ReportResult, UpstreamFailure, ACCESS_TOKEN_HEADER};
use crate::config::PollConfig;
use crate::{AccessToken, ReportDocumentHandle, ReportHandle, ReportStatus};

/// One status check, as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollObservation {
    /// 1-based attempt number
    pub attempt: u32,
    /// Attempt budget
    pub max_attempts: u32,
    /// Status returned by this check
    pub status: ReportStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportStatusResponse {
    processing_status: ReportStatus,
    #[serde(default)]
    report_document_id: Option<String>,
}

/// Polls a report at a fixed cadence until it is ready
pub struct ReportPoller {
    transport: Arc<dyn HttpTransport>,
    endpoints: SpApiEndpoints,
    config: PollConfig,
}

impl ReportPoller {
    /// Create a poller
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        endpoints: SpApiEndpoints,
        config: PollConfig,
    ) -> Self {
        Self {
            transport,
            endpoints,
            config,
        }
    }

    /// Poll settings in use
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll until the report is `DONE`
    ///
    /// `on_attempt` is called once per status check with the attempt number and
    /// the status observed.
    ///
    /// # Errors
    /// - [`ReportError::ReportFailed`] when the status is `CANCELLED` or `FATAL`
    /// - [`ReportError::ReportTimeout`] after `max_attempts` checks without `DONE`
    /// - [`ReportError::ReportStatus`] when a status call fails, or `DONE`
    ///   arrives without a document id
    pub async fn poll_until_ready<F>(
        &self,
        handle: &ReportHandle,
        token: &AccessToken,
        mut on_attempt: F,
    ) -> ReportResult<ReportDocumentHandle>
    where
        F: FnMut(&PollObservation),
    {
        let max_attempts = self.config.max_attempts();
        let url = self.endpoints.report_url(&handle.report_id);
        let mut attempt = 0;

        loop {
            attempt += 1;
            tokio::time::sleep(self.config.interval()).await;

            let report = self.fetch_status(&url, handle, token).await?;
            let status = report.processing_status;
            debug!(report_id = %handle, attempt, max_attempts, %status, "polled report status");

            on_attempt(&PollObservation {
                attempt,
                max_attempts,
                status: status.clone(),
            });

            if status.is_done() {
                return match report.report_document_id {
                    Some(document_id) if !document_id.is_empty() => {
                        Ok(ReportDocumentHandle::new(document_id))
                    }
                    _ => Err(ReportError::ReportStatus {
                        report_id: handle.report_id.clone(),
                        failure: UpstreamFailure::InvalidResponse(
                            "report is DONE but has no reportDocumentId".to_string(),
                        ),
                    }),
                };
            }

            if status.is_terminal_failure() {
                warn!(report_id = %handle, %status, "report ended without a document");
                return Err(ReportError::ReportFailed {
                    report_id: handle.report_id.clone(),
                    status,
                });
            }

            if attempt >= max_attempts {
                warn!(report_id = %handle, attempts = attempt, %status, "report polling exhausted");
                return Err(ReportError::ReportTimeout {
                    report_id: handle.report_id.clone(),
                    attempts: attempt,
                    last_status: status,
                });
            }
        }
    }

    async fn fetch_status(
        &self,
        url: &str,
        handle: &ReportHandle,
        token: &AccessToken,
    ) -> ReportResult<ReportStatusResponse> {
        let status_error = |failure: UpstreamFailure| ReportError::ReportStatus {
            report_id: handle.report_id.clone(),
            failure,
        };

        let request = HttpRequest::get(url).header(ACCESS_TOKEN_HEADER, token.as_str());
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| status_error(e.into()))?;

        if !response.is_success() {
            return Err(status_error(response.into_failure()));
        }

        response.json().map_err(status_error)
    }
}
