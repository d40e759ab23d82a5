//! Report creation (`createReport`)

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::endpoints::SpApiEndpoints;
use super::transport::{HttpRequest, HttpTransport};
use super::{ReportError, ReportResult, UpstreamFailure, ACCESS_TOKEN_HEADER};
use crate::{AccessToken, ReportHandle, LISTINGS_REPORT_TYPE};

/// Body of a `createReport` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Report type to generate
    pub report_type: String,
    /// Marketplaces to include (always exactly one here)
    pub marketplace_ids: Vec<String>,
}

impl ReportRequest {
    /// Listings report for one marketplace
    pub fn listings(marketplace_id: impl Into<String>) -> Self {
        Self {
            report_type: LISTINGS_REPORT_TYPE.to_string(),
            marketplace_ids: vec![marketplace_id.into()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateReportResponse {
    report_id: Option<String>,
}

/// Starts report generation
pub struct ReportRequester {
    transport: Arc<dyn HttpTransport>,
    endpoints: SpApiEndpoints,
}

impl ReportRequester {
    /// Create a requester
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: SpApiEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Request the listings report for `marketplace_id`
    ///
    /// # Errors
    /// [`ReportError::ReportRequest`] on transport failure, non-2xx, or a
    /// response without `reportId`.
    pub async fn request_report(
        &self,
        token: &AccessToken,
        marketplace_id: &str,
    ) -> ReportResult<ReportHandle> {
        let payload = ReportRequest::listings(marketplace_id);
        let url = self.endpoints.reports_url();
        debug!(%url, report_type = %payload.report_type, marketplace_id, "creating report");

        let body = serde_json::to_value(&payload).map_err(|e| {
            ReportError::ReportRequest(UpstreamFailure::InvalidResponse(format!(
                "failed to encode report request: {e}"
            )))
        })?;
        let request = HttpRequest::post(url)
            .header(ACCESS_TOKEN_HEADER, token.as_str())
            .json(body);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ReportError::ReportRequest(e.into()))?;

        if !response.is_success() {
            return Err(ReportError::ReportRequest(response.into_failure()));
        }

        let created: CreateReportResponse =
            response.json().map_err(ReportError::ReportRequest)?;
        match created.report_id {
            Some(report_id) if !report_id.is_empty() => Ok(ReportHandle::new(report_id)),
            _ => Err(ReportError::ReportRequest(UpstreamFailure::InvalidResponse(
                "missing reportId".to_string(),
            ))),
        }
    }
}
