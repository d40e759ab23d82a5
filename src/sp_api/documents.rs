//! Report document retrieval (`getReportDocument` + signed URL download)

use bytes::Bytes;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::endpoints::SpApiEndpoints;
use super::transport::{HttpRequest, HttpTransport};
use super::{ReportError, ReportResult, UpstreamFailure, ACCESS_TOKEN_HEADER};
use crate::{AccessToken, ReportDocumentHandle};

/// Where to download a finished report from
///
/// The URL is pre-signed and time-limited; it is consumed by
/// [`DocumentFetcher::download`] and never kept. `Debug` omits the query string
/// because it carries the signature.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadDescriptor {
    /// Signed download URL
    pub url: String,
    /// Compression applied to the document, when the vendor sets one
    #[serde(default)]
    pub compression_algorithm: Option<String>,
}

impl fmt::Debug for DownloadDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.url.split('?').next().unwrap_or_default();
        f.debug_struct("DownloadDescriptor")
            .field("url", &location)
            .field("compression_algorithm", &self.compression_algorithm)
            .finish()
    }
}

/// Resolves a document id and downloads its content
pub struct DocumentFetcher {
    transport: Arc<dyn HttpTransport>,
    endpoints: SpApiEndpoints,
}

impl DocumentFetcher {
    /// Create a fetcher
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: SpApiEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Resolve the document and download it: exactly two requests
    ///
    /// The body of the signed URL response is returned unmodified.
    ///
    /// # Errors
    /// [`ReportError::DocumentFetch`] when either request fails, or when the
    /// document is compressed (compressed payloads are not decoded).
    pub async fn fetch_document(
        &self,
        handle: &ReportDocumentHandle,
        token: &AccessToken,
    ) -> ReportResult<Bytes> {
        let descriptor = self.resolve(handle, token).await?;

        if let Some(algorithm) = &descriptor.compression_algorithm {
            return Err(ReportError::DocumentFetch(UpstreamFailure::InvalidResponse(
                format!("unsupported compression algorithm: {algorithm}"),
            )));
        }

        self.download(descriptor).await
    }

    /// Authenticated metadata call returning the signed URL
    pub async fn resolve(
        &self,
        handle: &ReportDocumentHandle,
        token: &AccessToken,
    ) -> ReportResult<DownloadDescriptor> {
        let url = self.endpoints.document_url(&handle.document_id);
        debug!(%url, "resolving report document");

        let request = HttpRequest::get(url).header(ACCESS_TOKEN_HEADER, token.as_str());
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ReportError::DocumentFetch(e.into()))?;

        if !response.is_success() {
            return Err(ReportError::DocumentFetch(response.into_failure()));
        }

        let descriptor: DownloadDescriptor =
            response.json().map_err(ReportError::DocumentFetch)?;
        if descriptor.url.is_empty() {
            return Err(ReportError::DocumentFetch(UpstreamFailure::InvalidResponse(
                "missing url".to_string(),
            )));
        }
        Ok(descriptor)
    }

    /// Unauthenticated GET of the signed URL
    pub async fn download(&self, descriptor: DownloadDescriptor) -> ReportResult<Bytes> {
        debug!(?descriptor, "downloading report document");

        let response = self
            .transport
            .send(HttpRequest::get(descriptor.url))
            .await
            .map_err(|e| ReportError::DocumentFetch(e.into()))?;

        if !response.is_success() {
            return Err(ReportError::DocumentFetch(response.into_failure()));
        }

        debug!(bytes = response.body.len(), "report document downloaded");
        Ok(response.body)
    }
}
