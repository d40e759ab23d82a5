//! Sequential report retrieval pipeline
//!
//! Runs the SP-API components in order for one seller and one marketplace:
//!
//! 1. [`TokenExchanger`] - refresh grant
//! 2. [`ReportRequester`] - create the listings report
//! 3. [`ReportPoller`] - wait until it is `DONE`
//! 4. [`DocumentFetcher`] - download the document
//!
//! The first error ends the run. Progress is reported through a
//! [`ProgressObserver`] so the caller decides how to show it.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::config::{Credentials, PollConfig};
use crate::sp_api::{
    DocumentFetcher, HttpTransport, PollObservation, ReportPoller, ReportRequester,
    ReportResult, ReqwestTransport, SpApiEndpoints, TokenExchanger,
};
use crate::{ReportDocumentHandle, ReportHandle};

/// Progress notifications emitted during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Exchanging the refresh token
    Authenticating,
    /// Creating the report
    RequestingReport,
    /// Report created, polling starts
    WaitingForReport {
        /// Report being generated
        report: ReportHandle,
    },
    /// One status check finished
    PollAttempt(PollObservation),
    /// Report is ready, downloading the document
    Downloading {
        /// Document being fetched
        document: ReportDocumentHandle,
    },
    /// Document downloaded
    Completed {
        /// Payload size in bytes
        bytes: usize,
    },
}

/// Receives [`PipelineEvent`]s
pub trait ProgressObserver: Send + Sync {
    /// Called for every event, in order
    fn on_event(&self, event: &PipelineEvent);
}

/// Observer that writes events to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl ProgressObserver for LoggingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::Authenticating => info!("Authenticating with SP-API"),
            PipelineEvent::RequestingReport => info!("Requesting listings report"),
            PipelineEvent::WaitingForReport { report } => {
                info!(report_id = %report, "Waiting for report to finish")
            }
            PipelineEvent::PollAttempt(observation) => info!(
                "Polling attempt {}/{}: {}",
                observation.attempt, observation.max_attempts, observation.status
            ),
            PipelineEvent::Downloading { document } => {
                info!(document_id = %document, "Downloading report contents")
            }
            PipelineEvent::Completed { bytes } => info!(bytes, "Report downloaded"),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// Report that was generated
    pub report: ReportHandle,
    /// Document that was downloaded
    pub document: ReportDocumentHandle,
    /// Raw tab-separated payload
    pub bytes: Bytes,
}

/// Report retrieval pipeline for one set of credentials
pub struct ListingsPipeline {
    credentials: Credentials,
    token_exchanger: TokenExchanger,
    requester: ReportRequester,
    poller: ReportPoller,
    fetcher: DocumentFetcher,
}

impl ListingsPipeline {
    /// Build the pipeline on top of `transport`
    pub fn new(
        credentials: Credentials,
        endpoints: SpApiEndpoints,
        poll_config: PollConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            credentials,
            token_exchanger: TokenExchanger::new(transport.clone(), endpoints.token_url()),
            requester: ReportRequester::new(transport.clone(), endpoints.clone()),
            poller: ReportPoller::new(transport.clone(), endpoints.clone(), poll_config),
            fetcher: DocumentFetcher::new(transport, endpoints),
        }
    }

    /// Build the pipeline with the production HTTP client
    pub fn with_reqwest(
        credentials: Credentials,
        endpoints: SpApiEndpoints,
        poll_config: PollConfig,
    ) -> Self {
        Self::new(
            credentials,
            endpoints,
            poll_config,
            Arc::new(ReqwestTransport::new()),
        )
    }

    /// Run all steps once
    ///
    /// A fresh token and a fresh report are requested on every call.
    pub async fn run(&self, observer: &dyn ProgressObserver) -> ReportResult<ReportOutcome> {
        let span = info_span!(
            "listings_report",
            seller_id = %self.credentials.seller_id(),
            marketplace_id = %self.credentials.marketplace_id(),
        );
        self.run_steps(observer).instrument(span).await
    }

    async fn run_steps(&self, observer: &dyn ProgressObserver) -> ReportResult<ReportOutcome> {
        let credentials = &self.credentials;

        observer.on_event(&PipelineEvent::Authenticating);
        let token = self
            .token_exchanger
            .exchange(
                credentials.client_id(),
                credentials.client_secret(),
                credentials.refresh_token(),
            )
            .await?;

        observer.on_event(&PipelineEvent::RequestingReport);
        let report = self
            .requester
            .request_report(&token, credentials.marketplace_id())
            .await?;

        observer.on_event(&PipelineEvent::WaitingForReport {
            report: report.clone(),
        });
        let document = self
            .poller
            .poll_until_ready(&report, &token, |observation| {
                observer.on_event(&PipelineEvent::PollAttempt(observation.clone()))
            })
            .await?;

        observer.on_event(&PipelineEvent::Downloading {
            document: document.clone(),
        });
        let bytes = self.fetcher.fetch_document(&document, &token).await?;

        observer.on_event(&PipelineEvent::Completed { bytes: bytes.len() });
        Ok(ReportOutcome {
            report,
            document,
            bytes,
        })
    }
}
