//! Integration tests for logging and tracing

use crate::support::{credentials, done_body, endpoints, instant_polling, ScriptedTransport};
use listings_report_downloader::pipeline::{ListingsPipeline, LoggingObserver, PipelineEvent, ProgressObserver};
use listings_report_downloader::sp_api::PollObservation;
use listings_report_downloader::{ReportStatus, DEFAULT_LOG_FILTER};
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// In-memory log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn text_subscriber(logs: &CapturedLogs) -> impl tracing::Subscriber + Send + Sync {
    let sink = logs.clone();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(DEFAULT_LOG_FILTER))
        .with_ansi(false)
        .with_writer(move || sink.clone())
        .finish()
}

#[test]
fn test_default_filter_keeps_crate_info_and_drops_the_rest() {
    let logs = CapturedLogs::default();

    tracing::subscriber::with_default(text_subscriber(&logs), || {
        tracing::info!(target: "listings_report_downloader::pipeline", "crate info line");
        tracing::warn!(target: "listings_report_downloader::sp_api::poller", "crate warn line");
        tracing::debug!(target: "listings_report_downloader::sp_api::transport", "crate debug line");
        tracing::info!(target: "hyper_util::client", "dependency info line");
    });

    let contents = logs.contents();
    assert!(contents.contains("crate info line"));
    assert!(contents.contains("crate warn line"));
    assert!(!contents.contains("crate debug line"));
    assert!(!contents.contains("dependency info line"));
}

#[test]
fn test_logging_observer_writes_poll_progress() {
    let logs = CapturedLogs::default();

    tracing::subscriber::with_default(text_subscriber(&logs), || {
        LoggingObserver.on_event(&PipelineEvent::PollAttempt(PollObservation {
            attempt: 2,
            max_attempts: 20,
            status: ReportStatus::InProgress,
        }));
    });

    assert!(logs.contents().contains("Polling attempt 2/20: IN_PROGRESS"));
}

#[test]
fn test_json_format_emits_one_object_per_event() {
    let logs = CapturedLogs::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(DEFAULT_LOG_FILTER))
        .with_writer(move || sink.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        LoggingObserver.on_event(&PipelineEvent::Authenticating);
        LoggingObserver.on_event(&PipelineEvent::Completed { bytes: 42 });
    });

    let lines: Vec<serde_json::Value> = logs
        .contents()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["level"], "INFO");
    assert_eq!(lines[0]["fields"]["message"], "Authenticating with SP-API");
    assert_eq!(lines[1]["fields"]["bytes"], 42);
}

#[tokio::test(flavor = "current_thread")]
async fn test_pipeline_logs_carry_seller_span_and_no_secrets() {
    let logs = CapturedLogs::default();
    let _guard = tracing::subscriber::set_default(text_subscriber(&logs));

    let transport = ScriptedTransport::new();
    transport.push_json(200, json!({ "access_token": "Atza|very-secret-token" }));
    transport.push_json(202, json!({ "reportId": "R1" }));
    transport.push_json(200, done_body("D1"));
    transport.push_json(
        200,
        json!({ "url": "https://bucket.test/doc?X-Amz-Signature=signed" }),
    );
    transport.push_text(200, "sku\tqty\n");

    let pipeline = ListingsPipeline::new(
        credentials(),
        endpoints(),
        instant_polling(5),
        transport.clone(),
    );
    pipeline.run(&LoggingObserver).await.unwrap();

    let contents = logs.contents();
    assert!(contents.contains("listings_report"));
    assert!(contents.contains("A1SELLER"));
    assert!(contents.contains("Polling attempt 1/5: DONE"));
    assert!(!contents.contains("very-secret-token"));
    assert!(!contents.contains("client-secret"));
    assert!(!contents.contains("X-Amz-Signature"));
}
