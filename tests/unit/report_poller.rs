//! Tests for the report status state machine

use crate::support::{done_body, endpoints, instant_polling, status_body, ScriptedTransport};
use listings_report_downloader::config::PollConfig;
use listings_report_downloader::sp_api::{
    HttpMethod, PollObservation, ReportError, ReportPoller, UpstreamFailure,
};
use listings_report_downloader::{AccessToken, ReportHandle, ReportStatus};
use std::time::Duration;

fn token() -> AccessToken {
    AccessToken::new("Atza|token")
}

#[tokio::test]
async fn test_returns_after_one_fetch_when_first_status_is_done() {
    let transport = ScriptedTransport::new();
    transport.push_json(200, done_body("D1"));

    let poller = ReportPoller::new(transport.clone(), endpoints(), instant_polling(20));
    let document = poller
        .poll_until_ready(&ReportHandle::new("R1"), &token(), |_| {})
        .await
        .unwrap();

    assert_eq!(document.document_id, "D1");
    assert_eq!(transport.request_count(), 1);

    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, "https://sp-api.test/reports/2021-06-30/reports/R1");
    assert_eq!(request.header_value("x-amz-access-token"), Some("Atza|token"));
}

#[tokio::test]
async fn test_times_out_after_exactly_max_attempts() {
    let transport = ScriptedTransport::new();
    for _ in 0..4 {
        transport.push_json(200, status_body("IN_PROGRESS"));
    }

    let poller = ReportPoller::new(transport.clone(), endpoints(), instant_polling(3));
    let err = poller
        .poll_until_ready(&ReportHandle::new("R1"), &token(), |_| {})
        .await
        .unwrap_err();

    match err {
        ReportError::ReportTimeout {
            report_id,
            attempts,
            last_status,
        } => {
            assert_eq!(report_id, "R1");
            assert_eq!(attempts, 3);
            assert_eq!(last_status, ReportStatus::InProgress);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(transport.request_count(), 3);
    assert_eq!(transport.remaining(), 1, "no fetch after exhaustion");
}

#[tokio::test]
async fn test_halts_immediately_on_terminal_failure() {
    for terminal in ["CANCELLED", "FATAL"] {
        let transport = ScriptedTransport::new();
        transport.push_json(200, status_body("IN_QUEUE"));
        transport.push_json(200, status_body(terminal));
        transport.push_json(200, done_body("D1"));

        let poller = ReportPoller::new(transport.clone(), endpoints(), instant_polling(20));
        let err = poller
            .poll_until_ready(&ReportHandle::new("R1"), &token(), |_| {})
            .await
            .unwrap_err();

        match err {
            ReportError::ReportFailed { report_id, status } => {
                assert_eq!(report_id, "R1");
                assert_eq!(status.as_str(), terminal);
            }
            other => panic!("expected report failure, got {other:?}"),
        }
        assert_eq!(transport.request_count(), 2);
    }
}

#[tokio::test]
async fn test_unknown_statuses_keep_polling() {
    let transport = ScriptedTransport::new();
    transport.push_json(200, status_body("IN_QUEUE"));
    transport.push_json(200, status_body("SOMETHING_NEW"));
    transport.push_json(200, done_body("D7"));

    let poller = ReportPoller::new(transport.clone(), endpoints(), instant_polling(5));
    let document = poller
        .poll_until_ready(&ReportHandle::new("R1"), &token(), |_| {})
        .await
        .unwrap();

    assert_eq!(document.document_id, "D7");
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_reports_each_attempt_to_observer() {
    let transport = ScriptedTransport::new();
    transport.push_json(200, status_body("IN_QUEUE"));
    transport.push_json(200, status_body("IN_PROGRESS"));
    transport.push_json(200, done_body("D1"));

    let poller = ReportPoller::new(transport.clone(), endpoints(), instant_polling(10));
    let mut observations = Vec::new();
    poller
        .poll_until_ready(&ReportHandle::new("R1"), &token(), |observation| {
            observations.push(observation.clone())
        })
        .await
        .unwrap();

    assert_eq!(
        observations,
        vec![
            PollObservation {
                attempt: 1,
                max_attempts: 10,
                status: ReportStatus::InQueue
            },
            PollObservation {
                attempt: 2,
                max_attempts: 10,
                status: ReportStatus::InProgress
            },
            PollObservation {
                attempt: 3,
                max_attempts: 10,
                status: ReportStatus::Done
            },
        ]
    );
}

#[tokio::test]
async fn test_done_without_document_id_is_an_error() {
    let transport = ScriptedTransport::new();
    transport.push_json(200, status_body("DONE"));

    let poller = ReportPoller::new(transport.clone(), endpoints(), instant_polling(3));
    let err = poller
        .poll_until_ready(&ReportHandle::new("R1"), &token(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReportError::ReportStatus {
            failure: UpstreamFailure::InvalidResponse(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_failed_status_call_is_fatal() {
    let transport = ScriptedTransport::new();
    transport.push_text(403, "{\"errors\":[{\"code\":\"Unauthorized\"}]}");
    transport.push_json(200, done_body("D1"));

    let poller = ReportPoller::new(transport.clone(), endpoints(), instant_polling(5));
    let err = poller
        .poll_until_ready(&ReportHandle::new("R1"), &token(), |_| {})
        .await
        .unwrap_err();

    match err {
        ReportError::ReportStatus { report_id, failure } => {
            assert_eq!(report_id, "R1");
            assert!(matches!(failure, UpstreamFailure::Status { status: 403, .. }));
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sleeps_interval_before_every_check() {
    let transport = ScriptedTransport::new();
    transport.push_json(200, status_body("IN_QUEUE"));
    transport.push_json(200, status_body("IN_PROGRESS"));
    transport.push_json(200, done_body("D1"));

    let config = PollConfig::new(20, Duration::from_secs(15)).unwrap();
    let poller = ReportPoller::new(transport.clone(), endpoints(), config);

    let started = tokio::time::Instant::now();
    poller
        .poll_until_ready(&ReportHandle::new("R1"), &token(), |_| {})
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(45));
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_worst_case_wait_matches_budget() {
    let transport = ScriptedTransport::new();
    for _ in 0..4 {
        transport.push_json(200, status_body("IN_QUEUE"));
    }

    let config = PollConfig::new(4, Duration::from_secs(15)).unwrap();
    let poller = ReportPoller::new(transport.clone(), endpoints(), config);

    let started = tokio::time::Instant::now();
    let result = poller
        .poll_until_ready(&ReportHandle::new("R1"), &token(), |_| {})
        .await;

    assert!(matches!(result, Err(ReportError::ReportTimeout { .. })));
    assert!(started.elapsed() >= config.worst_case_wait());
}
