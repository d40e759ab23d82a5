//! Tests for report creation

use crate::support::{endpoints, ScriptedTransport};
use listings_report_downloader::sp_api::{
    HttpMethod, ReportError, ReportRequester, RequestBody, UpstreamFailure,
};
use listings_report_downloader::AccessToken;
use serde_json::json;

#[tokio::test]
async fn test_request_report_returns_report_id() {
    let transport = ScriptedTransport::new();
    transport.push_json(202, json!({ "reportId": "R1" }));

    let requester = ReportRequester::new(transport.clone(), endpoints());
    let handle = requester
        .request_report(&AccessToken::new("Atza|token"), "ATVPDKIKX0DER")
        .await
        .unwrap();

    assert_eq!(handle.report_id, "R1");
}

#[tokio::test]
async fn test_request_report_sends_listings_request() {
    let transport = ScriptedTransport::new();
    transport.push_json(202, json!({ "reportId": "R1" }));

    let requester = ReportRequester::new(transport.clone(), endpoints());
    requester
        .request_report(&AccessToken::new("Atza|token"), "A1PA6795UKMFR9")
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, "https://sp-api.test/reports/2021-06-30/reports");
    assert_eq!(request.header_value("x-amz-access-token"), Some("Atza|token"));
    assert_eq!(
        request.body,
        RequestBody::Json(json!({
            "reportType": "GET_MERCHANT_LISTINGS_ALL_DATA",
            "marketplaceIds": ["A1PA6795UKMFR9"]
        }))
    );
}

#[tokio::test]
async fn test_request_report_fails_on_non_2xx() {
    let transport = ScriptedTransport::new();
    transport.push_text(
        400,
        "{\"errors\":[{\"code\":\"InvalidInput\",\"message\":\"bad marketplace\"}]}",
    );

    let requester = ReportRequester::new(transport.clone(), endpoints());
    let err = requester
        .request_report(&AccessToken::new("t"), "bad")
        .await
        .unwrap_err();

    match err {
        ReportError::ReportRequest(UpstreamFailure::Status { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("bad marketplace"));
        }
        other => panic!("expected report request error, got {other:?}"),
    }
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_request_report_fails_without_report_id() {
    let transport = ScriptedTransport::new();
    transport.push_json(202, json!({}));

    let requester = ReportRequester::new(transport.clone(), endpoints());
    let err = requester
        .request_report(&AccessToken::new("t"), "ATVPDKIKX0DER")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReportError::ReportRequest(UpstreamFailure::InvalidResponse(_))
    ));
}
