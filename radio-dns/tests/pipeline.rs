//! End-to-end tests for the resolve -> parse -> rank pipeline
//!
//! A loopback DoH responder stands in for the public resolver so these
//! tests never leave the machine.

use std::time::Duration;

use radio_dns::mock::{MockHttpServer, MockResponse};
use radio_dns::{parse_answers, DohResolver, Error, ServerList, SkipReason};
use serde_json::json;

const SERVICE: &str = "_api._tcp.radio-browser.info";

async fn discover(server: &MockHttpServer) -> radio_dns::Result<ServerList> {
    let resolver = DohResolver::new(&server.url("/dns-query"), Duration::from_secs(2))?;
    let answers = resolver.query_srv(SERVICE).await?;
    Ok(ServerList::from_records(parse_answers(&answers).records))
}

#[tokio::test]
async fn test_mixed_answers_rank_by_weight_within_priority() {
    let server = MockHttpServer::start(MockResponse::dns_json(json!([
        {"type": 33, "data": "10 5 443 server1.example.org."},
        {"type": 1, "data": "1.2.3.4"},
        {"type": 33, "data": "10 20 443 server2.example.org."}
    ])))
    .await
    .unwrap();

    let resolver = DohResolver::new(&server.url("/dns-query"), Duration::from_secs(2)).unwrap();
    let answers = resolver.query_srv(SERVICE).await.unwrap();
    let batch = parse_answers(&answers);

    let parsed: Vec<(u16, u16, &str)> = batch
        .records
        .iter()
        .map(|r| (r.priority(), r.weight(), r.target()))
        .collect();
    assert_eq!(
        parsed,
        vec![(10, 5, "server1.example.org"), (10, 20, "server2.example.org")]
    );
    assert_eq!(batch.skipped, vec![SkipReason::NotSrv(1)]);

    let servers = ServerList::from_records(batch.records);
    assert_eq!(
        servers.urls(),
        vec!["https://server1.example.org", "https://server2.example.org"]
    );
}

#[tokio::test]
async fn test_live_shaped_response() {
    // Shape of an actual Cloudflare answer for the radio-browser service
    let server = MockHttpServer::start(MockResponse::dns_json(json!([
        {"name": "_api._tcp.radio-browser.info", "type": 33, "TTL": 300, "data": "1 1 443 fi1.api.radio-browser.info."},
        {"name": "_api._tcp.radio-browser.info", "type": 33, "TTL": 300, "data": "1 1 443 de2.api.radio-browser.info."},
        {"name": "_api._tcp.radio-browser.info", "type": 33, "TTL": 300, "data": "1 1 443 de1.api.radio-browser.info."}
    ])))
    .await
    .unwrap();

    let servers = discover(&server).await.unwrap();
    assert_eq!(
        servers.urls(),
        vec![
            "https://fi1.api.radio-browser.info",
            "https://de2.api.radio-browser.info",
            "https://de1.api.radio-browser.info",
        ]
    );
}

#[tokio::test]
async fn test_empty_answer_is_not_an_error() {
    let server = MockHttpServer::start(MockResponse::dns_json(json!([])))
        .await
        .unwrap();

    let servers = discover(&server).await.unwrap();
    assert!(servers.is_empty());
}

#[tokio::test]
async fn test_only_garbage_answers_yield_empty_list() {
    let server = MockHttpServer::start(MockResponse::dns_json(json!([
        {"type": 33, "data": "not an srv record"},
        {"type": 16, "data": "\"v=spf1 -all\""},
        {"type": 33}
    ])))
    .await
    .unwrap();

    let servers = discover(&server).await.unwrap();
    assert!(servers.is_empty());
}

#[tokio::test]
async fn test_server_error_fails_resolution() {
    let server = MockHttpServer::start(MockResponse::status(503)).await.unwrap();

    let err = discover(&server).await.unwrap_err();
    assert!(matches!(err, Error::ResolutionFailed(_)));
}

#[tokio::test]
async fn test_missing_answer_section_is_invalid_response() {
    let server = MockHttpServer::start(MockResponse::new(
        200,
        radio_dns::DNS_JSON_CONTENT_TYPE,
        r#"{"Status":3,"Question":[{"name":"_api._tcp.radio-browser.info","type":33}]}"#,
    ))
    .await
    .unwrap();

    let err = discover(&server).await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));
}
