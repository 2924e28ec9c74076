//! In-process HTTP responder for testing
//!
//! [`MockHttpServer`] is an axum router on a loopback port that answers
//! every request with a canned [`MockResponse`]. Each request is captured
//! so tests can check what was sent. This lets the resolver and the
//! discovery client be exercised end to end without touching the network.
//!
//! # Example
//!
//! ```ignore
//! use radio_dns::mock::{MockHttpServer, MockResponse};
//! use serde_json::json;
//!
//! async fn example() {
//!     let server = MockHttpServer::start(MockResponse::dns_json(json!([
//!         {"type": 33, "data": "1 1 443 de1.api.radio-browser.info."}
//!     ])))
//!     .await
//!     .unwrap();
//!
//!     let resolver = radio_dns::DohResolver::new(
//!         &server.url("/dns-query"),
//!         radio_dns::DEFAULT_TIMEOUT,
//!     )
//!     .unwrap();
//!     let answers = resolver.query_srv("_api._tcp.radio-browser.info").await.unwrap();
//!
//!     assert_eq!(answers.len(), 1);
//!     assert_eq!(server.request_count(), 1);
//! }
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::doh::DNS_JSON_CONTENT_TYPE;

/// Largest request body the server will buffer
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Canned HTTP response
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value
    pub content_type: String,
    /// Response body
    pub body: Vec<u8>,
    /// Delay before the response is written
    pub delay: Option<Duration>,
}

impl MockResponse {
    /// Create a response with the given status, content type and body
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            body: body.into(),
            delay: None,
        }
    }

    /// A 200 DNS-JSON response carrying `answers` as its `Answer` section
    pub fn dns_json(answers: serde_json::Value) -> Self {
        let body = serde_json::json!({
            "Status": 0,
            "TC": false,
            "RD": true,
            "RA": true,
            "AD": false,
            "CD": false,
            "Answer": answers,
        });
        Self::new(200, DNS_JSON_CONTENT_TYPE, body.to_string())
    }

    /// A 200 `application/json` response
    pub fn json(body: serde_json::Value) -> Self {
        Self::new(200, "application/json", body.to_string())
    }

    /// An empty response with the given status
    pub fn status(status: u16) -> Self {
        Self::new(status, "text/plain", Vec::new())
    }

    /// Hold the response back for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request received by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method
    pub method: String,
    /// Request target (path and query)
    pub target: String,
    /// Header name/value pairs, in the order received
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Loopback HTTP/1.1 server returning canned responses
pub struct MockHttpServer {
    addr: SocketAddr,
    response: Arc<RwLock<MockResponse>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl MockHttpServer {
    /// Bind to an ephemeral loopback port and start serving `response`
    pub async fn start(response: MockResponse) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = MockState {
            response: Arc::new(RwLock::new(response)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new().fallback(respond).with_state(state.clone());

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::debug!("Mock server stopped: {}", e);
            }
        });

        Ok(Self {
            addr,
            response: state.response,
            requests: state.requests,
            task,
        })
    }

    /// Local address the server is bound to
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://` URL for `path` on this server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Replace the canned response for subsequent requests
    pub fn set_response(&self, response: MockResponse) {
        *self.response.write().unwrap_or_else(PoisonError::into_inner) = response;
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Clone)]
struct MockState {
    response: Arc<RwLock<MockResponse>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Record the request and answer with the current canned response
async fn respond(State(state): State<MockState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let body = match to_bytes(body, MAX_BODY_SIZE).await {
        Ok(body) => body,
        Err(e) => {
            log::debug!("Mock server rejected request body: {}", e);
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: parts.method.to_string(),
            target,
            headers,
            body: body.to_vec(),
        });

    let canned = state
        .response
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, canned.content_type)],
        Body::from(canned.body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_request_header_lookup() {
        let request = RecordedRequest {
            method: "GET".into(),
            target: "/".into(),
            headers: vec![("Accept".into(), "application/dns-json".into())],
            body: Vec::new(),
        };
        assert_eq!(request.header("accept"), Some("application/dns-json"));
        assert_eq!(request.header("ACCEPT"), Some("application/dns-json"));
        assert_eq!(request.header("host"), None);
    }

    #[test]
    fn test_dns_json_response_shape() {
        let response = MockResponse::dns_json(serde_json::json!([]));
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, DNS_JSON_CONTENT_TYPE);

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["Status"], 0);
        assert!(body["Answer"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_response_applies_to_later_requests() {
        let server = MockHttpServer::start(MockResponse::status(503)).await.unwrap();
        let client = reqwest::Client::new();

        let first = client.get(server.url("/a")).send().await.unwrap();
        assert_eq!(first.status().as_u16(), 503);

        server.set_response(MockResponse::json(serde_json::json!({"ok": true})));
        let second = client.get(server.url("/b")).send().await.unwrap();
        assert_eq!(second.status().as_u16(), 200);
        assert_eq!(second.text().await.unwrap(), r#"{"ok":true}"#);

        let targets: Vec<String> = server.requests().into_iter().map(|r| r.target).collect();
        assert_eq!(targets, vec!["/a", "/b"]);
    }

    #[tokio::test]
    async fn test_request_body_and_headers_are_recorded() {
        let server = MockHttpServer::start(MockResponse::status(204)).await.unwrap();
        let client = reqwest::Client::new();

        let response = client
            .post(server.url("/json/vote?uuid=abc"))
            .header("x-trace", "42")
            .body("hello")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 204);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].target, "/json/vote?uuid=abc");
        assert_eq!(requests[0].header("X-Trace"), Some("42"));
        assert_eq!(requests[0].body, b"hello");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let server = MockHttpServer::start(MockResponse::status(200)).await.unwrap();
        let client = reqwest::Client::new();

        let response = client
            .post(server.url("/upload"))
            .body(vec![0u8; MAX_BODY_SIZE + 1])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 413);
        assert_eq!(server.request_count(), 0);
    }
}
