//! Local `axum` server standing in for the Google APIs.
//!
//! Responses are canned per path; every request is recorded so tests can
//! inspect query strings and bodies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tokio::sync::oneshot;

/// Canned response for one path.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    delay: Duration,
}

impl MockResponse {
    /// `200 OK` with a JSON body.
    pub fn json(body: &str) -> Self {
        Self::bytes("application/json", body.as_bytes().to_vec())
    }

    /// `200 OK` with an arbitrary body.
    pub fn bytes(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
            delay: Duration::ZERO,
        }
    }

    /// Empty response with the given status.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    /// Wait before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).expect("valid mock status");
        (status, [(CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// A request as received by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Path and query string.
    pub target: String,
    /// Raw body.
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Decoded query parameters.
    pub fn query(&self) -> Vec<(String, String)> {
        let query = self.target.split_once('?').map_or("", |(_, query)| query);
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn respond(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> MockResponse {
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            method: method.to_string(),
            target: uri
                .path_and_query()
                .map_or_else(|| uri.path().to_owned(), ToString::to_string),
            body: body.to_vec(),
        });

    let response = state
        .routes
        .lock()
        .expect("routes lock")
        .get(uri.path())
        .cloned()
        .unwrap_or_else(|| MockResponse::status(404));
    tokio::time::sleep(response.delay).await;
    response
}

/// Server bound to an ephemeral localhost port, running on a runtime owned by
/// a background thread. Dropping it shuts the server down.
#[derive(Debug)]
pub struct MockServer {
    base_url: String,
    state: MockState,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockServer {
    /// Bind and start serving.
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("mock server runtime");
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");

        let state = MockState::default();
        let app = Router::new().fallback(respond).with_state(state.clone());
        let (shutdown, stopped) = oneshot::channel::<()>();
        thread::spawn(move || {
            runtime.block_on(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        // A dropped sender also means shut down.
                        stopped.await.ok();
                    })
                    .await
                    .expect("mock server");
            });
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(shutdown),
        }
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Serve `response` for requests to `path`.
    pub fn respond(&self, path: &str, response: MockResponse) {
        self.state
            .routes
            .lock()
            .expect("routes lock")
            .insert(path.to_owned(), response);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
    }
}
