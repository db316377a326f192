//! In-process mock of the generation backend. Every route answers with the
//! same canned status and body; requests are recorded for assertions.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use super::ApiClient;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    requests: mpsc::UnboundedSender<RecordedRequest>,
}

pub struct StubServer {
    pub base_url: String,
    requests: mpsc::UnboundedReceiver<RecordedRequest>,
}

impl StubServer {
    pub async fn start(status: u16, body: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = StubState {
            status: StatusCode::from_u16(status).expect("valid status code"),
            body: body.to_string(),
            requests: tx,
        };

        let app = Router::new()
            .route("/api/generate", post(respond))
            .route("/api/health", get(respond))
            .route("/api/model-info", get(respond))
            .route("/api/create-template", post(respond))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}/api", addr),
            requests: rx,
        }
    }

    pub async fn next_request(&mut self) -> RecordedRequest {
        self.requests.recv().await.expect("stub server stopped")
    }

    /// Requests received so far that haven't been taken with `next_request`
    pub fn pending_requests(&mut self) -> usize {
        let mut count = 0;
        while self.requests.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

async fn respond(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> impl IntoResponse {
    let _ = state.requests.send(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

/// An endpoint on a port nobody listens on
pub async fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind free port");
    let addr = listener.local_addr().expect("free port address");
    drop(listener);
    format!("http://{}/api", addr)
}

/// Client that ignores proxy settings from the environment
pub fn test_client(endpoint: &str) -> ApiClient {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build reqwest client");
    ApiClient::with_client(endpoint, client).expect("valid endpoint")
}
