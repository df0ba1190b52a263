//! Mock info endpoint for integration tests.
//!
//! Serves canned responses keyed by the request `type` and records every
//! request body it receives.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

#[derive(Default)]
struct MockState {
    responses: HashMap<String, (u16, String)>,
    requests: Vec<Value>,
    origins: Vec<String>,
}

/// A mock info endpoint on an ephemeral port.
pub struct MockInfoServer {
    addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockInfoServer {
    /// Start a server with no canned responses (every request gets 404).
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new()
            .route("/info", post(handle_info))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Info endpoint URL.
    pub fn url(&self) -> String {
        format!("http://{}/info", self.addr)
    }

    /// Respond to requests of `request_type` with `status` and `body`.
    pub async fn respond(&self, request_type: &str, status: u16, body: impl Into<String>) {
        self.state
            .lock()
            .await
            .responses
            .insert(request_type.to_string(), (status, body.into()));
    }

    /// All request bodies received so far.
    pub async fn requests(&self) -> Vec<Value> {
        self.state.lock().await.requests.clone()
    }

    /// `Origin` header of every request received so far.
    pub async fn origins(&self) -> Vec<String> {
        self.state.lock().await.origins.clone()
    }

    /// Shutdown the server.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_info(
    State(state): State<Arc<Mutex<MockState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let mut state = state.lock().await;
    if let Some(origin) = headers.get("origin").and_then(|v| v.to_str().ok()) {
        state.origins.push(origin.to_string());
    }
    let request_type = body
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    state.requests.push(body);

    match state.responses.get(&request_type) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body.clone(),
        ),
        None => (StatusCode::NOT_FOUND, "unknown request type".to_string()),
    }
}
