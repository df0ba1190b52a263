//! Mock Telegram Bot API for integration tests.
//!
//! Answers `POST /bot<token>/<method>`. `sendMessage` succeeds unless a
//! failure was configured; `getUpdates` returns queued batches in order and
//! an empty list once the queue is drained.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

#[derive(Default)]
struct MockState {
    calls: Vec<(String, String, Value)>,
    update_batches: VecDeque<Value>,
    send_failure: Option<(u16, Value)>,
}

/// Recorded Bot API call.
#[derive(Debug, Clone)]
pub struct Call {
    pub path_token: String,
    pub method: String,
    pub body: Value,
}

pub struct MockTelegramServer {
    addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTelegramServer {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new()
            .route("/{token}/{method}", post(handle_method))
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

    /// Base URL to use as `api_base`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue one `getUpdates` result array.
    pub async fn push_updates(&self, updates: Value) {
        self.state.lock().await.update_batches.push_back(updates);
    }

    /// Make every `sendMessage` fail with `status` and `body`.
    pub async fn fail_sends(&self, status: u16, body: Value) {
        self.state.lock().await.send_failure = Some((status, body));
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .map(|(path_token, method, body)| Call {
                path_token: path_token.clone(),
                method: method.clone(),
                body: body.clone(),
            })
            .collect()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_method(
    State(state): State<Arc<Mutex<MockState>>>,
    Path((token, method)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().await;
    state.calls.push((token, method.clone(), body));

    match method.as_str() {
        "sendMessage" => match &state.send_failure {
            Some((status, body)) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                Json(body.clone()),
            ),
            None => (
                StatusCode::OK,
                Json(json!({"ok": true, "result": {"message_id": 1}})),
            ),
        },
        "getUpdates" => {
            let result = state.update_batches.pop_front().unwrap_or_else(|| json!([]));
            (StatusCode::OK, Json(json!({"ok": true, "result": result})))
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"ok": false, "error_code": 404, "description": "Not Found"})),
        ),
    }
}
