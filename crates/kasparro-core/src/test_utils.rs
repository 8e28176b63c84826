//! Test utilities for kasparro-core
//!
//! This module provides a mock OpenAI-compatible chat-completion server that
//! can stand in for the provider during development and integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// What the mock provider answers with
#[derive(Debug, Clone)]
pub enum MockServerReply {
    /// 200 with one choice carrying this content
    Text(String),
    /// 200 with an empty `choices` array
    NoChoices,
    /// Non-success status with a body
    Status(u16, String),
    /// 200 with a body that is not JSON
    Malformed,
}

/// A request received by the mock provider
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

struct MockState {
    reply: MockServerReply,
    calls: AtomicUsize,
    last: Mutex<Option<CapturedRequest>>,
}

/// Mock chat-completion server for testing and development
pub struct MockProviderServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockProviderServer {
    /// Start the mock server on an available port
    pub async fn start(reply: MockServerReply) -> Self {
        let state = Arc::new(MockState {
            reply,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat_completions))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL to use as the provider URL (includes `/v1`)
    pub fn url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of completion requests received
    pub fn call_count(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Most recent request received
    pub fn last_request(&self) -> Option<CapturedRequest> {
        self.state.last.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockProviderServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// OpenAI chat completions endpoint
async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let model = body["model"].clone();
    *state.last.lock().unwrap() = Some(CapturedRequest {
        authorization,
        body,
    });

    match &state.reply {
        MockServerReply::Text(content) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        MockServerReply::NoChoices => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": []
        }))
        .into_response(),
        MockServerReply::Status(status, message) => {
            let status =
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(json!({"error": {"message": message}}))).into_response()
        }
        MockServerReply::Malformed => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            "<html>gateway</html>",
        )
            .into_response(),
    }
}
