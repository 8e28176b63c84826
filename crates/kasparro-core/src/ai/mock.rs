//! Mock backend for testing
//!
//! Returns a configurable reply and records how often it was called, so tests
//! can assert that validation failures never reach the provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::ChatRequest;
use super::ChatBackend;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful completion with this text
    Text(String),
    /// Successful completion without any message content
    Empty,
    /// Non-success HTTP status with a body
    Status(u16, String),
    /// Network failure
    Unreachable,
}

/// Mock chat backend
#[derive(Clone)]
pub struct MockBackend {
    reply: MockReply,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<ChatRequest>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a mock that answers with a fixed sentence
    pub fn new() -> Self {
        Self::with_reply(MockReply::Text(
            "Mock explanation: this brand shows steady AI visibility.".to_string(),
        ))
    }

    pub fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Number of completions requested so far (shared across clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn complete(&self, _api_key: &str, request: &ChatRequest) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }

        match &self.reply {
            MockReply::Text(text) => Ok(Some(text.clone())),
            MockReply::Empty => Ok(None),
            MockReply::Status(status, body) => Err(Error::Provider {
                status: *status,
                details: body.clone(),
            }),
            MockReply::Unreachable => Err(Error::Unavailable(
                "mock provider unreachable".to_string(),
            )),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://"
    }
}
