//! Client for a running explanation endpoint
//!
//! Used by the CLI (`kasparro explain --remote`) the same way the dashboard
//! calls the service: any failure is replaced by the locally computed
//! fallback so the caller always has text to show.

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, warn};

use crate::catalog::EngineCatalog;
use crate::error::{Error, Result};
use crate::models::{ExplanationRequest, ExplanationResponse, HealthStatus};

/// Path of the explanation endpoint relative to the server base URL
pub const EXPLANATION_PATH: &str = "/api/ai-explanation";

/// HTTP client for `/api/ai-explanation`
#[derive(Clone)]
pub struct ExplanationClient {
    http_client: Client,
    endpoint: String,
    catalog: Arc<EngineCatalog>,
}

impl ExplanationClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:3000`)
    pub fn new(base_url: &str, catalog: EngineCatalog) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), EXPLANATION_PATH),
            catalog: Arc::new(catalog),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request an explanation; never fails
    pub async fn explain(&self, request: &ExplanationRequest) -> ExplanationResponse {
        match self.post(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Explanation request failed, using fallback");
                self.catalog.fallback_response(request, e)
            }
        }
    }

    async fn post(&self, request: &ExplanationRequest) -> Result<ExplanationResponse> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(Error::Provider {
                status: status.as_u16(),
                details,
            });
        }

        let body = response.json::<ExplanationResponse>().await?;
        debug!(success = body.success, "Explanation received");
        Ok(body)
    }

    /// Query the endpoint's health check
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.http_client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Unavailable(format!(
                "Health check returned {}",
                status
            )));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InsightKind;
    use axum::{http::StatusCode, routing::post, Json, Router};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn request() -> ExplanationRequest {
        ExplanationRequest::new(InsightKind::Visibility, "Acme")
            .with_model("perplexity")
            .with_value(20.0)
    }

    #[test]
    fn test_endpoint_joins_path() {
        let client = ExplanationClient::new("http://localhost:3000/", EngineCatalog::embedded().unwrap());
        assert_eq!(client.endpoint(), "http://localhost:3000/api/ai-explanation");
    }

    #[tokio::test]
    async fn test_explain_passes_server_response_through() {
        let app = Router::new().route(
            EXPLANATION_PATH,
            post(|Json(req): Json<ExplanationRequest>| async move {
                Json(ExplanationResponse::generated(&req, "From server".to_string()))
            }),
        );
        let client = ExplanationClient::new(&serve(app).await, EngineCatalog::embedded().unwrap());

        let response = client.explain(&request()).await;
        assert!(response.success);
        assert_eq!(response.explanation, "From server");
        assert_eq!(response.model, "perplexity");
    }

    #[tokio::test]
    async fn test_explain_falls_back_on_error_status() {
        let app = Router::new().route(
            EXPLANATION_PATH,
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let catalog = EngineCatalog::embedded().unwrap();
        let expected = catalog.fallback_explanation(Some("perplexity"), Some(20.0)).to_string();
        let client = ExplanationClient::new(&serve(app).await, catalog);

        let response = client.explain(&request()).await;
        assert!(!response.success);
        assert_eq!(response.explanation, expected);
        assert!(response.error.unwrap().contains("502"));
    }

    #[tokio::test]
    async fn test_explain_falls_back_when_unreachable() {
        let client = ExplanationClient::new("http://127.0.0.1:1", EngineCatalog::embedded().unwrap());
        let response = client.explain(&request()).await;
        assert!(!response.success);
        assert!(!response.explanation.is_empty());
        assert!(response.error.is_some());
    }
}
