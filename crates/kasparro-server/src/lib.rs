//! Kasparro Web Server
//!
//! Axum-based REST API behind the Kasparro dashboard.
//!
//! - `/api/ai-explanation`: AI explanation generation and health check
//! - `/api/models`: static guides for the supported AI engines
//! - `/api/audit`: audit module fixtures
//!
//! Security features:
//! - Restrictive CORS policy
//! - Security response headers
//! - Sanitized error responses

use std::path::Path;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use kasparro_core::{AuditStore, ExplanationService};

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `KASPARRO_ALLOWED_ORIGINS` (comma-separated)
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("KASPARRO_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();
        Self { allowed_origins }
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub explanations: ExplanationService,
    pub audit: AuditStore,
}

/// Create the application router
pub fn create_router(
    explanations: ExplanationService,
    audit: AuditStore,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    let cors = cors_layer(&config.allowed_origins);

    let state = Arc::new(AppState {
        explanations,
        audit,
    });

    let api_routes = Router::new()
        .route(
            "/ai-explanation",
            get(handlers::explanation_health).post(handlers::generate_explanation),
        )
        .route("/models", get(handlers::list_model_guides))
        .route("/models/:id", get(handlers::get_model_guide))
        .route("/audit/modules", get(handlers::list_audit_modules))
        .route("/audit/summary", get(handlers::audit_summary))
        .route("/audit/:module_id", get(handlers::get_audit_module));

    // CSP: restrict scripts to same-origin, allow inline styles (Tailwind), allow data: images
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve the built dashboard if a directory was provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return cors;
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

/// Start the server with configuration from the environment
pub async fn serve(
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    audit_dir: Option<&Path>,
) -> anyhow::Result<()> {
    serve_with_config(host, port, static_dir, audit_dir, ServerConfig::from_env()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    audit_dir: Option<&Path>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let explanations = ExplanationService::from_env()?;
    let audit = match audit_dir {
        Some(dir) => AuditStore::load_dir(dir)?,
        None => AuditStore::embedded()?,
    };

    check_provider_credential(&explanations);

    let app = create_router(explanations, audit, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Log whether explanations can be generated
fn check_provider_credential(explanations: &ExplanationService) {
    if explanations.credential().is_configured() {
        info!("✅ Provider credential configured");
    } else {
        warn!(
            "⚠️  {} not set: POST /api/ai-explanation will return 500 until it is",
            explanations.credential().describe()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<String>,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            details: None,
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Attach client-visible detail text
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = match self.details {
            Some(details) => Json(serde_json::json!({
                "error": self.message,
                "details": details,
            })),
            None => Json(serde_json::json!({
                "error": self.message
            })),
        };

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            details: None,
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
