//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use kasparro_core::config::{API_KEY_ENV_VAR, CredentialSource, ProviderConfig};

pub async fn cmd_serve(
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    audit_dir: Option<&Path>,
) -> Result<()> {
    let provider = ProviderConfig::from_env();
    let config = kasparro_server::ServerConfig::from_env();

    println!("🚀 Starting Kasparro web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!("   Provider: {} ({})", provider.base_url, provider.model);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if let Some(dir) = audit_dir {
        println!("   Audit data: {}", dir.display());
    }
    if !config.allowed_origins.is_empty() {
        println!("   CORS origins: {}", config.allowed_origins.join(", "));
    }
    if !CredentialSource::from_env().is_configured() {
        println!();
        println!(
            "   ⚠️  {} not set - explanations will fail until it is",
            API_KEY_ENV_VAR
        );
    }
    println!();

    let static_dir = static_dir.map(|p| p.to_string_lossy().into_owned());
    kasparro_server::serve_with_config(host, port, static_dir.as_deref(), audit_dir, config)
        .await
        .context("Server failed")
}
