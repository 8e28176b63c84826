//! Explanation command implementations

use anyhow::{Context, Result};

use kasparro_core::{
    EngineCatalog, ExplanationClient, ExplanationRequest, ExplanationResponse, ExplanationService,
    HealthStatus,
};

use crate::cli::ExplainArgs;

/// Build a request from CLI arguments
///
/// The insight type is passed through as typed so that validation reports it.
pub fn build_request(args: &ExplainArgs) -> ExplanationRequest {
    ExplanationRequest {
        insight_type: args.insight_type.trim().to_lowercase(),
        model: args.model.clone(),
        brand_name: args.brand.clone(),
        metric: args.metric.clone(),
        value: args.value,
        context: args.context.clone(),
    }
}

/// Generate an explanation with the locally configured provider
pub async fn cmd_explain(
    service: &ExplanationService,
    request: &ExplanationRequest,
    json: bool,
) -> Result<()> {
    let response = service
        .generate_explanation(request)
        .await
        .context("Cannot generate explanation")?;
    print_response(&response, json)
}

/// Ask a running server for an explanation
pub async fn cmd_explain_remote(
    url: &str,
    catalog: EngineCatalog,
    request: &ExplanationRequest,
    json: bool,
) -> Result<()> {
    let client = ExplanationClient::new(url, catalog);
    let response = client.explain(request).await;
    print_response(&response, json)
}

/// Print the fallback explanation without any network call
pub fn cmd_explain_offline(
    catalog: &EngineCatalog,
    request: &ExplanationRequest,
    json: bool,
) -> Result<()> {
    request.validate().context("Invalid request")?;
    let response = catalog.fallback_response(request, "offline mode");
    print_response(&response, json)
}

/// Show local service health
pub fn cmd_health(service: &ExplanationService) -> Result<()> {
    let info = service.backend().info();
    print_health(&service.health());
    println!("Provider:  {} ({}, {})", info.host, info.model, info.kind);
    Ok(())
}

/// Show the health of a running server
pub async fn cmd_health_remote(url: &str, catalog: EngineCatalog) -> Result<()> {
    let client = ExplanationClient::new(url, catalog);
    let health = client
        .health()
        .await
        .with_context(|| format!("Health check failed for {}", client.endpoint()))?;
    print_health(&health);
    Ok(())
}

fn print_health(health: &HealthStatus) {
    let configured = if health.provider_configured {
        "✅ configured"
    } else {
        "❌ not configured"
    };
    println!("Service:   {} ({})", health.service, health.status);
    println!("API key:   {}", configured);
    println!("Models:    {}", health.available_models.join(", "));
}

fn print_response(response: &ExplanationResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    let marker = if response.success { "🤖" } else { "⚠️ " };
    println!(
        "{} {} insight for model '{}'",
        marker, response.insight_type, response.model
    );
    println!();
    println!("{}", response.explanation.trim());
    if let Some(ref error) = response.error {
        println!();
        println!("(fallback explanation: {})", error);
    }
    Ok(())
}
