//! Kasparro CLI - AI visibility explanations
//!
//! Usage:
//!   kasparro serve --port 3000                       Start web server
//!   kasparro explain -t visibility -b Acme -m gemini Generate an explanation
//!   kasparro models                                  Show AI engine guides
//!   kasparro audit                                   Show audit summary

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kasparro_core::{AuditStore, EngineCatalog, ExplanationService, PromptLibrary};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
            audit_dir,
        } => {
            commands::cmd_serve(&host, port, static_dir.as_deref(), audit_dir.as_deref()).await
        }
        Commands::Explain(args) => {
            let request = commands::build_request(&args);
            if args.offline {
                let catalog = load_catalog()?;
                commands::cmd_explain_offline(&catalog, &request, args.json)
            } else if let Some(url) = args.remote.as_deref() {
                let catalog = load_catalog()?;
                commands::cmd_explain_remote(url, catalog, &request, args.json).await
            } else {
                let service =
                    ExplanationService::from_env().context("Failed to configure explanation service")?;
                commands::cmd_explain(&service, &request, args.json).await
            }
        }
        Commands::Health { remote } => match remote {
            Some(url) => commands::cmd_health_remote(&url, load_catalog()?).await,
            None => {
                let service =
                    ExplanationService::from_env().context("Failed to configure explanation service")?;
                commands::cmd_health(&service)
            }
        },
        Commands::Models { id } => {
            let catalog = load_catalog()?;
            match id {
                Some(id) => commands::cmd_models_show(&catalog, &id),
                None => commands::cmd_models_list(&catalog),
            }
        }
        Commands::Prompts { action } => {
            let mut library = PromptLibrary::new();
            match action {
                None | Some(PromptsAction::List) => commands::cmd_prompts_list(&mut library),
                Some(PromptsAction::Show { prompt_id }) => {
                    commands::cmd_prompts_show(&mut library, &prompt_id)
                }
                Some(PromptsAction::Path) => commands::cmd_prompts_path(),
            }
        }
        Commands::Audit { module, audit_dir } => {
            let store = match audit_dir {
                Some(dir) => AuditStore::load_dir(&dir)
                    .with_context(|| format!("Failed to load audit data from {}", dir.display()))?,
                None => AuditStore::embedded().context("Bundled audit data is invalid")?,
            };
            match module {
                Some(module) => commands::cmd_audit_show(&store, &module),
                None => commands::cmd_audit_summary(&store),
            }
        }
    }
}

fn load_catalog() -> Result<EngineCatalog> {
    EngineCatalog::from_env().context("Failed to load engine catalog")
}
