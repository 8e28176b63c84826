//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Kasparro - Explain how AI engines see your brand
#[derive(Parser)]
#[command(name = "kasparro")]
#[command(about = "AI visibility explanation service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory with the built dashboard to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Directory with <module-id>.json audit documents (defaults to bundled data)
        #[arg(long)]
        audit_dir: Option<PathBuf>,
    },

    /// Generate an explanation for one insight
    Explain(ExplainArgs),

    /// Show explanation service health
    Health {
        /// Query a running server instead of the local configuration
        #[arg(long)]
        remote: Option<String>,
    },

    /// Show AI engine guides
    Models {
        /// Engine id (chatgpt, gemini, perplexity, claude); lists all if omitted
        id: Option<String>,
    },

    /// Manage explanation prompts
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Show audit module data
    Audit {
        /// Module id (e.g. ai-visibility); shows the summary if omitted
        module: Option<String>,

        /// Directory with <module-id>.json audit documents
        #[arg(long)]
        audit_dir: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Insight type: visibility, comparison or recommendation
    #[arg(short = 't', long = "type")]
    pub insight_type: String,

    /// Brand name
    #[arg(short, long)]
    pub brand: String,

    /// Target AI engine (required for visibility)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Metric name (used by recommendation)
    #[arg(long)]
    pub metric: Option<String>,

    /// Metric value in percent
    #[arg(long)]
    pub value: Option<f64>,

    /// Extra context for the prompt
    #[arg(long)]
    pub context: Option<String>,

    /// Send the request to a running server at this base URL
    #[arg(long, conflicts_with = "offline")]
    pub remote: Option<String>,

    /// Print the fallback explanation without calling the provider
    #[arg(long)]
    pub offline: bool,

    /// Print the raw JSON response
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., explain_visibility, compare_engines)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
