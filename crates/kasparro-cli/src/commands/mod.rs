//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `audit` - Audit module summary and detail
//! - `explain` - Explanation generation (local, remote, offline) and health
//! - `models` - AI engine guides
//! - `prompts` - Prompt library management commands
//! - `serve` - Web server command

pub mod audit;
pub mod explain;
pub mod models;
pub mod prompts;
pub mod serve;

// Re-export command functions for main.rs
pub use audit::*;
pub use explain::*;
pub use models::*;
pub use prompts::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
