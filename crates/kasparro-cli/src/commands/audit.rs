//! Audit command implementations

use anyhow::{Context, Result};

use kasparro_core::audit::{InsightType, Level, ScoreTrend};
use kasparro_core::{AuditStore, ModuleId};

/// Show the score overview for all modules
pub fn cmd_audit_summary(store: &AuditStore) -> Result<()> {
    println!("📊 Audit Summary\n");
    println!(
        "{:<22} {:>5}  {:<10} {:<7} {:>8} {:>11}",
        "MODULE", "SCORE", "LEVEL", "TREND", "CRITICAL", "HIGH ISSUES"
    );
    println!("{}", "-".repeat(70));

    for row in store.summary() {
        println!(
            "{:<22} {:>5}  {:<10} {:<7} {:>8} {:>11}",
            row.name,
            row.overall_score,
            row.level.as_str(),
            trend_label(row.score_trend),
            row.critical_insights,
            row.high_severity_issues
        );
    }

    if let Some(dir) = store.source() {
        println!();
        println!("Source: {}", dir.display());
    }
    Ok(())
}

/// Show one module's insights, issues and recommendations
pub fn cmd_audit_show(store: &AuditStore, module: &str) -> Result<()> {
    let id: ModuleId = module.parse()?;
    let data = store
        .get(id)
        .with_context(|| format!("No audit data for {}", id))?;
    let name = store
        .modules()
        .iter()
        .find(|m| m.id == id)
        .map(|m| m.name.as_str())
        .unwrap_or(id.as_str());

    println!("📋 {} ({})", name, id);
    println!(
        "   Score: {} ({}, {})",
        data.overall_score,
        data.score_level().as_str(),
        trend_label(data.score_trend)
    );
    println!("   Audited: {}", data.timestamp.format("%Y-%m-%d %H:%M UTC"));

    if !data.insights.is_empty() {
        println!("\nInsights:");
        for insight in &data.insights {
            let icon = match insight.kind {
                InsightType::Success => "✅",
                InsightType::Warning => "⚠️ ",
                InsightType::Critical => "🚨",
            };
            println!("  {} {}", icon, insight.title);
            println!("     {}", insight.description);
        }
    }

    if !data.issues.is_empty() {
        println!("\nIssues:");
        for issue in &data.issues {
            println!(
                "  [{}] {} ({})",
                level_label(issue.severity),
                issue.message,
                issue.id
            );
            println!("     Impact: {}", issue.impact);
        }
    }

    if !data.recommendations.is_empty() {
        println!("\nRecommendations:");
        for rec in &data.recommendations {
            println!(
                "  → {} (effort: {}, impact: {})",
                rec.title,
                level_label(rec.effort),
                level_label(rec.impact)
            );
            println!("     {}", rec.action);
        }
    }

    Ok(())
}

fn trend_label(trend: ScoreTrend) -> &'static str {
    match trend {
        ScoreTrend::Up => "up",
        ScoreTrend::Down => "down",
        ScoreTrend::Stable => "stable",
    }
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Low => "low",
        Level::Medium => "medium",
        Level::High => "high",
    }
}
