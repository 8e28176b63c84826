//! AI engine guide commands

use anyhow::{bail, Result};

use kasparro_core::{AiEngine, EngineCatalog};

use super::truncate;

/// List all engine guides
pub fn cmd_models_list(catalog: &EngineCatalog) -> Result<()> {
    println!("AI Engines:\n");
    println!("{:<12} {:<12} {}", "ID", "NAME", "DESCRIPTION");
    println!("{}", "-".repeat(80));

    for entry in catalog.guides() {
        println!(
            "{:<12} {:<12} {}",
            entry.id,
            entry.guide.name,
            truncate(&entry.guide.description, 54)
        );
    }

    println!();
    println!("Run 'kasparro models <id>' for details and optimization tips.");
    Ok(())
}

/// Show one engine guide
pub fn cmd_models_show(catalog: &EngineCatalog, id: &str) -> Result<()> {
    let Some(engine) = AiEngine::parse(id) else {
        let known: Vec<&str> = AiEngine::all().iter().map(|e| e.as_str()).collect();
        bail!("Unknown model '{}'. Known models: {}", id, known.join(", "));
    };
    let Some(guide) = catalog.guide(engine) else {
        bail!("No guide available for {}", engine);
    };

    println!("{} ({})", guide.name, engine);
    println!("{}", guide.description);
    println!();
    println!("How it works:");
    println!("  {}", guide.how_it_works);
    println!();
    println!("Example:");
    println!("  Query:    {}", guide.example.query);
    println!("  Behavior: {}", guide.example.behavior);

    if !guide.optimization_tips.is_empty() {
        println!();
        println!("Optimization tips:");
        for tip in &guide.optimization_tips {
            println!("  • {}", tip);
        }
    }

    if let Some(profile) = catalog.profile(engine) {
        println!();
        println!("Profile:");
        println!("  Data source:      {}", profile.data_source);
        println!("  Citation style:   {}", profile.citation_style);
        println!("  Brand preference: {}", profile.brand_preference);
    }

    Ok(())
}
