//! Offline helpers and description/vision commands: query, comps, describe, vision, config, completions

use std::io::{self, Read};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;

use pricyse::cli::{Cli, CompletionShell};
use pricyse::config::Config;
use pricyse::describe::{tailored_description, DescriptionStyle};
use pricyse::error::{PricyseError, Result};
use pricyse::extract::extract_prices;
use pricyse::listing::{ListingAttributes, VisionAttributes};
use pricyse::openai::OpenAiClient;
use pricyse::query::build_comps_query;
use pricyse::stats::{trim_outliers, CompsStatistics};
use pricyse::vision::{analyze_images, ImageInput};

/// Print the comps query a listing would search with
pub fn cmd_query(
    title: String,
    brand: Option<String>,
    color: Option<String>,
    material: Vec<String>,
    size: Option<String>,
    condition: Option<String>,
) -> Result<()> {
    let vision = if color.is_some() || !material.is_empty() {
        Some(VisionAttributes {
            color,
            materials: material,
            ..Default::default()
        })
    } else {
        None
    };
    let listing = ListingAttributes {
        title,
        brand,
        size,
        condition,
        vision,
        ..Default::default()
    };
    println!("{}", build_comps_query(&listing));
    Ok(())
}

fn read_comps_text(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            if atty::is(atty::Stream::Stdin) {
                return Err(PricyseError::InvalidInput(
                    "pipe comps text on stdin or pass a file".into(),
                ));
            }
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Extract prices and statistics from comps text
pub fn cmd_comps(file: Option<PathBuf>, json: bool) -> Result<()> {
    let config = Config::load()?;
    let text = read_comps_text(file)?;

    let extracted = extract_prices(&text, &config.pricing);
    let used = trim_outliers(&extracted, config.pricing.trim_threshold);
    let stats = CompsStatistics::from_prices(&used);

    if json {
        let output = serde_json::json!({
            "extracted": extracted,
            "used": used,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if extracted.is_empty() {
        println!("{}", "No USD prices found".yellow());
        return Ok(());
    }

    let list = |xs: &[u32]| xs.iter().map(|p| format!("${}", p)).collect::<Vec<_>>().join(", ");
    println!("  Extracted: {}", list(&extracted));
    if used.len() != extracted.len() {
        println!("  {}", format!("Trimmed:   {}", list(&used)).dimmed());
    }
    match stats {
        Some(s) => {
            println!("  Median:    ${}", s.median);
            println!("  Range:     ${}–${} (IQR {})", s.p25, s.p75, s.iqr);
            println!("  Min/Max:   ${} / ${}", s.min, s.max);
            println!("  n:         {}", s.n);
        }
        None => println!("  {}", "Too few prices for statistics".yellow()),
    }
    Ok(())
}

/// Write listing copy
pub fn cmd_describe(title: &str, notes: &str, style: DescriptionStyle) -> Result<()> {
    let config = Config::load()?;
    let client = OpenAiClient::from_config(&config.openai)?;
    let text = tailored_description(&client, title, notes, style)?;
    if text.is_empty() {
        println!("{}", "(the model returned no description)".dimmed());
    } else {
        println!("{}", text);
    }
    Ok(())
}

/// Analyze photos
pub fn cmd_vision(images: Vec<PathBuf>, notes: Option<String>, json: bool) -> Result<()> {
    let config = Config::load()?;
    let client = OpenAiClient::from_config(&config.openai)?;
    let inputs = images
        .iter()
        .map(|p| ImageInput::from_path(p))
        .collect::<Result<Vec<_>>>()?;
    let report = analyze_images(&client, &inputs, notes.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let attrs = &report.attributes;
    let row = |label: &str, value: Option<&str>| {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            println!("  {:<11}{}", format!("{}:", label), v);
        }
    };
    row("Category", attrs.category.as_deref());
    row("Type", attrs.sub_category.as_deref());
    row("Brand", attrs.brand.as_deref());
    row("Color", attrs.color.as_deref());
    row("Pattern", attrs.pattern.as_deref());
    row("Materials", Some(attrs.materials.join(", ").as_str()));
    row("Condition", attrs.visible_condition.as_deref());
    row("Details", Some(attrs.notable_details.join("; ").as_str()));
    println!("\n  {}", report.draft_description);
    println!("  {}", format!("confidence {}%", (report.confidence * 100.0).round()).dimmed());
    Ok(())
}

/// Show the effective configuration
pub fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;
    let content = toml::to_string_pretty(&config.redacted())
        .map_err(|e| PricyseError::ConfigError(e.to_string()))?;
    println!("{}", content);
    Ok(())
}

pub fn cmd_config_path() -> Result<()> {
    let path = Config::config_path()?;
    let status = if path.exists() { "exists".green() } else { "not created".dimmed() };
    println!("{} ({})", path.display(), status);
    Ok(())
}

/// Generate shell completions
pub fn cmd_completions(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::Powershell => Shell::PowerShell,
    };
    generate(shell, &mut cmd, "pricyse", &mut io::stdout());
    Ok(())
}
