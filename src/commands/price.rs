//! Price command: vision (optional) -> comps -> proposal -> guardrails

use std::path::PathBuf;

use colored::Colorize;
use serde_json::json;

use pricyse::config::Config;
use pricyse::error::{PricyseError, Result};
use pricyse::listing::ListingAttributes;
use pricyse::openai::OpenAiClient;
use pricyse::pricing::{price_listing, PricingOutcome};
use pricyse::vision::{analyze_images, enrich_listing, ImageInput, VisionReport};

/// Listing fields as given on the command line
pub struct PriceArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub condition: Option<String>,
    pub size: Option<String>,
    pub material: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Ask for a title when running interactively without photos
fn resolve_title(title: Option<String>, has_images: bool) -> Result<String> {
    if let Some(title) = trimmed(title) {
        return Ok(title);
    }
    if has_images {
        return Ok(String::new());
    }
    if atty::is(atty::Stream::Stdin) {
        let answer = inquire::Text::new("Listing title:")
            .with_help_message("e.g. Stussy 8 Ball Hoodie")
            .prompt()
            .map_err(|e| PricyseError::InvalidInput(e.to_string()))?;
        if let Some(title) = trimmed(Some(answer)) {
            return Ok(title);
        }
    }
    Err(PricyseError::InvalidInput("title required (or provide images)".into()))
}

fn run_price(args: PriceArgs, images: &[PathBuf]) -> Result<(PricingOutcome, Option<VisionReport>)> {
    let title = resolve_title(args.title, !images.is_empty())?;
    let config = Config::load()?;
    let client = OpenAiClient::from_config(&config.openai)?;

    let mut listing = ListingAttributes {
        title,
        description: trimmed(args.description),
        category: trimmed(args.category).unwrap_or_default(),
        brand: trimmed(args.brand),
        condition: trimmed(args.condition),
        size: trimmed(args.size),
        material: trimmed(args.material),
        vision: None,
    };

    let vision = if images.is_empty() {
        None
    } else {
        let inputs = images
            .iter()
            .map(|p| ImageInput::from_path(p))
            .collect::<Result<Vec<_>>>()?;
        let report = analyze_images(&client, &inputs, listing.description())?;
        listing = enrich_listing(listing, &report);
        Some(report)
    };

    let outcome = price_listing(&listing, &client, &client, &config.pricing)?;
    Ok((outcome, vision))
}

/// Estimate a resale price
pub fn cmd_price(args: PriceArgs, images: Vec<PathBuf>, json: bool) -> Result<()> {
    let result = run_price(args, &images);

    if json {
        let envelope = match &result {
            Ok((outcome, vision)) => json!({
                "success": true,
                "data": {
                    "pricing": outcome.pricing,
                    "comps": outcome.comps,
                    "vision": vision,
                    "usedQuery": outcome.used_query,
                }
            }),
            Err(e) => json!({ "success": false, "message": e.to_string() }),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return result.map(|_| ());
    }

    let (outcome, vision) = result?;
    print_outcome(&outcome, vision.as_ref());
    Ok(())
}

fn print_outcome(outcome: &PricingOutcome, vision: Option<&VisionReport>) {
    let pricing = &outcome.pricing;

    if let Some(report) = vision {
        let attrs = &report.attributes;
        let seen: Vec<&str> = [&attrs.brand, &attrs.category, &attrs.color]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .filter(|v| !v.trim().is_empty())
            .collect();
        if !seen.is_empty() {
            println!("  {} Photos: {}", "✓".green(), seen.join(", "));
        }
    }

    println!();
    println!(
        "  {}   range ${} – ${}   confidence {}%",
        format!("${} {}", pricing.price, pricing.currency).bold(),
        pricing.lower,
        pricing.upper,
        (pricing.confidence * 100.0).round()
    );

    match outcome.comps.as_ref().filter(|_| outcome.has_market_data()) {
        Some(stats) => println!(
            "  {} {} sold comps, median ${}, typical ${}–${}",
            "✓".green(),
            stats.n,
            stats.median,
            stats.p25,
            stats.p75
        ),
        None => println!(
            "  {} {}",
            "!".yellow(),
            "No market data found; estimate is from the model alone".yellow()
        ),
    }

    println!("  {}", format!("Query: {}", outcome.used_query).dimmed());
}
