//! Collaborator seams: web search for sold comps and model completions.
//!
//! The pipeline only ever sees these traits, so the OpenAI client in
//! [`crate::openai`] can be swapped for fakes in tests.

use serde_json::Value;

use crate::error::{PricyseError, Result};
use crate::listing::{ListingAttributes, PriceProposal};
use crate::stats::CompsStatistics;

/// Answer the search collaborator gives when nothing was found
pub const NO_COMPS_SENTINEL: &str = "NO SOLD COMPS FOUND";

/// Searches resale marketplaces and summarizes sold comps as plain text
pub trait SearchProvider {
    fn comps_summary(&self, query: &str) -> Result<String>;
}

/// What a completion is for; providers pick the model from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Pricing,
    Description,
    Vision,
}

/// One chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub system: String,
    pub user: String,
    /// Image data URLs sent alongside the user text
    pub images: Vec<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask for a bare JSON object
    pub json: bool,
}

/// Runs chat completions and returns the raw assistant text
pub trait CompletionProvider {
    fn complete(&self, prompt: &Prompt) -> Result<String>;
}

const PRICING_SYSTEM_PROMPT: &str = r#"You are a secondhand marketplace pricing engine.
Output ONLY valid JSON:
{ "price": number, "currency": "USD", "confidence": number (0..1), "lower": number, "upper": number }
Rules:
- USD values clamped to 3..2000.
- Ensure lower ≤ price ≤ upper.
- If numeric sold-comps are provided, anchor your estimate to their central tendency (median) and typical range."#;

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("(unknown)")
}

/// Build the price-proposal prompt, anchoring on comps when there are at least two
pub fn pricing_prompt(listing: &ListingAttributes, comps: Option<&CompsStatistics>) -> Prompt {
    let comps_block = match comps.filter(|c| c.n >= 2) {
        Some(stats) => format!(
            "SOLD COMPS STATS (authoritative):\n\
             - median: {} USD\n\
             - typical range (IQR-ish): {}-{} USD\n\
             - n: {}\n\
             (Use this band unless title/condition clearly justify deviation.)",
            stats.median, stats.p25, stats.p75, stats.n
        ),
        None => "(No reliable numeric comps parsed)".to_string(),
    };

    let user = format!(
        "Listing:\n\
         - Title: {}\n\
         - Description: {}\n\
         - Category: {}\n\
         - Brand: {}; Condition: {}; Size: {}; Material: {}\n\n\
         {}\n\n\
         Output: ONLY the JSON object.",
        listing.title,
        listing.description().unwrap_or(""),
        listing.category,
        or_unknown(listing.brand()),
        or_unknown(listing.condition()),
        or_unknown(listing.size()),
        or_unknown(listing.material()),
        comps_block,
    );

    Prompt {
        kind: PromptKind::Pricing,
        system: PRICING_SYSTEM_PROMPT.to_string(),
        user,
        images: Vec::new(),
        temperature: 0.0,
        max_tokens: 220,
        json: true,
    }
}

/// Read a number that models sometimes send as a string ("45", "$45.00")
fn loose_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Parse the model's price proposal. Only `price` is mandatory.
pub fn parse_proposal(text: &str) -> Result<PriceProposal> {
    let json_text = strip_code_fencing(text);
    if json_text.is_empty() {
        return Err(PricyseError::UpstreamUnavailable(
            "Pricing model returned no content".into(),
        ));
    }

    let value: Value = serde_json::from_str(&json_text).map_err(|_| {
        let preview: String = json_text.chars().take(200).collect();
        PricyseError::UpstreamUnavailable(format!("Pricing output was not valid JSON: {}", preview))
    })?;

    let field = |name: &str| value.get(name).and_then(loose_number);
    let price = field("price").ok_or_else(|| {
        PricyseError::UpstreamUnavailable("Pricing output had no numeric price".into())
    })?;

    Ok(PriceProposal {
        price,
        lower: field("lower"),
        upper: field("upper"),
        confidence: field("confidence"),
    })
}

/// Strip markdown code fencing from a string (e.g., ```json ... ```)
/// Also handles cases where there's text before the code block
pub fn strip_code_fencing(s: &str) -> String {
    let trimmed = s.trim();

    // "Here's the estimate:\n```json\n{...}\n```"
    if let Some(json_start) = trimmed.find("```json") {
        let after_fence = &trimmed[json_start + 7..];
        if let Some(end_fence) = after_fence.find("```") {
            return after_fence[..end_fence].trim().to_string();
        }
        return after_fence.trim().to_string();
    }

    if let Some(code_start) = trimmed.find("```") {
        let after_fence = &trimmed[code_start + 3..];
        if let Some(end_fence) = after_fence.find("```") {
            return after_fence[..end_fence].trim().to_string();
        }
        return after_fence.trim().to_string();
    }

    trimmed.to_string()
}
