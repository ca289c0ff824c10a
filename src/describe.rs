//! Buyer-friendly listing copy.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{PricyseError, Result};
use crate::provider::{CompletionProvider, Prompt, PromptKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionStyle {
    Minimal,
    #[default]
    Friendly,
    Streetwear,
    Professional,
}

impl DescriptionStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptionStyle::Minimal => "minimal",
            DescriptionStyle::Friendly => "friendly",
            DescriptionStyle::Streetwear => "streetwear",
            DescriptionStyle::Professional => "professional",
        }
    }
}

const DESCRIPTION_SYSTEM_PROMPT: &str = "You are a copywriter for secondhand fashion listings.
Generate a concise buyer-friendly description (3-4 sentences). Add buzzwords like vintage or y2k only when they apply.
No all caps, no hashtags, no unverifiable claims.
Styles: minimal | friendly | streetwear | professional. Default friendly.";

pub fn description_prompt(title: &str, notes: &str, style: DescriptionStyle) -> Prompt {
    Prompt {
        kind: PromptKind::Description,
        system: DESCRIPTION_SYSTEM_PROMPT.to_string(),
        user: format!(
            "Title: {}\nOriginal notes: {}\nStyle: {}\nReturn only the description text.",
            title,
            notes,
            style.as_str()
        ),
        images: Vec::new(),
        temperature: 0.7,
        max_tokens: 160,
        json: false,
    }
}

/// Rewrite seller notes into listing copy. An empty model answer yields an empty string.
pub fn tailored_description(
    completion: &dyn CompletionProvider,
    title: &str,
    notes: &str,
    style: DescriptionStyle,
) -> Result<String> {
    let prompt = description_prompt(title, notes, style);
    match completion.complete(&prompt) {
        Ok(text) => Ok(text.trim().to_string()),
        Err(PricyseError::UpstreamUnavailable(_)) => Ok(String::new()),
        Err(e) => Err(e),
    }
}
