//! Blocking OpenAI client implementing both collaborator traits.
//!
//! Comps come from the Responses API with a forced `web_search` tool; price
//! proposals, descriptions and vision analysis use chat completions.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::OpenAiConfig;
use crate::error::{PricyseError, Result};
use crate::provider::{CompletionProvider, Prompt, PromptKind, SearchProvider, NO_COMPS_SENTINEL};

/// Marketplaces the web search is restricted to
pub const COMPS_DOMAINS: [&str; 4] = ["grailed.com", "depop.com", "ebay.com", "mercari.com"];

const COMPS_INSTRUCTIONS: &str = "Use web_search with the provided query. Return 3–8 lines ONLY in this format:\n\
- SITE | ITEM | $PRICE | YYYY-MM\n\
Rules: only pages (Grailed/Depop/eBay sold). Each line MUST include a $ price. \
If none are found, output exactly: THERE IS NO MARKET FOR THE PRODUCT.";

const COMPS_MAX_OUTPUT_TOKENS: u32 = 600;

pub struct OpenAiClient {
    agent: ureq::Agent,
    api_key: String,
    project: Option<String>,
    base_url: String,
    search_model: String,
    pricing_model: String,
    description_model: String,
    vision_model: String,
}

impl OpenAiClient {
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(PricyseError::MissingApiKey)?
            .to_string();

        // Reject typos early instead of on the first request
        url::Url::parse(&config.base_url)?;

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Ok(Self {
            agent,
            api_key,
            project: config.project.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_model: config.search_model.clone(),
            pricing_model: config.pricing_model.clone(),
            description_model: config.description_model.clone(),
            vision_model: config.vision_model.clone(),
        })
    }

    fn model_for(&self, kind: PromptKind) -> &str {
        match kind {
            PromptKind::Pricing => &self.pricing_model,
            PromptKind::Description => &self.description_model,
            PromptKind::Vision => &self.vision_model,
        }
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(project) = &self.project {
            request = request.header("OpenAI-Project", project);
        }

        let mut response = request.send_json(body)?;
        Ok(response.body_mut().read_json::<Value>()?)
    }
}

/// Request body for a chat completion
pub fn chat_request_body(model: &str, prompt: &Prompt) -> Value {
    let user_content = if prompt.images.is_empty() {
        Value::String(prompt.user.clone())
    } else {
        let mut parts = vec![json!({ "type": "text", "text": prompt.user })];
        parts.extend(
            prompt
                .images
                .iter()
                .map(|url| json!({ "type": "image_url", "image_url": { "url": url } })),
        );
        Value::Array(parts)
    };

    let mut body = json!({
        "model": model,
        "temperature": prompt.temperature,
        "max_tokens": prompt.max_tokens,
        "messages": [
            { "role": "system", "content": prompt.system },
            { "role": "user", "content": user_content },
        ],
    });
    if prompt.json {
        body["response_format"] = json!({ "type": "json_object" });
    }
    body
}

/// Request body for the comps web search
pub fn comps_request_body(model: &str, query: &str) -> Value {
    json!({
        "model": model,
        "tool_choice": { "type": "web_search" },
        "tools": [{
            "type": "web_search",
            "search_context_size": "high",
            "filters": { "allowed_domains": COMPS_DOMAINS },
        }],
        "instructions": COMPS_INSTRUCTIONS,
        "input": format!(
            "QUERY: {}\nPriority domains: grailed.com, depop.com, ebay.com (sold/completed). Exclude retail.",
            query
        ),
        "max_output_tokens": COMPS_MAX_OUTPUT_TOKENS,
    })
}

/// Assistant text of a chat completion, if any
pub fn chat_content(response: &Value) -> Option<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Output text of a Responses API answer, skipping tool-call items
pub fn responses_output_text(response: &Value) -> Option<String> {
    if let Some(text) = response["output_text"].as_str().map(str::trim).filter(|s| !s.is_empty()) {
        return Some(text.to_string());
    }

    let text = response["output"]
        .as_array()?
        .iter()
        .filter(|item| item["type"] == "message")
        .filter_map(|item| item["content"].as_array())
        .flatten()
        .filter_map(|part| part["text"].as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

impl SearchProvider for OpenAiClient {
    fn comps_summary(&self, query: &str) -> Result<String> {
        let body = comps_request_body(&self.search_model, query);
        let response = self
            .post_json("responses", &body)
            .map_err(|e| PricyseError::SearchFailed(e.to_string()))?;

        match responses_output_text(&response) {
            Some(text) => Ok(text),
            None => {
                warn!(status = ?response["status"], "comps search returned no text");
                Ok(NO_COMPS_SENTINEL.to_string())
            }
        }
    }
}

impl CompletionProvider for OpenAiClient {
    fn complete(&self, prompt: &Prompt) -> Result<String> {
        let model = self.model_for(prompt.kind);
        let body = chat_request_body(model, prompt);
        let response = self.post_json("chat/completions", &body)?;

        match chat_content(&response) {
            Some(content) => Ok(content),
            None => {
                let finish_reason = response["choices"][0]["finish_reason"].as_str().unwrap_or("unknown");
                debug!(model, finish_reason, usage = %response["usage"], "completion returned no content");
                Err(PricyseError::UpstreamUnavailable(format!(
                    "{} returned no content (finish_reason: {})",
                    model, finish_reason
                )))
            }
        }
    }
}
