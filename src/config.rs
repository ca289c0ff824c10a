use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PricyseError, Result};

/// Global pricyse configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// OpenAI connection and model selection
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Pricing heuristics (band, trimming, guardrails, prior)
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key. `OPENAI_API_KEY` takes precedence when set.
    pub api_key: Option<String>,
    /// Project id, required for some `sk-proj-` keys
    pub project: Option<String>,
    pub base_url: String,
    /// Model used with the web_search tool to gather sold comps
    pub search_model: String,
    /// Model used in JSON mode for the price proposal
    pub pricing_model: String,
    pub description_model: String,
    pub vision_model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project: None,
            base_url: "https://api.openai.com/v1".to_string(),
            search_model: "gpt-4.1".to_string(),
            pricing_model: "gpt-4o".to_string(),
            description_model: "gpt-4o".to_string(),
            vision_model: "gpt-4o".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Lowest USD figure the pipeline ever reports
pub const MIN_USD: u32 = 3;
/// Highest USD figure the pipeline ever reports
pub const MAX_USD: u32 = 2000;

/// Numeric heuristics of the pricing pipeline.
///
/// Every default mirrors the literal used by the hosted service, so an empty
/// `[pricing]` table prices identically to no config at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Lowest accepted USD figure, inclusive
    pub min_usd: u32,
    /// Highest accepted USD figure, inclusive
    pub max_usd: u32,
    /// Comps count at which the lowest and highest are dropped
    pub trim_threshold: usize,
    /// Below `snap_low * median` the proposal is discarded
    pub snap_low: f64,
    /// Above `snap_high * median` the proposal is discarded
    pub snap_high: f64,
    /// Weight of the model proposal when blending with the median
    pub blend_weight: f64,
    /// Confidence floor after snapping to comps
    pub snap_confidence: f64,
    /// Confidence used when the proposal carries none
    pub default_confidence: f64,
    /// Fallback price for high-demand streetwear hoodies without comps
    pub prior_price: f64,
    /// Proposals at or above this skip the prior
    pub prior_ceiling: f64,
    /// Bounds are widened to at least `prior_price +/- prior_spread`
    pub prior_spread: f64,
    pub prior_confidence: f64,
    /// Lowercase brand names that trigger the prior
    pub prior_brands: Vec<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            min_usd: MIN_USD,
            max_usd: MAX_USD,
            trim_threshold: 4,
            snap_low: 0.6,
            snap_high: 1.4,
            blend_weight: 0.7,
            snap_confidence: 0.7,
            default_confidence: 0.65,
            prior_price: 220.0,
            prior_ceiling: 120.0,
            prior_spread: 40.0,
            prior_confidence: 0.6,
            prior_brands: default_prior_brands(),
        }
    }
}

fn default_prior_brands() -> Vec<String> {
    [
        "gv gallery",
        "gallery dept",
        "aimé leon dore",
        "aime leon dore",
        "our legacy",
        "kapital",
        "needles",
        "represent",
        "stone island",
        "stussy",
        "palace",
        "off-white",
        "yeezy",
        "fear of god",
        "essentials",
    ]
    .iter()
    .map(|b| b.to_string())
    .collect()
}

impl PricingConfig {
    /// Validate that the heuristics are internally consistent
    pub fn validate(&self) -> Result<()> {
        if self.min_usd == 0 || self.min_usd > self.max_usd {
            return Err(PricyseError::ConfigError(format!(
                "pricing band {}..{} is empty or starts at zero",
                self.min_usd, self.max_usd
            )));
        }
        if !(self.snap_low > 0.0 && self.snap_low < 1.0 && self.snap_high > 1.0) {
            return Err(PricyseError::ConfigError(format!(
                "snap thresholds must satisfy 0 < snap_low < 1 < snap_high (got {} / {})",
                self.snap_low, self.snap_high
            )));
        }
        if !(0.0..=1.0).contains(&self.blend_weight) {
            return Err(PricyseError::ConfigError(format!(
                "blend_weight must be within 0..1 (got {})",
                self.blend_weight
            )));
        }
        if self.trim_threshold < 3 {
            return Err(PricyseError::ConfigError(format!(
                "trim_threshold must be at least 3 (got {})",
                self.trim_threshold
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from the default location, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.pricing.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai.api_key = Some(key.trim().to_string());
        }
        if let Some(project) = non_empty("OPENAI_PROJECT_ID") {
            self.openai.project = Some(project);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(model) = non_empty("TEXT_MODEL") {
            self.openai.search_model = model.clone();
            self.openai.description_model = model;
        }
        if let Some(model) = non_empty("VISION_MODEL") {
            self.openai.vision_model = model;
        }
    }

    /// Copy of this config that is safe to print
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.openai.api_key.is_some() {
            copy.openai.api_key = Some("<redacted>".to_string());
        }
        copy
    }

    /// Get the config file path
    ///
    /// Supports PRICYSE_CONFIG environment variable for test isolation
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("PRICYSE_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "pricyse")
            .ok_or_else(|| PricyseError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}
