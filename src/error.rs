use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricyseError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Upstream pricing service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Comps search failed: {0}")]
    SearchFailed(String),

    #[error("OpenAI API key not configured")]
    MissingApiKey,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image error: {0}")]
    ImageError(String),
}

impl PricyseError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PricyseError::HttpError(_) => Some(
                "Check your internet connection, or retry with:\n  pricyse --verbose price \"<title>\""
            ),
            PricyseError::UpstreamUnavailable(_) => Some(
                "The pricing model returned nothing usable. Try again in a moment,\nor check the model names with `pricyse config show`"
            ),
            PricyseError::MissingApiKey => Some(
                "Set OPENAI_API_KEY, or add `api_key` under [openai] in the file shown by `pricyse config path`"
            ),
            PricyseError::ConfigError(_) | PricyseError::TomlError(_) => Some(
                "Check your config file: pricyse config path"
            ),
            PricyseError::InvalidInput(_) => Some(
                "Provide a title, or at least one image:\n  pricyse price \"Stussy hoodie\"\n  pricyse price --image front.jpg"
            ),
            PricyseError::ImageError(_) => Some(
                "Images must be JPEG or PNG files under 4 MB (at most 4 per request)"
            ),
            _ => None,
        }
    }

    /// Wrap any collaborator failure as an upstream outage, keeping existing ones as-is
    pub fn into_upstream(self) -> Self {
        match self {
            PricyseError::UpstreamUnavailable(_) => self,
            other => PricyseError::UpstreamUnavailable(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PricyseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_upstream_wraps_once() {
        let err = PricyseError::SearchFailed("timeout".into()).into_upstream();
        assert!(matches!(err, PricyseError::UpstreamUnavailable(_)));
        assert_eq!(
            err.to_string(),
            "Upstream pricing service unavailable: Comps search failed: timeout"
        );

        let again = err.into_upstream();
        assert_eq!(
            again.to_string(),
            "Upstream pricing service unavailable: Comps search failed: timeout"
        );
    }

    #[test]
    fn test_hints() {
        assert!(PricyseError::MissingApiKey.hint().is_some());
        assert!(PricyseError::InvalidInput("x".into()).hint().is_some());
        assert!(PricyseError::SearchFailed("x".into()).hint().is_none());
    }
}
