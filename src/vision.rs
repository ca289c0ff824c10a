//! Photo analysis for listings
//!
//! Sends up to four JPEG/PNG photos to the vision model and reads back the
//! garment attributes plus a short draft description. The attributes can then
//! enrich a [`ListingAttributes`] before pricing.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PricyseError, Result};
use crate::listing::{non_blank, ListingAttributes, VisionAttributes};
use crate::provider::{strip_code_fencing, CompletionProvider, Prompt, PromptKind};

/// Photos beyond this are ignored
pub const MAX_IMAGES: usize = 4;
/// Largest accepted photo, in bytes
pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;
/// Longest accepted free-text notes
pub const MAX_NOTES_CHARS: usize = 600;

const VISION_SYSTEM_PROMPT: &str = r#"You are a fashion listing assistant.
Return ONLY valid JSON with this shape:
{
  "attributes": {
    "category": string,
    "subCategory": string,
    "brand": string,
    "color": string,
    "pattern": string,
    "materials": string[],
    "visibleCondition": string,
    "notableDetails": string[]
  },
  "draftDescription": string,
  "confidence": number
}
Rules:
- If color/materials can be seen, DO NOT leave them blank (e.g., color "heather gray", materials ["cotton","polyester"]).
- Materials: prefer garment fiber/fabric (cotton, polyester, fleece, wool, denim, nylon, leather, suede).
- If unsure, use an empty string/array (no hallucination)."#;

/// One photo, ready to send as a data URL
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub data_url: String,
}

impl ImageInput {
    /// Encode raw bytes; anything not PNG is sent as JPEG
    pub fn from_bytes(bytes: &[u8], mime: &str) -> Result<Self> {
        if bytes.is_empty() {
            return Err(PricyseError::ImageError("image is empty".into()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(PricyseError::ImageError(format!(
                "image is {} bytes, limit is {}",
                bytes.len(),
                MAX_IMAGE_BYTES
            )));
        }
        let prefix = if mime == "image/png" {
            "data:image/png;base64,"
        } else {
            "data:image/jpeg;base64,"
        };
        Ok(Self {
            data_url: format!("{}{}", prefix, STANDARD.encode(bytes)),
        })
    }

    /// Read a JPEG or PNG file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let mime = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            _ => {
                return Err(PricyseError::ImageError(format!(
                    "{} is not a JPEG or PNG file",
                    path.display()
                )))
            }
        };
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, mime)
    }
}

/// What the vision model saw in the photos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionReport {
    pub attributes: VisionAttributes,
    pub draft_description: String,
    pub confidence: f64,
}

impl VisionReport {
    fn validate(self) -> Result<Self> {
        let len = self.draft_description.chars().count();
        if !(8..=280).contains(&len) {
            return Err(PricyseError::UpstreamUnavailable(format!(
                "Vision draft description has {} characters (expected 8..=280)",
                len
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(PricyseError::UpstreamUnavailable(format!(
                "Vision confidence {} is outside 0..1",
                self.confidence
            )));
        }
        Ok(self)
    }
}

/// Build the vision prompt for already-encoded photos
pub fn vision_prompt(images: &[ImageInput], notes: Option<&str>) -> Prompt {
    let user = format!(
        "Notes (optional): {}\n\nOutput ONLY the JSON object (no prose). If unknown, use empty string or empty array.",
        non_blank(notes).unwrap_or("(none)")
    );
    Prompt {
        kind: PromptKind::Vision,
        system: VISION_SYSTEM_PROMPT.to_string(),
        user,
        images: images.iter().take(MAX_IMAGES).map(|i| i.data_url.clone()).collect(),
        temperature: 0.0,
        max_tokens: 500,
        json: true,
    }
}

/// Parse and validate the vision model's answer
pub fn parse_vision_report(text: &str) -> Result<VisionReport> {
    let json_text = strip_code_fencing(text);
    if json_text.is_empty() {
        return Err(PricyseError::UpstreamUnavailable(
            "Vision model returned no textual JSON content".into(),
        ));
    }
    let report: VisionReport = serde_json::from_str(&json_text).map_err(|e| {
        PricyseError::UpstreamUnavailable(format!("Vision output was not valid JSON: {}", e))
    })?;
    report.validate()
}

/// Analyze listing photos
pub fn analyze_images(
    completion: &dyn CompletionProvider,
    images: &[ImageInput],
    notes: Option<&str>,
) -> Result<VisionReport> {
    if images.is_empty() {
        return Err(PricyseError::InvalidInput("At least one image required".into()));
    }
    if notes.map_or(0, |n| n.chars().count()) > MAX_NOTES_CHARS {
        return Err(PricyseError::InvalidInput(format!(
            "notes are limited to {} characters",
            MAX_NOTES_CHARS
        )));
    }
    if images.len() > MAX_IMAGES {
        debug!(given = images.len(), used = MAX_IMAGES, "extra images ignored");
    }

    let prompt = vision_prompt(images, notes);
    let raw = completion.complete(&prompt).map_err(|e| e.into_upstream())?;
    parse_vision_report(&raw)
}

/// Fill gaps in a listing from what the photos showed. User-provided fields win.
pub fn enrich_listing(mut listing: ListingAttributes, report: &VisionReport) -> ListingAttributes {
    let attrs = &report.attributes;
    let owned = |v: Option<&str>| non_blank(v).map(str::to_string);

    if listing.description().is_none() {
        listing.description = owned(Some(report.draft_description.as_str()));
    }
    if listing.category.trim().is_empty() {
        listing.category = owned(attrs.category.as_deref()).unwrap_or_default();
    }
    if listing.brand().is_none() {
        listing.brand = owned(attrs.brand.as_deref());
    }
    if listing.condition().is_none() {
        listing.condition = owned(attrs.visible_condition.as_deref());
    }
    if listing.material().is_none() && !attrs.materials.is_empty() {
        listing.material = Some(attrs.materials.join(", "));
    }
    listing.vision = Some(attrs.clone());
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(&'static str);

    impl CompletionProvider for Canned {
        fn complete(&self, prompt: &Prompt) -> Result<String> {
            assert_eq!(prompt.kind, PromptKind::Vision);
            Ok(self.0.to_string())
        }
    }

    const REPORT: &str = r#"{
        "attributes": {
            "category": "hoodie",
            "subCategory": "pullover",
            "brand": "Stussy",
            "color": "Heather Grey",
            "materials": ["Cotton", "Polyester"],
            "visibleCondition": "gently used",
            "notableDetails": ["embroidered logo"]
        },
        "draftDescription": "Gray Stussy pullover hoodie with embroidered logo.",
        "confidence": 0.82
    }"#;

    fn image() -> ImageInput {
        ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "image/jpeg").unwrap()
    }

    #[test]
    fn test_image_data_urls() {
        let png = ImageInput::from_bytes(b"png", "image/png").unwrap();
        assert_eq!(png.data_url, "data:image/png;base64,cG5n");
        assert!(image().data_url.starts_with("data:image/jpeg;base64,"));
        assert!(ImageInput::from_bytes(&[], "image/png").is_err());
    }

    #[test]
    fn test_image_size_limit() {
        let at_limit = vec![0u8; MAX_IMAGE_BYTES];
        assert!(ImageInput::from_bytes(&at_limit, "image/jpeg").is_ok());

        let over = vec![0u8; 4 * 1024 * 1024 + 1];
        let err = ImageInput::from_bytes(&over, "image/jpeg").unwrap_err();
        assert!(matches!(err, PricyseError::ImageError(_)));
    }

    #[test]
    fn test_from_path_rejects_other_formats() {
        let err = ImageInput::from_path(Path::new("photo.gif")).unwrap_err();
        assert!(matches!(err, PricyseError::ImageError(_)));
    }

    #[test]
    fn test_prompt_caps_images() {
        let images = vec![image(); 6];
        let prompt = vision_prompt(&images, None);
        assert_eq!(prompt.images.len(), MAX_IMAGES);
        assert!(prompt.user.starts_with("Notes (optional): (none)"));
    }

    #[test]
    fn test_analyze_images() {
        let report = analyze_images(&Canned(REPORT), &[image()], Some("worn twice")).unwrap();
        assert_eq!(report.attributes.brand.as_deref(), Some("Stussy"));
        assert_eq!(report.attributes.materials, vec!["Cotton", "Polyester"]);
        assert_eq!(report.confidence, 0.82);
    }

    #[test]
    fn test_analyze_requires_images() {
        let err = analyze_images(&Canned(REPORT), &[], None).unwrap_err();
        assert!(matches!(err, PricyseError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_reports() {
        assert!(parse_vision_report("").is_err());
        assert!(parse_vision_report("not json").is_err());
        let short = r#"{"attributes": {}, "draftDescription": "ok", "confidence": 0.5}"#;
        assert!(parse_vision_report(short).is_err());
        let bad_conf = r#"{"attributes": {}, "draftDescription": "A fine jacket", "confidence": 4}"#;
        assert!(parse_vision_report(bad_conf).is_err());
    }

    #[test]
    fn test_enrich_listing_fills_gaps_only() {
        let report = parse_vision_report(REPORT).unwrap();
        let listing = ListingAttributes::new("Stussy 8 Ball hoodie", "").with_condition("like new");
        let enriched = enrich_listing(listing, &report);

        assert_eq!(enriched.category, "hoodie");
        assert_eq!(enriched.brand.as_deref(), Some("Stussy"));
        assert_eq!(enriched.condition.as_deref(), Some("like new"));
        assert_eq!(enriched.material.as_deref(), Some("Cotton, Polyester"));
        assert_eq!(
            enriched.description.as_deref(),
            Some("Gray Stussy pullover hoodie with embroidered logo.")
        );
        assert_eq!(enriched.vision.unwrap().color.as_deref(), Some("Heather Grey"));
    }
}
