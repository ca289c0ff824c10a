//! Listing and pricing data model shared by the pipeline stages.

use serde::{Deserialize, Serialize};

/// Attributes inferred from listing photos by the vision model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisionAttributes {
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub pattern: Option<String>,
    pub materials: Vec<String>,
    pub visible_condition: Option<String>,
    pub notable_details: Vec<String>,
}

/// Everything known about one listing at pricing time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAttributes {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub vision: Option<VisionAttributes>,
}

impl ListingAttributes {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_vision(mut self, vision: VisionAttributes) -> Self {
        self.vision = Some(vision);
        self
    }

    /// Brand, ignoring blank values
    pub fn brand(&self) -> Option<&str> {
        non_blank(self.brand.as_deref())
    }

    pub fn condition(&self) -> Option<&str> {
        non_blank(self.condition.as_deref())
    }

    pub fn size(&self) -> Option<&str> {
        non_blank(self.size.as_deref())
    }

    pub fn material(&self) -> Option<&str> {
        non_blank(self.material.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Raw price proposal from the completion model, before any guardrails.
///
/// Only `price` is required; the other fields are defaulted by the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceProposal {
    pub price: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub confidence: Option<f64>,
}

impl PriceProposal {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            lower: None,
            upper: None,
            confidence: None,
        }
    }
}

/// Final price estimate. Always satisfies `lower <= price <= upper` within the USD band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    pub price: u32,
    pub lower: u32,
    pub upper: u32,
    pub currency: String,
    pub confidence: f64,
}

pub const CURRENCY: &str = "USD";

impl PriceResult {
    pub fn new(price: u32, lower: u32, upper: u32, confidence: f64) -> Self {
        Self {
            price,
            lower,
            upper,
            currency: CURRENCY.to_string(),
            confidence,
        }
    }

    /// Check the result invariants against a USD band
    pub fn is_valid(&self, min_usd: u32, max_usd: u32) -> bool {
        min_usd <= self.lower
            && self.lower <= self.price
            && self.price <= self.upper
            && self.upper <= max_usd
            && self.currency == CURRENCY
            && (0.0..=1.0).contains(&self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_absent() {
        let listing = ListingAttributes::new("Hoodie", "tops").with_brand("   ");
        assert_eq!(listing.brand(), None);
        assert_eq!(listing.size(), None);

        let listing = listing.with_size(" M ");
        assert_eq!(listing.size(), Some("M"));
    }

    #[test]
    fn test_vision_attributes_camel_case() {
        let json = r#"{
            "category": "tops",
            "subCategory": "hoodie",
            "materials": ["Cotton"],
            "visibleCondition": "good"
        }"#;
        let attrs: VisionAttributes = serde_json::from_str(json).unwrap();
        assert_eq!(attrs.sub_category.as_deref(), Some("hoodie"));
        assert_eq!(attrs.visible_condition.as_deref(), Some("good"));
        assert_eq!(attrs.materials, vec!["Cotton"]);
        assert!(attrs.notable_details.is_empty());
    }

    #[test]
    fn test_price_result_validity() {
        assert!(PriceResult::new(50, 40, 65, 0.6).is_valid(3, 2000));
        assert!(!PriceResult::new(50, 60, 65, 0.6).is_valid(3, 2000));
        assert!(!PriceResult::new(50, 40, 65, 1.2).is_valid(3, 2000));
        assert!(!PriceResult::new(2, 2, 5, 0.5).is_valid(3, 2000));
    }
}
