//! Comps query construction
//!
//! Builds the single search string handed to the web-search collaborator. The
//! output only depends on the listing, so the same listing always yields the
//! same query.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::listing::ListingAttributes;
use crate::normalize::{normalize_color, normalize_materials, quote, sanitize_title};

/// Terms appended to every query to bias results toward resale marketplaces
pub const BIAS_TERMS: [&str; 4] = ["sold", "Grailed", "Depop", "eBay"];

// Generic garment words dropped from the alternate title to broaden recall
static GENERIC_GARMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(zip[-\s]?up|hoodie|sneakers?)\b").expect("Invalid garment regex pattern")
});

/// Build the comps search query for a listing
pub fn build_comps_query(listing: &ListingAttributes) -> String {
    let clean_title = sanitize_title(&listing.title);
    let alt_title = GENERIC_GARMENT_RE.replace_all(&clean_title, "");

    let vision = listing.vision.as_ref();
    let color = vision
        .and_then(|v| v.color.as_deref())
        .map(normalize_color)
        .unwrap_or_default();
    let materials = vision
        .map(|v| normalize_materials(&v.materials))
        .unwrap_or_default();

    let mut bits = vec![
        quote(&clean_title),
        quote(&alt_title),
        listing.brand().map(quote).unwrap_or_default(),
        quote(&color),
        quote(&materials.iter().take(2).cloned().collect::<Vec<_>>().join(" ")),
        listing.size().map(quote).unwrap_or_default(),
        listing.condition().map(quote).unwrap_or_default(),
    ];
    bits.extend(BIAS_TERMS.iter().map(|t| t.to_string()));

    let mut seen: Vec<String> = Vec::with_capacity(bits.len());
    for bit in bits {
        if !bit.is_empty() && !seen.contains(&bit) {
            seen.push(bit);
        }
    }
    seen.join(" ")
}
