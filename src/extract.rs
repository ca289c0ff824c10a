//! Strict USD price extraction from comps text
//!
//! Only two surface forms count as a price: a leading `$` (`$45`, `SOLD $120.00`)
//! or a trailing `USD` (`999 USD`). Bare numbers are never prices, which keeps
//! dates and "90 days" style counts out of the comps.
//!
//! Each form is its own pass; the passes are unioned, deduplicated and sorted.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PricingConfig;

// $123, $ 123.00; a leading zero or a single digit is never a price
static DOLLAR_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\s*([1-9]\d{1,4})(?:\.\d{1,2})?").expect("Invalid dollar price regex")
});

// 123 USD, 123.50usd
static USD_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([1-9]\d{1,4})(?:\.\d{1,2})?\s*USD\b").expect("Invalid USD suffix regex")
});

/// Whole-dollar figures captured by `re`, cents discarded
fn capture_pass(re: &Regex, text: &str) -> Vec<u32> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .collect()
}

/// Figures written with a leading `$`
pub fn dollar_prefixed(text: &str) -> Vec<u32> {
    capture_pass(&DOLLAR_PRICE_RE, text)
}

/// Figures written with a trailing `USD`
pub fn usd_suffixed(text: &str) -> Vec<u32> {
    capture_pass(&USD_SUFFIX_RE, text)
}

/// Extract distinct prices within `[min_usd, max_usd]`, ascending
pub fn extract_prices_in(text: &str, min_usd: u32, max_usd: u32) -> Vec<u32> {
    if text.is_empty() {
        return Vec::new();
    }
    let prices: BTreeSet<u32> = dollar_prefixed(text)
        .into_iter()
        .chain(usd_suffixed(text))
        .filter(|p| (min_usd..=max_usd).contains(p))
        .collect();
    prices.into_iter().collect()
}

/// Extract distinct prices within the configured USD band, ascending
pub fn extract_prices(text: &str, config: &PricingConfig) -> Vec<u32> {
    extract_prices_in(text, config.min_usd, config.max_usd)
}

/// Extract distinct prices within the default 3..=2000 USD band, ascending
pub fn extract_usd_prices(text: &str) -> Vec<u32> {
    extract_prices(text, &PricingConfig::default())
}
