//! Price synthesis
//!
//! Turns a raw model proposal into a guarded [`PriceResult`]:
//!
//! 1. Clamp price and bounds into the USD band, defaulting missing fields.
//! 2. With comps, snap to the median when the proposal is far off, otherwise
//!    blend toward it and widen the bounds to cover the comps range.
//! 3. Without comps, pull underpriced high-demand streetwear hoodies toward a prior.
//! 4. Repair the bounds if `lower <= price <= upper` no longer holds.

use tracing::debug;

use crate::config::{PricingConfig, MAX_USD, MIN_USD};
use crate::listing::{ListingAttributes, PriceProposal, PriceResult};
use crate::stats::CompsStatistics;

/// `lower` used when the proposal has none: `price - 10`
pub const DEFAULT_LOWER_OFFSET: f64 = 10.0;
/// `upper` used when the proposal has none: `price + 15`
pub const DEFAULT_UPPER_OFFSET: f64 = 15.0;

/// Which guardrail shaped the final price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Proposal was out of band and replaced by the comps median
    Snapped,
    /// Proposal was blended toward the comps median
    Blended,
    /// No comps; pulled toward the streetwear prior
    Prior,
    /// No comps and no prior; clamped proposal kept as-is
    Passthrough,
}

fn clamp_into_band(n: f64, min_usd: u32, max_usd: u32) -> u32 {
    if n.is_nan() {
        return min_usd;
    }
    n.round().clamp(f64::from(min_usd), f64::from(max_usd)) as u32
}

impl PricingConfig {
    /// Round, then clip into the USD band. Non-finite input lands on the nearest edge.
    pub fn clamp_usd(&self, n: f64) -> u32 {
        clamp_into_band(n, self.min_usd, self.max_usd)
    }
}

/// [`PricingConfig::clamp_usd`] with the default 3..=2000 band
pub fn clamp_usd(n: f64) -> u32 {
    clamp_into_band(n, MIN_USD, MAX_USD)
}

fn clamp_confidence(c: f64) -> f64 {
    c.clamp(0.0, 1.0)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Whether the listing looks like a high-demand streetwear hoodie
fn matches_prior(listing: &ListingAttributes, config: &PricingConfig) -> bool {
    let brand_text = format!("{} {}", listing.title, listing.brand().unwrap_or("")).to_lowercase();
    let looks_high_heat = config
        .prior_brands
        .iter()
        .any(|b| brand_text.contains(&b.to_lowercase()));
    let looks_hoodie = format!("{} {}", listing.category, listing.title)
        .to_lowercase()
        .contains("hoodie");
    looks_high_heat && looks_hoodie
}

/// Synthesize the final price, reporting which guardrail applied
pub fn synthesize_with_adjustment(
    listing: &ListingAttributes,
    proposal: &PriceProposal,
    comps: Option<&CompsStatistics>,
    config: &PricingConfig,
) -> (PriceResult, Adjustment) {
    let clamp = |n: f64| config.clamp_usd(n);

    let mut price = clamp(proposal.price);
    let p = f64::from(price);
    let mut lower = clamp(finite(proposal.lower).unwrap_or(p - DEFAULT_LOWER_OFFSET));
    let mut upper = clamp(finite(proposal.upper).unwrap_or(p + DEFAULT_UPPER_OFFSET));
    let mut confidence =
        clamp_confidence(finite(proposal.confidence).unwrap_or(config.default_confidence));

    let adjustment = match comps.filter(|c| c.n >= 2) {
        Some(stats) => {
            let m = stats.median;
            let p25 = f64::from(stats.p25);
            let p75 = f64::from(stats.p75);
            let p = f64::from(price);

            if p < config.snap_low * m || p > config.snap_high * m {
                price = clamp(m);
                lower = clamp(p25.min(m - (0.2 * m).max(10.0)));
                upper = clamp(p75.max(m + (0.25 * m).max(15.0)));
                confidence = confidence.max(config.snap_confidence);
                Adjustment::Snapped
            } else {
                price = clamp(config.blend_weight * p + (1.0 - config.blend_weight) * m);
                lower = clamp(f64::from(lower).min(m.min(p25)));
                upper = clamp(f64::from(upper).max(m.max(p75)));
                Adjustment::Blended
            }
        }
        None => {
            if matches_prior(listing, config) && f64::from(price) < config.prior_ceiling {
                let prior = config.prior_price;
                price = clamp(0.5 * f64::from(price) + 0.5 * prior);
                lower = clamp(f64::from(lower).min(prior - config.prior_spread));
                upper = clamp(f64::from(upper).max(prior + config.prior_spread));
                confidence = confidence.max(config.prior_confidence);
                Adjustment::Prior
            } else {
                Adjustment::Passthrough
            }
        }
    };

    if !(lower <= price && price <= upper) {
        let p = f64::from(price);
        match adjustment {
            Adjustment::Snapped | Adjustment::Blended => {
                lower = clamp((p - 10.0).min(p - 5.0));
                upper = clamp((p + 10.0).max(p + 15.0));
            }
            // Only the violated side moves, so prior widening survives
            Adjustment::Prior | Adjustment::Passthrough => {
                lower = clamp(f64::from(lower).min(p - DEFAULT_LOWER_OFFSET));
                upper = clamp(f64::from(upper).max(p + DEFAULT_UPPER_OFFSET));
            }
        }
    }

    debug!(?adjustment, price, lower, upper, confidence, "synthesized price");
    (
        PriceResult::new(price, lower, upper, clamp_confidence(confidence)),
        adjustment,
    )
}

/// Synthesize the final price from a model proposal and optional comps
pub fn synthesize(
    listing: &ListingAttributes,
    proposal: &PriceProposal,
    comps: Option<&CompsStatistics>,
    config: &PricingConfig,
) -> PriceResult {
    synthesize_with_adjustment(listing, proposal, comps, config).0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(prices: &[u32]) -> CompsStatistics {
        CompsStatistics::from_prices(prices).unwrap()
    }

    fn plain_listing() -> ListingAttributes {
        ListingAttributes::new("Uniqlo crew neck", "tops")
    }

    #[test]
    fn test_clamp_usd() {
        assert_eq!(clamp_usd(-50.0), 3);
        assert_eq!(clamp_usd(2.4), 3);
        assert_eq!(clamp_usd(44.5), 45);
        assert_eq!(clamp_usd(99.49), 99);
        assert_eq!(clamp_usd(1e9), 2000);
        assert_eq!(clamp_usd(f64::NAN), 3);
        assert_eq!(clamp_usd(f64::INFINITY), 2000);
        assert_eq!(clamp_usd(f64::NEG_INFINITY), 3);
    }

    #[test]
    fn test_clamp_usd_idempotent() {
        let mut n = -100.0;
        while n < 2200.0 {
            let once = clamp_usd(n);
            assert_eq!(clamp_usd(f64::from(once)), once);
            assert!((3..=2000).contains(&once));
            n += 0.37;
        }
    }

    #[test]
    fn test_config_clamp_matches_default() {
        let config = PricingConfig::default();
        for n in [-1.0, 0.0, 3.5, 120.2, 1999.6, 5000.0, f64::NAN] {
            assert_eq!(config.clamp_usd(n), clamp_usd(n));
        }
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let config = PricingConfig::default();
        let result = synthesize(&plain_listing(), &PriceProposal::new(40.0), None, &config);
        assert_eq!(result, PriceResult::new(40, 30, 55, 0.65));
    }

    #[test]
    fn test_proposal_is_clamped() {
        let config = PricingConfig::default();
        let proposal = PriceProposal {
            price: 5000.0,
            lower: Some(-20.0),
            upper: Some(9000.0),
            confidence: Some(3.0),
        };
        let result = synthesize(&plain_listing(), &proposal, None, &config);
        assert_eq!(result, PriceResult::new(2000, 3, 2000, 1.0));
    }

    #[test]
    fn test_snap_when_too_low() {
        let config = PricingConfig::default();
        let comps = stats(&[120, 140, 150, 160, 180]);
        assert_eq!(comps.median, 150.0);

        let (result, adjustment) = synthesize_with_adjustment(
            &plain_listing(),
            &PriceProposal::new(50.0),
            Some(&comps),
            &config,
        );
        assert_eq!(adjustment, Adjustment::Snapped);
        assert_eq!(result.price, 150);
        // min(p25=140, 150 - 30), max(p75=160, 150 + 37.5)
        assert_eq!(result.lower, 120);
        assert_eq!(result.upper, 188);
        assert!(result.confidence >= 0.7);
    }

    #[test]
    fn test_snap_when_too_high() {
        let config = PricingConfig::default();
        let comps = stats(&[40, 50, 60]);
        let (result, adjustment) = synthesize_with_adjustment(
            &plain_listing(),
            &PriceProposal::new(90.0),
            Some(&comps),
            &config,
        );
        assert_eq!(adjustment, Adjustment::Snapped);
        assert_eq!(result.price, 50);
        assert_eq!(result.lower, 40);
        assert_eq!(result.upper, 65);
    }

    #[test]
    fn test_blend_within_band() {
        let config = PricingConfig::default();
        let comps = stats(&[80, 100, 120]);
        let proposal = PriceProposal {
            price: 110.0,
            lower: Some(95.0),
            upper: Some(115.0),
            confidence: Some(0.5),
        };
        let (result, adjustment) =
            synthesize_with_adjustment(&plain_listing(), &proposal, Some(&comps), &config);
        assert_eq!(adjustment, Adjustment::Blended);
        // 0.7 * 110 + 0.3 * 100
        assert_eq!(result.price, 107);
        assert_eq!(result.lower, 80);
        assert_eq!(result.upper, 115);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_repair_inverted_bounds() {
        let config = PricingConfig::default();
        let proposal = PriceProposal {
            price: 100.0,
            lower: Some(150.0),
            upper: Some(60.0),
            confidence: None,
        };
        let result = synthesize(&plain_listing(), &proposal, None, &config);
        assert_eq!(result, PriceResult::new(100, 90, 115, 0.65));
    }

    #[test]
    fn test_prior_for_streetwear_hoodie() {
        let config = PricingConfig::default();
        let listing = ListingAttributes::new("Basic logo pullover", "hoodie").with_brand("Stussy");
        let (result, adjustment) =
            synthesize_with_adjustment(&listing, &PriceProposal::new(60.0), None, &config);
        assert_eq!(adjustment, Adjustment::Prior);
        assert_eq!(result.price, 140);
        assert!(result.lower <= 180);
        assert!(result.upper >= 260);
        assert!(result.confidence >= 0.6);
    }

    #[test]
    fn test_prior_keeps_widened_upper_when_lower_too_high() {
        let config = PricingConfig::default();
        let listing = ListingAttributes::new("Stussy 8 Ball Hoodie", "hoodie").with_brand("Stussy");
        let proposal = PriceProposal {
            price: 60.0,
            lower: Some(175.0),
            upper: None,
            confidence: None,
        };
        let (result, adjustment) = synthesize_with_adjustment(&listing, &proposal, None, &config);
        assert_eq!(adjustment, Adjustment::Prior);
        assert_eq!(result.price, 140);
        // min(175, 180) repaired down to 130, upper stays at prior + 40
        assert_eq!(result.lower, 130);
        assert_eq!(result.upper, 260);
    }

    #[test]
    fn test_prior_requires_brand_and_hoodie() {
        let config = PricingConfig::default();
        let not_hoodie = ListingAttributes::new("Stussy tee", "t-shirt");
        let (_, adjustment) =
            synthesize_with_adjustment(&not_hoodie, &PriceProposal::new(60.0), None, &config);
        assert_eq!(adjustment, Adjustment::Passthrough);

        let unknown_brand = ListingAttributes::new("Gildan hoodie", "tops");
        let (_, adjustment) =
            synthesize_with_adjustment(&unknown_brand, &PriceProposal::new(60.0), None, &config);
        assert_eq!(adjustment, Adjustment::Passthrough);

        let brand_in_title = ListingAttributes::new("Aimé Leon Dore Hoodie", "tops");
        let (_, adjustment) =
            synthesize_with_adjustment(&brand_in_title, &PriceProposal::new(60.0), None, &config);
        assert_eq!(adjustment, Adjustment::Prior);
    }

    #[test]
    fn test_prior_skipped_when_already_priced() {
        let config = PricingConfig::default();
        let listing = ListingAttributes::new("Palace hoodie", "hoodie");
        let result = synthesize(&listing, &PriceProposal::new(150.0), None, &config);
        assert_eq!(result, PriceResult::new(150, 140, 165, 0.65));
    }

    #[test]
    fn test_invariants_hold_across_inputs() {
        let config = PricingConfig::default();
        let comps_sets: Vec<Option<CompsStatistics>> = vec![
            None,
            Some(stats(&[3, 4])),
            Some(stats(&[1990, 2000])),
            Some(stats(&[20, 45, 50, 55, 300])),
        ];
        let listing = ListingAttributes::new("Stone Island hoodie", "hoodie");
        for comps in &comps_sets {
            for price in [-10.0, 0.0, 3.0, 25.0, 80.0, 119.0, 500.0, 2500.0] {
                for lower in [None, Some(-5.0), Some(1.0), Some(700.0), Some(f64::NAN)] {
                    for upper in [None, Some(2.0), Some(90.0), Some(5000.0)] {
                        let proposal = PriceProposal {
                            price,
                            lower,
                            upper,
                            confidence: Some(-0.3),
                        };
                        let result = synthesize(&listing, &proposal, comps.as_ref(), &config);
                        assert!(result.is_valid(3, 2000), "{:?} -> {:?}", proposal, result);
                    }
                }
            }
        }
    }
}
