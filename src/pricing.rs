//! End-to-end pricing for one listing.
//!
//! query -> search -> extract -> trim + stats -> proposal -> synthesize.
//! A failed search degrades to "no comps"; a failed proposal is an upstream outage.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PricingConfig;
use crate::error::Result;
use crate::extract::extract_prices;
use crate::listing::{ListingAttributes, PriceResult};
use crate::provider::{parse_proposal, pricing_prompt, CompletionProvider, SearchProvider, NO_COMPS_SENTINEL};
use crate::query::build_comps_query;
use crate::stats::{comps_statistics, trim_outliers, CompsStatistics};
use crate::synth::{synthesize_with_adjustment, Adjustment};

/// Lines of raw comps text echoed to the debug log
const COMPS_PREVIEW_LINES: usize = 6;

/// Everything a pricing run produced, for display and debugging
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingOutcome {
    pub pricing: PriceResult,
    pub used_query: String,
    /// Statistics over the trimmed comps, `None` when no market was found
    pub comps: Option<CompsStatistics>,
    /// Comps prices that fed the statistics
    pub comp_prices: Vec<u32>,
    #[serde(skip)]
    pub adjustment: Adjustment,
}

impl PricingOutcome {
    /// Whether any usable sold comps backed the estimate
    pub fn has_market_data(&self) -> bool {
        self.comps.as_ref().map_or(false, |c| c.n >= 2)
    }
}

/// Price a listing with the given collaborators
pub fn price_listing(
    listing: &ListingAttributes,
    search: &dyn SearchProvider,
    completion: &dyn CompletionProvider,
    config: &PricingConfig,
) -> Result<PricingOutcome> {
    let query = build_comps_query(listing);
    info!(query = %query, "comps query");

    let comps_text = match search.comps_summary(&query) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => NO_COMPS_SENTINEL.to_string(),
        Err(e) => {
            warn!(error = %e, "comps search failed, pricing without market data");
            NO_COMPS_SENTINEL.to_string()
        }
    };
    debug!(
        preview = %comps_text.lines().take(COMPS_PREVIEW_LINES).collect::<Vec<_>>().join("\n"),
        "comps raw"
    );

    let extracted = extract_prices(&comps_text, config);
    let comp_prices = trim_outliers(&extracted, config.trim_threshold);
    let comps = comps_statistics(&extracted, config);
    debug!(extracted = extracted.len(), used = comp_prices.len(), stats = ?comps, "comps statistics");

    let prompt = pricing_prompt(listing, comps.as_ref());
    let raw = completion.complete(&prompt).map_err(|e| e.into_upstream())?;
    let proposal = parse_proposal(&raw)?;
    debug!(?proposal, "model proposal");

    let (pricing, adjustment) = synthesize_with_adjustment(listing, &proposal, comps.as_ref(), config);
    debug_assert!(
        pricing.is_valid(config.min_usd, config.max_usd),
        "synthesized price violates invariants: {:?}",
        pricing
    );
    info!(price = pricing.price, lower = pricing.lower, upper = pricing.upper, ?adjustment, "priced listing");

    Ok(PricingOutcome {
        pricing,
        used_query: query,
        comps,
        comp_prices,
        adjustment,
    })
}
