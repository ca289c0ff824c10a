//! Robust statistics over extracted comps prices.

use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;

/// Central tendency and spread of the comps that survived trimming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompsStatistics {
    pub median: f64,
    pub p25: u32,
    pub p75: u32,
    /// `p75 - p25`, floored at 1
    pub iqr: u32,
    pub min: u32,
    pub max: u32,
    /// Number of contributing prices
    pub n: usize,
}

impl CompsStatistics {
    /// Compute statistics over prices without trimming. `None` below two prices.
    pub fn from_prices(prices: &[u32]) -> Option<Self> {
        if prices.len() < 2 {
            return None;
        }
        let mut xs = prices.to_vec();
        xs.sort_unstable();

        let n = xs.len();
        let mid = n / 2;
        let median = if n % 2 == 1 {
            f64::from(xs[mid])
        } else {
            (f64::from(xs[mid - 1]) + f64::from(xs[mid])) / 2.0
        };
        // Positional quartiles, not interpolated. The p75 index is floored at
        // `mid` on purpose: plain floor(0.75 * (n - 1)) picks the lower price
        // when n = 2, which would put p75 below the median.
        let p25 = xs[(n - 1) / 4];
        let p75 = xs[((3 * (n - 1)) / 4).max(mid)];

        Some(Self {
            median,
            p25,
            p75,
            iqr: p75.saturating_sub(p25).max(1),
            min: xs[0],
            max: xs[n - 1],
            n,
        })
    }
}

/// Drop the single lowest and highest price once there are at least `threshold` of them
pub fn trim_outliers(prices: &[u32], threshold: usize) -> Vec<u32> {
    let mut xs = prices.to_vec();
    xs.sort_unstable();
    if xs.len() >= threshold && xs.len() >= 3 {
        xs.pop();
        xs.remove(0);
    }
    xs
}

/// Trim outliers, then compute statistics over what is left
pub fn comps_statistics(prices: &[u32], config: &PricingConfig) -> Option<CompsStatistics> {
    CompsStatistics::from_prices(&trim_outliers(prices, config.trim_threshold))
}
