pub mod cli;
pub mod config;
pub mod describe;
pub mod error;
pub mod extract;
pub mod listing;
pub mod normalize;
pub mod openai;
pub mod pricing;
pub mod provider;
pub mod query;
pub mod stats;
pub mod synth;
pub mod vision;

pub use error::{PricyseError, Result};
pub use listing::{ListingAttributes, PriceProposal, PriceResult, VisionAttributes};
pub use pricing::{price_listing, PricingOutcome};
