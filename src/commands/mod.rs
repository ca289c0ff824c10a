//! Command implementations for pricyse CLI

mod misc;
mod price;

pub use misc::*;
pub use price::*;
