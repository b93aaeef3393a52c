//! Price data port trait.

use crate::domain::error::TradebenchError;
use crate::domain::price::PriceSeries;

pub trait PriceDataPort {
    /// Load the full daily series for `symbol`, normalized (sorted, deduplicated).
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TradebenchError>;
}
