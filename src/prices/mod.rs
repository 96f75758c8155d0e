//! Historical price data: series, tables and the price source seam

mod series;
pub mod loader;

pub use series::{PricePoint, PriceSeries, PriceTable};
pub use loader::{load_price_table, load_price_table_from_reader, CsvPriceSource};

use crate::error::Result;

/// Supplies adjusted closing prices keyed by symbol
pub trait PriceSource {
    fn load(&self) -> Result<PriceTable>;
}
