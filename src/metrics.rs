//! Summary statistics for a historical price series
//!
//! Every function here is total: inputs that cannot produce a meaningful
//! number (too few points, zero volatility) yield `None` rather than an error.
//! Missing prices are always dropped before computing.

use crate::prices::{PriceSeries, PriceTable};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Trading days per year used to annualize daily volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Average calendar days per year used for elapsed time
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Compound annual growth rate between the first and last valid price
///
/// Elapsed time is calendar days / 365.25.
pub fn cagr(series: &PriceSeries) -> Option<f64> {
    if series.valid_count() < 2 {
        return None;
    }

    let (start_date, start_price) = series.first_valid()?;
    let (end_date, end_price) = series.last_valid()?;

    let years = (end_date - start_date).num_days() as f64 / DAYS_PER_YEAR;
    if start_price <= 0.0 || years <= 0.0 {
        return None;
    }

    Some((end_price / start_price).powf(1.0 / years) - 1.0)
}

/// Simple period-over-period returns of the valid prices
fn period_returns(series: &PriceSeries) -> Vec<f64> {
    series
        .valid_prices()
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Sample standard deviation (n - 1 denominator)
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Annualized volatility: standard deviation of daily returns scaled by √252
///
/// `None` when no returns remain. A single return has no sample deviation
/// either, so it is also `None`.
pub fn ann_vol(series: &PriceSeries) -> Option<f64> {
    let returns = period_returns(series);
    if returns.is_empty() {
        return None;
    }
    sample_std(&returns).map(|std| std * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Worst peak-to-trough decline as a negative fraction (0 if never below peak)
pub fn max_drawdown(series: &PriceSeries) -> Option<f64> {
    let mut prices = series.valid().map(|(_, price)| price);
    let first = prices.next()?;

    let mut running_max = first;
    let mut worst = 0.0_f64;
    for price in prices {
        running_max = running_max.max(price);
        worst = worst.min((price - running_max) / running_max);
    }

    Some(worst)
}

/// Excess CAGR over `risk_free_annual`, per unit of annualized volatility
pub fn sharpe(series: &PriceSeries, risk_free_annual: f64) -> Option<f64> {
    let vol = ann_vol(series)?;
    if vol == 0.0 {
        return None;
    }
    let growth = cagr(series)?;
    Some((growth - risk_free_annual) / vol)
}

/// The four summary statistics for one symbol. `None` marks an undefined value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    #[serde(rename = "Ticker")]
    pub symbol: String,
    #[serde(rename = "CAGR")]
    pub cagr: Option<f64>,
    #[serde(rename = "AnnualVolatility")]
    pub annual_volatility: Option<f64>,
    #[serde(rename = "MaxDD")]
    pub max_drawdown: Option<f64>,
    #[serde(rename = "Sharpe")]
    pub sharpe: Option<f64>,
}

impl MetricsRecord {
    /// Copy with every defined value rounded to `places` decimals
    pub fn rounded(&self, places: i32) -> Self {
        let factor = 10_f64.powi(places);
        let round = |v: Option<f64>| v.map(|x| (x * factor).round() / factor);
        Self {
            symbol: self.symbol.clone(),
            cagr: round(self.cagr),
            annual_volatility: round(self.annual_volatility),
            max_drawdown: round(self.max_drawdown),
            sharpe: round(self.sharpe),
        }
    }

    /// True when every statistic is defined
    pub fn is_complete(&self) -> bool {
        self.cagr.is_some()
            && self.annual_volatility.is_some()
            && self.max_drawdown.is_some()
            && self.sharpe.is_some()
    }
}

/// Compute all statistics for one symbol
pub fn compute_metrics(symbol: &str, series: &PriceSeries, risk_free_annual: f64) -> MetricsRecord {
    let record = MetricsRecord {
        symbol: symbol.to_string(),
        cagr: cagr(series),
        annual_volatility: ann_vol(series),
        max_drawdown: max_drawdown(series),
        sharpe: sharpe(series, risk_free_annual),
    };

    if !record.is_complete() {
        debug!(
            "{}: undefined metrics with {} valid prices",
            symbol,
            series.valid_count()
        );
    }

    record
}

/// Compute statistics for every symbol in parallel, ordered by symbol
pub fn compute_all(table: &PriceTable, risk_free_annual: f64) -> Vec<MetricsRecord> {
    let entries: Vec<(&str, &PriceSeries)> = table.iter().collect();
    entries
        .par_iter()
        .map(|(symbol, series)| compute_metrics(symbol, series, risk_free_annual))
        .collect()
}
