//! Growth Projection - long-horizon investment growth scenarios
//!
//! This library provides:
//! - Historical price metrics (CAGR, annualized volatility, max drawdown, Sharpe)
//! - Monthly contribution paths compounding at a fixed annual rate
//! - The monthly contribution needed to reach a target by a given age
//! - Batch scenario runs and CSV output of the resulting tables

pub mod error;
pub mod config;
pub mod prices;
pub mod metrics;
pub mod projection;
pub mod scenario;
pub mod output;

// Re-export commonly used types
pub use error::{Error, Result, ValidationError};
pub use config::AppConfig;
pub use prices::{PriceSeries, PriceSource, PriceTable};
pub use metrics::MetricsRecord;
pub use projection::{contribution_path, dca_constant_return, monthly_needed_to_target, ContributionPath, MonthlyNeededTable};
pub use scenario::ScenarioRunner;
pub use output::ResultsWriter;
