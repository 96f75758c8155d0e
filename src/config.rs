//! Application settings
//!
//! Loaded from a JSON file; any field left out takes its default. Defaults
//! reproduce the standard study: six broad ETFs since 2010, a 9% assumed
//! return, and a $1M target by age 65.

use crate::error::{Result, ValidationError};
use crate::projection::{DEFAULT_ANNUAL_RETURN, DEFAULT_END_AGE, DEFAULT_TARGET};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Assumptions shared by every compounding scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionDefaults {
    pub annual_return: f64,
    pub target: f64,
    pub end_age: u32,
}

impl Default for ProjectionDefaults {
    fn default() -> Self {
        Self {
            annual_return: DEFAULT_ANNUAL_RETURN,
            target: DEFAULT_TARGET,
            end_age: DEFAULT_END_AGE,
        }
    }
}

/// Dollar-cost averaging into single ETFs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcaConfig {
    pub monthly: f64,
    pub start_age: u32,
    pub end_age: u32,
    /// Assumed annual growth per symbol. Empty: use each symbol's historical CAGR.
    pub returns: BTreeMap<String, f64>,
}

impl Default for DcaConfig {
    fn default() -> Self {
        Self {
            monthly: 200.0,
            start_age: 22,
            end_age: 65,
            returns: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatchUpScenario {
    pub start_age: u32,
    pub monthly: f64,
}

/// Grids for the compounding comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub early_late_ages: Vec<u32>,
    pub monthly_levels: Vec<f64>,
    pub catch_up: Vec<CatchUpScenario>,
    /// First start age of the monthly-needed tables
    pub needed_from_age: u32,
    /// Last start age (inclusive) of the monthly-needed tables
    pub needed_to_age: u32,
    pub multi_returns: Vec<f64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            early_late_ages: vec![22, 32, 42],
            monthly_levels: vec![200.0, 500.0, 1000.0],
            catch_up: [(22, 200.0), (32, 400.0), (42, 600.0), (52, 800.0)]
                .into_iter()
                .map(|(start_age, monthly)| CatchUpScenario { start_age, monthly })
                .collect(),
            needed_from_age: 18,
            needed_to_age: 55,
            multi_returns: vec![0.07, 0.09, 0.13, 0.15, 0.20],
        }
    }
}

impl ScenarioConfig {
    /// Start ages for the monthly-needed tables
    pub fn needed_ages(&self) -> Vec<u32> {
        (self.needed_from_age..=self.needed_to_age).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Symbols to analyze. Empty: every symbol in the price file.
    pub tickers: Vec<String>,
    /// Prices before this date are ignored
    pub start_date: NaiveDate,
    /// Directory that receives the result tables
    pub results_dir: PathBuf,
    pub risk_free_annual: f64,
    pub projection: ProjectionDefaults,
    pub dca: DcaConfig,
    pub scenarios: ScenarioConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tickers: ["QQQ", "SCHD", "SPY", "VIG", "VTI", "VUG"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            start_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN),
            results_dir: PathBuf::from("results"),
            risk_free_annual: 0.0,
            projection: ProjectionDefaults::default(),
            dca: DcaConfig::default(),
            scenarios: ScenarioConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load and validate a JSON config file
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no projection could run with
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let invalid = |msg: String| Err(ValidationError::InvalidConfig(msg));

        ValidationError::ensure_finite("risk-free rate", self.risk_free_annual)?;
        ValidationError::ensure_finite("annual return", self.projection.annual_return)?;
        ValidationError::ensure_finite("target", self.projection.target)?;
        if self.projection.target < 0.0 {
            return Err(ValidationError::NegativeTarget(self.projection.target));
        }

        ValidationError::ensure_finite("DCA monthly amount", self.dca.monthly)?;
        if self.dca.monthly < 0.0 {
            return Err(ValidationError::NegativeContribution(self.dca.monthly));
        }
        if self.dca.end_age < self.dca.start_age {
            return Err(ValidationError::NegativeDuration {
                start_age: self.dca.start_age,
                end_age: self.dca.end_age,
            });
        }
        for (symbol, rate) in &self.dca.returns {
            if !rate.is_finite() {
                return invalid(format!("DCA return for {symbol} must be finite"));
            }
        }

        if let Some(level) = self.scenarios.monthly_levels.iter().find(|m| **m < 0.0 || !m.is_finite()) {
            return Err(ValidationError::NegativeContribution(*level));
        }
        if let Some(s) = self.scenarios.catch_up.iter().find(|s| s.monthly < 0.0 || !s.monthly.is_finite()) {
            return Err(ValidationError::NegativeContribution(s.monthly));
        }
        if self.scenarios.needed_to_age < self.scenarios.needed_from_age {
            return invalid(format!(
                "monthly-needed age range {}..={} is reversed",
                self.scenarios.needed_from_age, self.scenarios.needed_to_age
            ));
        }
        if self.scenarios.multi_returns.iter().any(|r| !r.is_finite()) {
            return invalid("multi-return rates must be finite".to_string());
        }

        if self.results_dir.as_os_str().is_empty() {
            return invalid("results_dir must not be empty".to_string());
        }

        Ok(())
    }
}
