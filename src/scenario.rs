//! Scenario runner for batches of compounding projections
//!
//! Holds the shared assumptions (return, target, end age) once and evaluates
//! whole families of scenarios in parallel. Results come back labeled and in
//! input order, ready to be charted or written out.

use crate::config::{CatchUpScenario, DcaConfig, ProjectionDefaults};
use crate::error::ValidationError;
use crate::metrics::MetricsRecord;
use crate::projection::{
    dca_constant_return, monthly_needed_to_target, ContributionPath, MonthlyNeededTable,
};
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// A contribution path with the label it is charted under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledPath {
    pub label: String,
    pub path: ContributionPath,
}

/// A monthly-needed table for one assumed return
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledTable {
    pub label: String,
    pub annual_rate: f64,
    pub table: MonthlyNeededTable,
}

/// Label used for a path that starts at `start_age` contributing `monthly`
pub fn scenario_label(start_age: u32, monthly: f64) -> String {
    format!("Start {start_age}, ${monthly}/mo")
}

/// Label used for a table computed at `annual_rate`
pub fn return_label(annual_rate: f64) -> String {
    format!("{}% return", (annual_rate * 100.0).round() as i64)
}

/// Pre-configured runner for batch projections
///
/// # Example
/// ```
/// use growth_projection::ScenarioRunner;
///
/// let runner = ScenarioRunner::new();
/// let paths = runner.start_early_vs_late(&[22, 32], &[200.0]).unwrap();
/// assert_eq!(paths[0].label, "Start 22, $200/mo");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    defaults: ProjectionDefaults,
}

impl ScenarioRunner {
    /// Runner with the default 9% return, $1M target and end age 65
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: ProjectionDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &ProjectionDefaults {
        &self.defaults
    }

    pub fn defaults_mut(&mut self) -> &mut ProjectionDefaults {
        &mut self.defaults
    }

    /// Contribute `monthly` from `start_age` to the end age at the default return
    pub fn run(&self, start_age: u32, monthly: f64) -> Result<LabeledPath, ValidationError> {
        let path = dca_constant_return(
            self.defaults.annual_return,
            monthly,
            start_age,
            self.defaults.end_age,
        )?;
        Ok(LabeledPath {
            label: scenario_label(start_age, monthly),
            path,
        })
    }

    /// Every combination of monthly level and start age, grouped by level
    pub fn start_early_vs_late(
        &self,
        start_ages: &[u32],
        monthly_levels: &[f64],
    ) -> Result<Vec<LabeledPath>, ValidationError> {
        let pairs: Vec<(u32, f64)> = monthly_levels
            .iter()
            .flat_map(|&monthly| start_ages.iter().map(move |&age| (age, monthly)))
            .collect();

        debug!("Running {} early-vs-late scenarios", pairs.len());
        pairs
            .par_iter()
            .map(|&(age, monthly)| self.run(age, monthly))
            .collect()
    }

    /// Later starts with larger contributions
    pub fn catch_up(
        &self,
        scenarios: &[CatchUpScenario],
    ) -> Result<Vec<LabeledPath>, ValidationError> {
        scenarios
            .par_iter()
            .map(|s| self.run(s.start_age, s.monthly))
            .collect()
    }

    /// Contribution needed per start age at the default return
    pub fn monthly_needed(&self, start_ages: &[u32]) -> Result<MonthlyNeededTable, ValidationError> {
        monthly_needed_to_target(
            start_ages,
            self.defaults.target,
            self.defaults.end_age,
            self.defaults.annual_return,
        )
    }

    /// One monthly-needed table per assumed return, in the order given
    pub fn monthly_needed_by_return(
        &self,
        start_ages: &[u32],
        returns: &[f64],
    ) -> Result<Vec<LabeledTable>, ValidationError> {
        returns
            .par_iter()
            .map(|&rate| {
                let table = monthly_needed_to_target(
                    start_ages,
                    self.defaults.target,
                    self.defaults.end_age,
                    rate,
                )?;
                Ok(LabeledTable {
                    label: return_label(rate),
                    annual_rate: rate,
                    table,
                })
            })
            .collect()
    }

    /// DCA path per symbol, each growing at that symbol's assumed return
    pub fn dca_by_symbol(
        &self,
        returns: &BTreeMap<String, f64>,
        dca: &DcaConfig,
    ) -> Result<Vec<LabeledPath>, ValidationError> {
        let entries: Vec<(&String, f64)> = returns.iter().map(|(s, &r)| (s, r)).collect();
        entries
            .par_iter()
            .map(|&(symbol, rate)| {
                let path = dca_constant_return(rate, dca.monthly, dca.start_age, dca.end_age)?;
                Ok(LabeledPath {
                    label: symbol.clone(),
                    path,
                })
            })
            .collect()
    }
}

/// Historical CAGR per symbol, skipping symbols whose CAGR is undefined
pub fn dca_returns_from_metrics(records: &[MetricsRecord]) -> BTreeMap<String, f64> {
    records
        .iter()
        .filter_map(|record| match record.cagr {
            Some(rate) => Some((record.symbol.clone(), rate)),
            None => {
                warn!("No CAGR for {}, skipping DCA projection", record.symbol);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::projection::contribution_path;

    #[test]
    fn test_early_vs_late_grid() {
        let runner = ScenarioRunner::new();
        let paths = runner
            .start_early_vs_late(&[22, 32, 42], &[200.0, 500.0, 1000.0])
            .unwrap();

        assert_eq!(paths.len(), 9);
        let labels: Vec<_> = paths.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels[0], "Start 22, $200/mo");
        assert_eq!(labels[2], "Start 42, $200/mo");
        assert_eq!(labels[3], "Start 22, $500/mo");
        assert_eq!(labels[8], "Start 42, $1000/mo");

        // 43 years from 22 to 65
        assert_eq!(paths[0].path.len(), 43 * 12 + 1);
        assert_eq!(paths[2].path.len(), 23 * 12 + 1);
    }

    #[test]
    fn test_starting_early_beats_starting_late() {
        let runner = ScenarioRunner::new();
        let paths = runner.start_early_vs_late(&[22, 42], &[200.0]).unwrap();
        assert!(paths[0].path.final_balance() > paths[1].path.final_balance());
    }

    #[test]
    fn test_catch_up() {
        let runner = ScenarioRunner::new();
        let paths = runner.catch_up(&ScenarioConfig::default().catch_up).unwrap();

        assert_eq!(paths.len(), 4);
        assert_eq!(paths[3].label, "Start 52, $800/mo");
        let expected = contribution_path(800.0, 13, 0.09).unwrap();
        assert_eq!(paths[3].path.balances(), expected.balances());
        // $200 from 22 still ends ahead of $800 from 52
        assert!(paths[0].path.final_balance() > paths[3].path.final_balance());
    }

    #[test]
    fn test_start_after_end_age_rejected() {
        let runner = ScenarioRunner::new();
        assert!(matches!(
            runner.run(70, 200.0),
            Err(ValidationError::NegativeDuration { start_age: 70, end_age: 65 })
        ));
    }

    #[test]
    fn test_monthly_needed_by_return() {
        let runner = ScenarioRunner::new();
        let ages = ScenarioConfig::default().needed_ages();
        let tables = runner
            .monthly_needed_by_return(&ages, &[0.07, 0.09, 0.13, 0.15, 0.20])
            .unwrap();

        let labels: Vec<_> = tables.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["7% return", "9% return", "13% return", "15% return", "20% return"]
        );

        // Higher return needs less at every age
        for pair in tables.windows(2) {
            for (low, high) in pair[0].table.rows().iter().zip(pair[1].table.rows()) {
                assert!(high.monthly.unwrap() < low.monthly.unwrap());
            }
        }

        let single = runner.monthly_needed(&ages).unwrap();
        assert_eq!(single, tables[1].table);
    }

    #[test]
    fn test_dca_by_symbol() {
        let runner = ScenarioRunner::new();
        let mut returns = BTreeMap::new();
        returns.insert("SPY".to_string(), 0.12);
        returns.insert("QQQ".to_string(), 0.18);

        let paths = runner.dca_by_symbol(&returns, &DcaConfig::default()).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].label, "QQQ");
        assert_eq!(paths[0].path.start_age, Some(22));
        assert!(paths[0].path.final_balance() > paths[1].path.final_balance());
    }

    #[test]
    fn test_dca_returns_from_metrics() {
        let records = vec![
            MetricsRecord {
                symbol: "SPY".to_string(),
                cagr: Some(0.11),
                annual_volatility: Some(0.17),
                max_drawdown: Some(-0.34),
                sharpe: Some(0.65),
            },
            MetricsRecord {
                symbol: "NEW".to_string(),
                cagr: None,
                annual_volatility: None,
                max_drawdown: Some(0.0),
                sharpe: None,
            },
        ];

        let returns = dca_returns_from_metrics(&records);
        assert_eq!(returns.len(), 1);
        assert_eq!(returns.get("SPY"), Some(&0.11));
    }

    #[test]
    fn test_return_label_rounds() {
        assert_eq!(return_label(0.07), "7% return");
        assert_eq!(return_label(0.29), "29% return");
        assert_eq!(scenario_label(32, 400.0), "Start 32, $400/mo");
    }
}
