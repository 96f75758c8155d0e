//! Contribution paths: fixed monthly contributions compounding at a fixed rate

use super::state::AccumulationState;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Longest horizon a single path may cover
pub const MAX_PROJECTION_YEARS: u32 = 1_000;

/// Monthly balances from month 0 (always 0) through month `years * 12`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionPath {
    pub monthly_amount: f64,
    pub annual_rate: f64,
    /// Age at month 0, when the path was projected between two ages
    pub start_age: Option<u32>,
    balances: Vec<f64>,
}

impl ContributionPath {
    /// Number of monthly balances (`years * 12 + 1`)
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Always false: a path holds at least month 0
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Index of the last month
    pub fn months(&self) -> u32 {
        self.balances.len().saturating_sub(1) as u32
    }

    pub fn balances(&self) -> &[f64] {
        &self.balances
    }

    pub fn balance_at(&self, month: u32) -> Option<f64> {
        self.balances.get(month as usize).copied()
    }

    /// `(month, balance)` pairs in month order
    pub fn points(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.balances
            .iter()
            .enumerate()
            .map(|(month, &balance)| (month as u32, balance))
    }

    pub fn final_balance(&self) -> f64 {
        self.balances.last().copied().unwrap_or(0.0)
    }

    /// Largest balance on the path. Equals the final balance when the rate is
    /// non-negative.
    pub fn max_balance(&self) -> f64 {
        self.balances.iter().copied().fold(0.0, f64::max)
    }

    /// Total paid in by the start of `month`
    pub fn contributed_at(&self, month: u32) -> f64 {
        self.monthly_amount * month as f64
    }

    /// Balance in excess of contributions at `month`
    pub fn growth_at(&self, month: u32) -> Option<f64> {
        self.balance_at(month)
            .map(|balance| balance - self.contributed_at(month))
    }

    /// Age at `month`, for paths projected from a start age
    pub fn age_at(&self, month: u32) -> Option<f64> {
        self.start_age
            .map(|age| age as f64 + month as f64 / 12.0)
    }
}

impl Index<usize> for ContributionPath {
    type Output = f64;

    fn index(&self, month: usize) -> &f64 {
        &self.balances[month]
    }
}

/// Simulate `years * 12` months of contributions
///
/// Each month the balance grows by `annual_rate / 12` and then receives
/// `monthly_amount`. Month 0 is the empty starting balance, so the path holds
/// `years * 12 + 1` values.
pub fn contribution_path(
    monthly_amount: f64,
    years: u32,
    annual_rate: f64,
) -> Result<ContributionPath, ValidationError> {
    let monthly_amount = ValidationError::ensure_finite("monthly amount", monthly_amount)?;
    if monthly_amount < 0.0 {
        return Err(ValidationError::NegativeContribution(monthly_amount));
    }
    let annual_rate = ValidationError::ensure_finite("annual rate", annual_rate)?;
    if years > MAX_PROJECTION_YEARS {
        return Err(ValidationError::HorizonTooLong {
            years,
            max: MAX_PROJECTION_YEARS,
        });
    }

    let months = years * 12;
    let monthly_rate = annual_rate / 12.0;

    let mut state = AccumulationState::start();
    let mut balances = Vec::with_capacity(months as usize + 1);
    balances.push(state.balance);

    while state.month < months {
        state.advance_month(monthly_rate, monthly_amount);
        balances.push(state.balance);
    }

    Ok(ContributionPath {
        monthly_amount,
        annual_rate,
        start_age: None,
        balances,
    })
}

/// Dollar-cost averaging into a single asset at an assumed constant growth
/// rate (typically its historical CAGR), from `start_age` to `end_age`
pub fn dca_constant_return(
    rate: f64,
    monthly: f64,
    start_age: u32,
    end_age: u32,
) -> Result<ContributionPath, ValidationError> {
    if end_age < start_age {
        return Err(ValidationError::NegativeDuration { start_age, end_age });
    }

    let mut path = contribution_path(monthly, end_age - start_age, rate)?;
    path.start_age = Some(start_age);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_length_and_start() {
        for years in [0, 1, 10, 43] {
            let path = contribution_path(200.0, years, 0.09).unwrap();
            assert_eq!(path.len(), years as usize * 12 + 1);
            assert_eq!(path[0], 0.0);
            assert_eq!(path.months(), years * 12);
        }
    }

    #[test]
    fn test_zero_years() {
        let path = contribution_path(500.0, 0, 0.07).unwrap();
        assert_eq!(path.balances(), &[0.0]);
        assert_eq!(path.final_balance(), 0.0);
    }

    #[test]
    fn test_zero_rate_is_linear() {
        let path = contribution_path(200.0, 1, 0.0).unwrap();
        let expected: Vec<f64> = (0..=12).map(|i| 200.0 * i as f64).collect();
        assert_eq!(path.balances(), expected.as_slice());
        assert_eq!(path.final_balance(), 2400.0);
    }

    #[test]
    fn test_matches_annuity_closed_form() {
        let m = 200.0;
        let r: f64 = 0.09 / 12.0;
        let path = contribution_path(m, 43, 0.09).unwrap();

        for (month, balance) in path.points() {
            let closed = m * ((1.0 + r).powi(month as i32) - 1.0) / r;
            assert_relative_eq!(balance, closed, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_monotonic_non_negative_rate() {
        let path = contribution_path(100.0, 30, 0.05).unwrap();
        assert!(path.balances().windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(path.max_balance(), path.final_balance());
    }

    #[test]
    fn test_negative_rate_allowed() {
        let path = contribution_path(100.0, 5, -0.05).unwrap();
        assert_eq!(path.len(), 61);
        assert!(path.final_balance() < path.contributed_at(60));
        assert!(path.growth_at(60).unwrap() < 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            contribution_path(-1.0, 10, 0.09),
            Err(ValidationError::NegativeContribution(-1.0))
        );
        assert!(matches!(
            contribution_path(100.0, 10, f64::NAN),
            Err(ValidationError::NonFiniteValue { field: "annual rate", .. })
        ));
        assert!(matches!(
            contribution_path(f64::INFINITY, 10, 0.09),
            Err(ValidationError::NonFiniteValue { .. })
        ));
        assert!(matches!(
            contribution_path(100.0, MAX_PROJECTION_YEARS + 1, 0.09),
            Err(ValidationError::HorizonTooLong { .. })
        ));
    }

    #[test]
    fn test_contributed_and_growth() {
        let path = contribution_path(200.0, 2, 0.12).unwrap();
        assert_eq!(path.contributed_at(24), 4800.0);
        assert!(path.growth_at(24).unwrap() > 0.0);
        assert_eq!(path.growth_at(25), None);
    }

    #[test]
    fn test_dca_equals_contribution_path() {
        let dca = dca_constant_return(0.1, 200.0, 22, 65).unwrap();
        let direct = contribution_path(200.0, 43, 0.1).unwrap();
        assert_eq!(dca.balances(), direct.balances());
        assert_eq!(dca.start_age, Some(22));
        assert_eq!(dca.age_at(0), Some(22.0));
        assert_eq!(dca.age_at(516), Some(65.0));
        assert_eq!(direct.age_at(0), None);
    }

    #[test]
    fn test_dca_same_age_single_point() {
        let dca = dca_constant_return(0.1, 200.0, 40, 40).unwrap();
        assert_eq!(dca.len(), 1);
    }

    #[test]
    fn test_dca_negative_duration() {
        assert_eq!(
            dca_constant_return(0.1, 200.0, 65, 22),
            Err(ValidationError::NegativeDuration {
                start_age: 65,
                end_age: 22
            })
        );
    }
}
