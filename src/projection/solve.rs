//! Inverse solve: the monthly contribution needed to reach a target sum

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Future value of contributing 1 per month for `months` months at
/// `monthly_rate`, compounding monthly
pub fn annuity_factor(months: u32, monthly_rate: f64) -> f64 {
    if monthly_rate == 0.0 {
        months as f64
    } else {
        ((1.0 + monthly_rate).powf(months as f64) - 1.0) / monthly_rate
    }
}

/// One row of the table: `monthly` is `None` when the horizon is not positive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyNeededRow {
    #[serde(rename = "Start Age")]
    pub start_age: u32,
    #[serde(rename = "Monthly Needed ($)")]
    pub monthly: Option<f64>,
}

/// Required monthly contribution per start age, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyNeededTable {
    pub target: f64,
    pub end_age: u32,
    pub annual_rate: f64,
    rows: Vec<MonthlyNeededRow>,
}

impl MonthlyNeededTable {
    pub fn rows(&self) -> &[MonthlyNeededRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Monthly amount for a start age. Outer `None`: age not in the table.
    pub fn monthly_for(&self, start_age: u32) -> Option<Option<f64>> {
        self.rows
            .iter()
            .find(|row| row.start_age == start_age)
            .map(|row| row.monthly)
    }
}

/// Monthly contribution that grows to `target` by `end_age` at `annual_rate`
///
/// This inverts the final balance of [`contribution_path`](super::contribution_path):
/// `target / (((1 + r)^months - 1) / r)` with `r = annual_rate / 12`, or
/// `target / months` at a zero rate. Start ages at or after `end_age` have no
/// solution and yield `None`.
pub fn monthly_needed_to_target(
    start_ages: &[u32],
    target: f64,
    end_age: u32,
    annual_rate: f64,
) -> Result<MonthlyNeededTable, ValidationError> {
    let target = ValidationError::ensure_finite("target", target)?;
    if target < 0.0 {
        return Err(ValidationError::NegativeTarget(target));
    }
    let annual_rate = ValidationError::ensure_finite("annual rate", annual_rate)?;
    let monthly_rate = annual_rate / 12.0;

    let rows = start_ages
        .iter()
        .map(|&start_age| {
            let months = (i64::from(end_age) - i64::from(start_age)) * 12;
            let monthly = if months <= 0 {
                None
            } else {
                Some(target / annuity_factor(months as u32, monthly_rate))
            };
            MonthlyNeededRow { start_age, monthly }
        })
        .collect();

    Ok(MonthlyNeededTable {
        target,
        end_age,
        annual_rate,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::contribution_path;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_rate() {
        let table = monthly_needed_to_target(&[60], 1_000_000.0, 65, 0.0).unwrap();
        let monthly = table.rows()[0].monthly.unwrap();
        assert!(
            (monthly - 16666.67).abs() < 0.01,
            "Monthly needed mismatch: {} vs 16666.67",
            monthly
        );
        assert_eq!(monthly, 1_000_000.0 / 60.0);
    }

    #[test]
    fn test_non_positive_horizon_undefined() {
        let table = monthly_needed_to_target(&[64, 65, 70], 1_000_000.0, 65, 0.09).unwrap();
        assert!(table.rows()[0].monthly.is_some());
        assert_eq!(table.rows()[1].monthly, None);
        assert_eq!(table.rows()[2].monthly, None);
    }

    #[test]
    fn test_round_trip_with_contribution_path() {
        for &(m, years, rate) in &[(200.0, 43, 0.09), (1000.0, 10, 0.2), (50.0, 1, -0.03)] {
            let target = contribution_path(m, years, rate).unwrap().final_balance();
            let table = monthly_needed_to_target(&[30], target, 30 + years, rate).unwrap();
            assert_relative_eq!(table.rows()[0].monthly.unwrap(), m, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_earlier_start_needs_less() {
        let ages: Vec<u32> = (18..56).collect();
        let table = monthly_needed_to_target(&ages, 1_000_000.0, 65, 0.09).unwrap();
        assert_eq!(table.len(), 38);

        let amounts: Vec<f64> = table.rows().iter().map(|r| r.monthly.unwrap()).collect();
        assert!(amounts.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_preserves_input_order() {
        let table = monthly_needed_to_target(&[40, 20, 30], 500_000.0, 65, 0.07).unwrap();
        let ages: Vec<u32> = table.rows().iter().map(|r| r.start_age).collect();
        assert_eq!(ages, vec![40, 20, 30]);
        assert_eq!(table.monthly_for(99), None);
        assert!(table.monthly_for(20).unwrap().is_some());
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            monthly_needed_to_target(&[30], -5.0, 65, 0.09),
            Err(ValidationError::NegativeTarget(-5.0))
        );
        assert!(monthly_needed_to_target(&[30], f64::NAN, 65, 0.09).is_err());
        assert!(monthly_needed_to_target(&[30], 1.0, 65, f64::INFINITY).is_err());
    }

    #[test]
    fn test_annuity_factor() {
        assert_eq!(annuity_factor(12, 0.0), 12.0);
        assert!((annuity_factor(1, 0.01) - 1.0).abs() < 1e-12);
        assert!((annuity_factor(2, 0.01) - 2.01).abs() < 1e-12);
    }
}
