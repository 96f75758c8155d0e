//! Month-by-month accumulation state for a contribution projection

/// Balance of a savings account at a point in time during projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulationState {
    /// Months elapsed since the first contribution date (0 = start)
    pub month: u32,

    /// Balance at the start of `month`, before that month's contribution
    pub balance: f64,
}

impl AccumulationState {
    /// Empty account at month 0
    pub fn start() -> Self {
        Self {
            month: 0,
            balance: 0.0,
        }
    }

    /// Advance to the next month: grow the balance by one month of interest,
    /// then add the contribution
    pub fn advance_month(&mut self, monthly_rate: f64, contribution: f64) {
        self.month += 1;
        self.balance = self.balance * (1.0 + monthly_rate) + contribution;
    }
}
