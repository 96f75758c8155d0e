//! Compounding projections: contribution paths and the contribution needed
//! to reach a target

mod state;
mod path;
mod solve;

pub use state::AccumulationState;
pub use path::{contribution_path, dca_constant_return, ContributionPath, MAX_PROJECTION_YEARS};
pub use solve::{annuity_factor, monthly_needed_to_target, MonthlyNeededRow, MonthlyNeededTable};

/// Default assumed annual return (9%)
pub const DEFAULT_ANNUAL_RETURN: f64 = 0.09;

/// Default savings target
pub const DEFAULT_TARGET: f64 = 1_000_000.0;

/// Default age at which contributions stop
pub const DEFAULT_END_AGE: u32 = 65;
