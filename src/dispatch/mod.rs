//! Dispatch strategies driving a [`Battery`](crate::devices::Battery) over an input series.
//!
//! Every strategy takes the battery as `&mut Battery`, drives the engine
//! exactly once per input value and returns a typed outcome holding the
//! result rows and the advisories raised during the run.

pub mod arbitrage;
pub mod curtailment;
pub mod load_following;
pub mod peak_shaving;

pub use arbitrage::{ArbitrageOutcome, Transaction, TransactionKind, arbitrage};
pub use curtailment::curtailment_avoidance;
pub use load_following::{
    EquivalentCurve, LoadFollowingOutcome, LoadFollowingRow, equivalent_peak_shaving_curve,
    load_following,
};
pub use peak_shaving::{LimitOutcome, LimitRow, peak_shaving};

/// Slack allowed when comparing a resulting curve against its limit.
pub const LIMIT_TOLERANCE_KW: f64 = 1e-6;

/// Largest value of a series, `None` when it is empty.
pub(crate) fn max_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Smallest value of a series, `None` when it is empty.
pub(crate) fn min_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}
