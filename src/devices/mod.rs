//! Battery state, rating and recorded history.

/// Stationary battery storage model.
pub mod battery;
pub mod curves;
pub mod rating;

pub use battery::Battery;
pub use curves::{CurveRow, Curves};
pub use rating::Rating;
