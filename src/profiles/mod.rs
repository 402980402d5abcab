//! Synthetic input series for demo scenarios.

/// Site consumption profile.
pub mod baseload;
/// Day-ahead price curve.
pub mod price;
/// Solar PV production profile.
pub mod solar;
pub mod types;

pub use baseload::BaseLoad;
pub use price::PriceCurve;
pub use solar::SolarPv;
pub use types::Profile;
