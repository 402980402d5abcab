//! Stationary battery energy storage simulator.
//!
//! A [`devices::Battery`] is driven step by step by one of the dispatch
//! strategies in [`dispatch`], or sized for a load curve by [`sizing`].

pub mod config;
pub mod devices;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod profiles;
pub mod report;
pub mod runner;
/// Time axis, clock, advisories and KPIs.
pub mod sim;
pub mod sizing;

pub use error::{Error, Result};
