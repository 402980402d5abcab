/// Non-fatal advisories raised by the engine and the strategies.
pub mod advisory;
/// Simulation clock for timestamp management.
pub mod clock;
pub mod kpi;
pub mod types;
