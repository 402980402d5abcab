//! Core simulation types: time axis configuration.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::{Error, Result};

/// Default step length in minutes.
pub const DEFAULT_STEP_MINUTES: u32 = 60;

/// Timestamp of the first record when none is configured (2021-01-01 00:00).
pub fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 1, 1)
        .unwrap_or_default()
        .and_time(NaiveTime::default())
}

/// Time axis shared by the battery and every dispatch run.
///
/// # Examples
///
/// ```
/// use bess_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::default();
/// assert_eq!(cfg.step_minutes, 60);
/// assert_eq!(cfg.dt_hours(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Duration represented by one record, in minutes.
    pub step_minutes: u32,
    /// Timestamp of the first record.
    pub start: NaiveDateTime,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step_minutes: DEFAULT_STEP_MINUTES,
            start: default_start(),
        }
    }
}

impl SimConfig {
    /// Creates a time axis starting at `start` with `step_minutes` per record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `step_minutes` is zero.
    pub fn new(step_minutes: u32, start: NaiveDateTime) -> Result<Self> {
        if step_minutes == 0 {
            return Err(Error::invalid_argument("step_minutes must be > 0"));
        }
        Ok(Self {
            step_minutes,
            start,
        })
    }

    /// Step length in hours (`step / 60`).
    pub fn dt_hours(&self) -> f64 {
        f64::from(self.step_minutes) / 60.0
    }

    /// Step length as a [`TimeDelta`].
    pub fn step(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.step_minutes))
    }

    /// Converts a per-step energy (kWh) into the equivalent power (kW).
    pub fn energy_to_power(&self, energy_kwh: f64) -> f64 {
        energy_kwh * 60.0 / f64::from(self.step_minutes)
    }

    /// Converts a power (kW) held for one step into energy (kWh).
    pub fn power_to_energy(&self, power_kw: f64) -> f64 {
        power_kw * f64::from(self.step_minutes) / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_axis_is_hourly() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.step_minutes, 60);
        assert_eq!(cfg.dt_hours(), 1.0);
        assert_eq!(cfg.start.to_string(), "2021-01-01 00:00:00");
    }

    #[test]
    fn quarter_hour_conversions() {
        let cfg = SimConfig::new(15, default_start()).ok();
        let cfg = cfg.as_ref();
        assert_eq!(cfg.map(SimConfig::dt_hours), Some(0.25));
        assert_eq!(cfg.map(|c| c.power_to_energy(100.0)), Some(25.0));
        assert_eq!(cfg.map(|c| c.energy_to_power(25.0)), Some(100.0));
        assert_eq!(cfg.map(SimConfig::step), Some(TimeDelta::minutes(15)));
    }

    #[test]
    fn zero_step_is_rejected() {
        assert!(SimConfig::new(0, default_start()).is_err());
    }
}
