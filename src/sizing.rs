//! Two-pass battery dimensioning for peak shaving and load following.
//!
//! Sizing first probes with the needed power and an oversized capacity (the
//! sentinel), reads the deepest SOC reached and scales it back to kWh. The
//! battery is then given the derived [`Rating`] and the run is repeated so
//! its recorded history matches the sized asset.
//!
//! The probe only gives the right answer while the sentinel is larger than
//! the energy actually needed. Before probing, the needed energy is bounded
//! with a prefix-sum walk over the same limits, and the sentinel is raised to
//! a multiple of that bound.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::devices::{Battery, Rating};
use crate::dispatch::peak_shaving::{LimitRow, peak_shaving, shave};
use crate::dispatch::{LIMIT_TOLERANCE_KW, equivalent_peak_shaving_curve, max_value, min_value};
use crate::error::{Error, Result};
use crate::sim::advisory::Advisory;

/// Capacity used for the probe run unless the deficit bound asks for more.
pub const DEFAULT_SENTINEL_KWH: f64 = 1e6;

/// Headroom of the sentinel over the deficit bound.
const SENTINEL_MARGIN: f64 = 4.0;

/// Float noise ignored when rounding up to whole kW, as a share of the limit
/// tolerance. A rating rounded down by this much still holds the limit.
const ROUNDING_SLACK_KW: f64 = 0.1 * LIMIT_TOLERANCE_KW;

/// Derived battery dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sizing {
    pub power_kw: f64,
    pub capacity_kwh: f64,
    /// Equivalent full cycles of the run with the derived rating.
    pub equivalent_full_cycles: f64,
    /// Whether the run with the derived rating held the limit.
    pub objective_met: bool,
}

impl Sizing {
    pub fn rating(&self) -> Rating {
        Rating::new(self.power_kw, self.capacity_kwh)
    }
}

impl fmt::Display for Sizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Battery power: {} kW, capacity: {} kWh, efc: {:.3}",
            self.power_kw, self.capacity_kwh, self.equivalent_full_cycles
        )
    }
}

/// Result of a sizing run.
#[derive(Debug, Clone, Serialize)]
pub struct SizingOutcome {
    pub sizing: Sizing,
    /// Rows of the run with the derived rating.
    pub rows: Vec<LimitRow>,
    /// Probe advisories followed by those of the final run.
    pub advisories: Vec<Advisory>,
}

/// Sizing parameters.
#[derive(Debug, Clone, Copy)]
pub struct Dimensioning {
    /// Probe capacity in kWh.
    pub sentinel_kwh: f64,
    /// Raise the sentinel to cover the deficit bound.
    pub raise_sentinel: bool,
}

impl Default for Dimensioning {
    fn default() -> Self {
        Self {
            sentinel_kwh: DEFAULT_SENTINEL_KWH,
            raise_sentinel: true,
        }
    }
}

impl Dimensioning {
    /// Smallest power and capacity that hold `loadcurve` at `peak_limit_kw`.
    ///
    /// The battery is reset, left with the derived rating and the history of
    /// the final run. Its round-trip efficiency and time axis are used as-is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `loadcurve` is empty.
    #[instrument(skip(self, battery, loadcurve), fields(steps = loadcurve.len()))]
    pub fn peak_shaving(
        &self,
        battery: &mut Battery,
        loadcurve: &[f64],
        peak_limit_kw: f64,
    ) -> Result<SizingOutcome> {
        let peak_kw = max_value(loadcurve)
            .ok_or_else(|| Error::invalid_argument("cannot size for an empty load curve"))?;
        let power_kw = round_up(peak_kw - peak_limit_kw, ROUNDING_SLACK_KW);

        let sentinel_kwh = if self.raise_sentinel {
            let bound = deficit_bound_kwh(battery, loadcurve, peak_limit_kw, power_kw);
            self.sentinel_kwh.max(SENTINEL_MARGIN * bound)
        } else {
            self.sentinel_kwh
        };

        // Probe with an oversized capacity.
        battery.reset();
        battery.set_soc(1.0);
        battery.replace_rating(Rating::new(power_kw, sentinel_kwh));
        shave(battery, loadcurve, peak_limit_kw);

        let min_soc = min_value(battery.curves().soc())
            .unwrap_or(1.0)
            .min(battery.soc());
        let capacity_slack_kwh = battery.config().power_to_energy(ROUNDING_SLACK_KW);
        let capacity_kwh = round_up((1.0 - min_soc) * sentinel_kwh, capacity_slack_kwh);
        debug!(power_kw, sentinel_kwh, min_soc, capacity_kwh, "probe finished");

        let mut advisories = Vec::new();
        if min_soc <= 0.0 {
            battery.push_advisory(Advisory::SentinelExhausted { sentinel_kwh });
        }
        advisories.extend(battery.take_advisories());

        // Final run with the derived rating.
        battery.replace_rating(Rating::new(power_kw, capacity_kwh));
        battery.reset();
        battery.set_soc(1.0);
        let run = peak_shaving(battery, loadcurve, peak_limit_kw);

        let sizing = Sizing {
            power_kw,
            capacity_kwh,
            equivalent_full_cycles: battery.equivalent_full_cycles(),
            objective_met: run.objective_met(),
        };
        advisories.extend(run.advisories);
        info!(%sizing, "battery sized");

        Ok(SizingOutcome {
            sizing,
            rows: run.rows,
            advisories,
        })
    }

    /// Smallest power and capacity that let the load be covered entirely
    /// from local production.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the series are empty or differ in length.
    pub fn load_following(
        &self,
        battery: &mut Battery,
        production: &[f64],
        load: &[f64],
    ) -> Result<SizingOutcome> {
        let equivalent = equivalent_peak_shaving_curve(production, load)?;
        self.peak_shaving(battery, &equivalent.curve, equivalent.shift_kw)
    }
}

/// Sizes for peak shaving with the default sentinel.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `loadcurve` is empty.
pub fn size_for_peak_shaving(
    battery: &mut Battery,
    loadcurve: &[f64],
    peak_limit_kw: f64,
) -> Result<SizingOutcome> {
    Dimensioning::default().peak_shaving(battery, loadcurve, peak_limit_kw)
}

/// Sizes for load following with the default sentinel.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the series are empty or differ in length.
pub fn size_for_load_following(
    battery: &mut Battery,
    production: &[f64],
    load: &[f64],
) -> Result<SizingOutcome> {
    Dimensioning::default().load_following(battery, production, load)
}

/// Rounds up to a whole number, never below zero.
fn round_up(value: f64, slack: f64) -> f64 {
    let rounded = (value - slack).ceil();
    if rounded > 0.0 { rounded } else { 0.0 }
}

/// Deepest energy deficit, in kWh of stored energy, that peak shaving at
/// `power_kw` runs into when the capacity never binds.
///
/// Walks the curve once with the battery's efficiencies and time step: a
/// discharge of `e` kWh takes `e / eta_d` from storage, a charge of `e` kWh
/// refills `e * eta_c` and never beyond full.
pub fn deficit_bound_kwh(
    battery: &Battery,
    loadcurve: &[f64],
    peak_limit_kw: f64,
    power_kw: f64,
) -> f64 {
    let config = battery.config();
    let eta_c = battery.charge_efficiency();
    let eta_d = battery.discharge_efficiency();

    let mut deficit = 0.0_f64;
    let mut deepest = 0.0_f64;
    for &load in loadcurve {
        if load > peak_limit_kw {
            let energy = config.power_to_energy((load - peak_limit_kw).min(power_kw));
            deficit += energy / eta_d;
        } else {
            let energy = config.power_to_energy((peak_limit_kw - load).min(power_kw * eta_c));
            deficit = (deficit - energy * eta_c).max(0.0);
        }
        deepest = deepest.max(deficit);
    }
    deepest
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::sim::types::SimConfig;

    fn lossless() -> Battery {
        Battery::new(Rating::default(), 1.0, 0.5, SimConfig::default()).unwrap()
    }

    #[test]
    fn test_single_spike() {
        let mut battery = lossless();
        let mut load = vec![100.0; 24];
        load[12] = 150.0;

        let outcome = size_for_peak_shaving(&mut battery, &load, 100.0).unwrap();
        assert_eq!(outcome.sizing.power_kw, 50.0);
        assert_eq!(outcome.sizing.capacity_kwh, 50.0);
        assert!(outcome.sizing.objective_met);
        assert!(outcome.advisories.is_empty());

        // The battery is left with the derived rating and the final run.
        assert_eq!(battery.rating(), Rating::new(50.0, 50.0));
        assert_eq!(battery.curves().len(), 24);
    }

    #[test]
    fn test_power_is_rounded_up() {
        let mut battery = lossless();
        let outcome = size_for_peak_shaving(&mut battery, &[100.0, 112.3, 100.0], 100.0).unwrap();
        assert_eq!(outcome.sizing.power_kw, 13.0);
    }

    #[test]
    fn test_load_below_limit_needs_nothing() {
        let mut battery = lossless();
        let outcome = size_for_peak_shaving(&mut battery, &[40.0, 60.0], 100.0).unwrap();
        assert_eq!(outcome.sizing.power_kw, 0.0);
        assert_eq!(outcome.sizing.capacity_kwh, 0.0);
        assert!(outcome.sizing.objective_met);
    }

    #[test]
    fn test_empty_load_curve() {
        let mut battery = lossless();
        let err = size_for_peak_shaving(&mut battery, &[], 100.0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_final_step_spike_is_counted() {
        let mut battery = lossless();
        let outcome = size_for_peak_shaving(&mut battery, &[100.0, 100.0, 130.0], 100.0).unwrap();
        assert_eq!(outcome.sizing.capacity_kwh, 30.0);
    }

    #[test]
    fn test_small_sentinel_is_exhausted() {
        let mut battery = lossless();
        let dimensioning = Dimensioning {
            sentinel_kwh: 10.0,
            raise_sentinel: false,
        };
        let outcome = dimensioning
            .peak_shaving(&mut battery, &[100.0, 150.0, 100.0], 100.0)
            .unwrap();

        assert_eq!(outcome.sizing.capacity_kwh, 10.0);
        assert!(!outcome.sizing.objective_met);
        assert!(matches!(
            outcome.advisories.first(),
            Some(Advisory::SentinelExhausted { .. })
        ));
    }

    #[test]
    fn test_raised_sentinel_covers_large_deficit() {
        let mut battery = lossless();
        let dimensioning = Dimensioning {
            sentinel_kwh: 10.0,
            raise_sentinel: true,
        };
        let outcome = dimensioning
            .peak_shaving(&mut battery, &[100.0, 150.0, 100.0], 100.0)
            .unwrap();
        assert_eq!(outcome.sizing.capacity_kwh, 50.0);
        assert!(outcome.sizing.objective_met);
    }

    #[test]
    fn test_deficit_bound() {
        let battery = lossless();
        // 20 + 20 drawn, 10 refilled, 20 drawn again.
        let bound = deficit_bound_kwh(&battery, &[120.0, 120.0, 90.0, 120.0], 100.0, 20.0);
        assert_relative_eq!(bound, 50.0);

        let bound = deficit_bound_kwh(&battery, &[120.0, 90.0, 90.0, 120.0], 100.0, 20.0);
        assert_relative_eq!(bound, 20.0);
    }

    #[test]
    fn test_load_following_delegates() {
        let mut battery = lossless();
        let production = [0.0, 6.0, 0.0];
        let load = [2.0, 2.0, 2.0];
        let outcome = size_for_load_following(&mut battery, &production, &load).unwrap();

        // Residual peaks at 2 kW; 2 kWh are drawn before the surplus arrives.
        assert_eq!(outcome.sizing.power_kw, 2.0);
        assert_eq!(outcome.sizing.capacity_kwh, 2.0);
        assert!(outcome.sizing.objective_met);
    }

    #[test]
    fn test_round_up_ignores_float_noise() {
        assert_eq!(round_up(13.000000000040757, ROUNDING_SLACK_KW), 13.0);
        assert_eq!(round_up(12.299999999999997, ROUNDING_SLACK_KW), 13.0);
        assert_eq!(round_up(-40.0, ROUNDING_SLACK_KW), 0.0);
        // A real excess above the slack still takes the next whole unit.
        assert_eq!(round_up(10.0000009, 2.5e-8), 11.0);
    }

    #[test]
    fn test_need_just_above_whole_kwh_on_quarter_hours() {
        let config = SimConfig::new(15, SimConfig::default().start).unwrap();
        let mut battery = Battery::new(Rating::default(), 1.0, 0.5, config).unwrap();
        let outcome =
            size_for_peak_shaving(&mut battery, &[100.0, 140.0000036, 100.0], 100.0).unwrap();

        assert_eq!(outcome.sizing.power_kw, 41.0);
        assert_eq!(outcome.sizing.capacity_kwh, 11.0);
        assert!(outcome.sizing.objective_met);
        assert!(outcome.advisories.is_empty());
    }

    #[test]
    fn test_display() {
        let sizing = Sizing {
            power_kw: 50.0,
            capacity_kwh: 120.0,
            equivalent_full_cycles: 0.25,
            objective_met: true,
        };
        assert_eq!(
            sizing.to_string(),
            "Battery power: 50 kW, capacity: 120 kWh, efc: 0.250"
        );
    }
}
