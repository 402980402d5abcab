use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::devices::Battery;
use crate::dispatch::{LIMIT_TOLERANCE_KW, max_value};
use crate::sim::advisory::Advisory;

/// One step of a limit-holding run (peak shaving or curtailment avoidance).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LimitRow {
    pub datetime: NaiveDateTime,
    /// Input value before the battery acted (load or production).
    pub original_kw: f64,
    /// Battery power, positive while charging.
    pub battery_kw: f64,
    /// Value seen at the connection point after the battery acted.
    pub new_kw: f64,
    /// SOC before the step.
    pub soc: f64,
}

/// Result of a peak shaving or curtailment avoidance run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LimitOutcome {
    pub rows: Vec<LimitRow>,
    pub limit_kw: f64,
    pub advisories: Vec<Advisory>,
}

impl LimitOutcome {
    /// `false` when the post-hoc check found the resulting curve above the limit.
    pub fn objective_met(&self) -> bool {
        !self
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::ObjectiveNotMet { .. }))
    }

    /// Highest input value, 0 for an empty run.
    pub fn original_peak_kw(&self) -> f64 {
        self.rows.iter().map(|r| r.original_kw).fold(0.0, f64::max)
    }

    /// Highest resulting value, 0 for an empty run.
    pub fn new_peak_kw(&self) -> f64 {
        self.rows.iter().map(|r| r.new_kw).fold(0.0, f64::max)
    }

    pub fn new_curve(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.new_kw).collect()
    }
}

/// Discharges whenever the load is above `peak_limit_kw` and recharges with
/// the headroom below it.
///
/// The resulting load is `load + battery_power`. If the battery is too small
/// the limit is not held; that is reported as an
/// [`Advisory::ObjectiveNotMet`] in the outcome, never as an error.
#[instrument(skip(battery, loadcurve), fields(steps = loadcurve.len()))]
pub fn peak_shaving(battery: &mut Battery, loadcurve: &[f64], peak_limit_kw: f64) -> LimitOutcome {
    let rows = shave(battery, loadcurve, peak_limit_kw);
    finish(battery, rows, peak_limit_kw)
}

/// Peak shaving without the post-hoc check.
pub(crate) fn shave(battery: &mut Battery, loadcurve: &[f64], peak_limit_kw: f64) -> Vec<LimitRow> {
    loadcurve
        .iter()
        .map(|&load| {
            let record = if load > peak_limit_kw {
                battery.discharge_with_power(load - peak_limit_kw, false)
            } else {
                battery.charge_with_power(peak_limit_kw - load, false)
            };
            LimitRow {
                datetime: record.datetime,
                original_kw: load,
                battery_kw: record.power_kw,
                new_kw: load + record.power_kw,
                soc: record.soc,
            }
        })
        .collect()
}

/// Runs the post-hoc limit check and drains the battery's advisories.
pub(crate) fn finish(battery: &mut Battery, rows: Vec<LimitRow>, limit_kw: f64) -> LimitOutcome {
    let new_kw: Vec<f64> = rows.iter().map(|r| r.new_kw).collect();
    if let Some(peak_kw) = max_value(&new_kw).filter(|&p| p > limit_kw + LIMIT_TOLERANCE_KW) {
        battery.push_advisory(Advisory::ObjectiveNotMet { limit_kw, peak_kw });
    }

    let outcome = LimitOutcome {
        rows,
        limit_kw,
        advisories: battery.take_advisories(),
    };
    debug!(
        limit_kw,
        new_peak_kw = outcome.new_peak_kw(),
        objective_met = outcome.objective_met(),
        "limit run finished"
    );
    outcome
}
