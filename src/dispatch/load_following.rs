use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::devices::Battery;
use crate::dispatch::min_value;
use crate::dispatch::peak_shaving::shave;
use crate::error::{Error, Result};
use crate::sim::advisory::Advisory;

/// Residual load lifted so that it never drops below zero.
///
/// `curve[i] = load[i] - production[i] + shift_kw`. Holding this curve at
/// `shift_kw` is the same problem as covering the load from stored production.
#[derive(Debug, Clone, PartialEq)]
pub struct EquivalentCurve {
    pub curve: Vec<f64>,
    pub shift_kw: f64,
}

/// Builds the peak shaving problem equivalent to load following.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the series differ in length.
pub fn equivalent_peak_shaving_curve(production: &[f64], load: &[f64]) -> Result<EquivalentCurve> {
    if production.len() != load.len() {
        return Err(Error::invalid_argument(format!(
            "production has {} values but load has {}",
            production.len(),
            load.len()
        )));
    }

    let residual: Vec<f64> = load.iter().zip(production).map(|(l, p)| l - p).collect();
    let shift_kw = min_value(&residual).map_or(0.0, f64::abs);
    Ok(EquivalentCurve {
        curve: residual.iter().map(|r| r + shift_kw).collect(),
        shift_kw,
    })
}

/// One step of a load following run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadFollowingRow {
    pub datetime: NaiveDateTime,
    pub original_load_kw: f64,
    /// Load neither covered by production nor by the battery.
    pub uncovered_load_kw: f64,
    pub soc: f64,
}

/// Result of a load following run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadFollowingOutcome {
    pub rows: Vec<LoadFollowingRow>,
    /// Share of the load covered locally, `1 - uncovered / load`.
    pub self_sufficiency: f64,
    /// Share of the production consumed locally.
    pub own_consumption_ratio: f64,
    pub advisories: Vec<Advisory>,
}

/// Covers the load from local production, storing surplus production in the
/// battery for later.
///
/// The battery starts full. The run is peak shaving of the
/// [`equivalent_peak_shaving_curve`] at its shift, shifted back and floored
/// at zero. Both ratios are 0 when their denominator is 0.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the series differ in length.
#[instrument(skip(battery, production, load), fields(steps = load.len()))]
pub fn load_following(
    battery: &mut Battery,
    production: &[f64],
    load: &[f64],
) -> Result<LoadFollowingOutcome> {
    let equivalent = equivalent_peak_shaving_curve(production, load)?;
    battery.set_soc(1.0);

    let shaved = shave(battery, &equivalent.curve, equivalent.shift_kw);
    let rows: Vec<LoadFollowingRow> = shaved
        .iter()
        .zip(load)
        .map(|(row, &original_load_kw)| LoadFollowingRow {
            datetime: row.datetime,
            original_load_kw,
            uncovered_load_kw: (row.new_kw - equivalent.shift_kw).max(0.0),
            soc: row.soc,
        })
        .collect();

    let total_load: f64 = load.iter().sum();
    let total_production: f64 = production.iter().sum();
    let total_uncovered: f64 = rows.iter().map(|r| r.uncovered_load_kw).sum();

    let self_sufficiency = if total_load != 0.0 {
        1.0 - total_uncovered / total_load
    } else {
        0.0
    };
    let own_consumption_ratio = if total_production != 0.0 {
        self_sufficiency * total_load / total_production
    } else {
        0.0
    };

    debug!(
        shift_kw = equivalent.shift_kw,
        self_sufficiency, own_consumption_ratio, "load following finished"
    );
    Ok(LoadFollowingOutcome {
        rows,
        self_sufficiency,
        own_consumption_ratio,
        advisories: battery.take_advisories(),
    })
}
