//! Append-only history of battery records.

use chrono::NaiveDateTime;
use serde::Serialize;

/// One row of the battery history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveRow {
    pub datetime: NaiveDateTime,
    /// State of charge *before* the step's action was applied.
    pub soc: f64,
    /// Positive while charging, negative while discharging.
    pub power_kw: f64,
    /// Energy moved during the step, same sign convention as `power_kw`.
    pub energy_kwh: f64,
}

/// Four parallel sequences indexed by step.
///
/// Records can only be appended as a whole, so the sequences always have
/// the same length.
#[derive(Debug, Clone, Default)]
pub struct Curves {
    datetime: Vec<NaiveDateTime>,
    power_kw: Vec<f64>,
    energy_kwh: Vec<f64>,
    soc: Vec<f64>,
}

impl Curves {
    pub(crate) fn push(&mut self, row: CurveRow) {
        self.datetime.push(row.datetime);
        self.power_kw.push(row.power_kw);
        self.energy_kwh.push(row.energy_kwh);
        self.soc.push(row.soc);
    }

    pub(crate) fn clear(&mut self) {
        self.datetime.clear();
        self.power_kw.clear();
        self.energy_kwh.clear();
        self.soc.clear();
    }

    pub fn len(&self) -> usize {
        self.datetime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datetime.is_empty()
    }

    pub fn datetime(&self) -> &[NaiveDateTime] {
        &self.datetime
    }

    pub fn power_kw(&self) -> &[f64] {
        &self.power_kw
    }

    pub fn energy_kwh(&self) -> &[f64] {
        &self.energy_kwh
    }

    pub fn soc(&self) -> &[f64] {
        &self.soc
    }

    fn row(&self, i: usize) -> CurveRow {
        CurveRow {
            datetime: self.datetime[i],
            soc: self.soc[i],
            power_kw: self.power_kw[i],
            energy_kwh: self.energy_kwh[i],
        }
    }

    /// Zips the four sequences into rows.
    pub fn rows(&self) -> impl Iterator<Item = CurveRow> + '_ {
        (0..self.len()).map(|i| self.row(i))
    }
}

/// Equivalent full cycles of a recorded SOC sequence.
///
/// Sums `|soc[i + 1] - soc[i]|` for `i` in `0..n - 2` and halves the result.
/// The final pair is left out so figures stay comparable with earlier sizing
/// reports. This looks like an off-by-one and undercounts the last
/// transition.
pub fn equivalent_full_cycles(soc: &[f64]) -> f64 {
    if soc.len() < 2 {
        return 0.0;
    }
    let swing: f64 = soc
        .windows(2)
        .take(soc.len() - 2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .sum();
    swing / 2.0
}
