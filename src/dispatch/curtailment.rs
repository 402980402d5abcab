use tracing::instrument;

use crate::devices::Battery;
use crate::dispatch::peak_shaving::{LimitOutcome, LimitRow, finish};

/// Stores production above `peak_limit_kw` instead of curtailing it, and
/// feeds it back whenever production drops below the limit.
///
/// The battery starts empty. The exported value is
/// `production - battery_power` and is checked against the limit afterwards.
#[instrument(skip(battery, production), fields(steps = production.len()))]
pub fn curtailment_avoidance(
    battery: &mut Battery,
    production: &[f64],
    peak_limit_kw: f64,
) -> LimitOutcome {
    battery.set_soc(0.0);

    let rows = production
        .iter()
        .map(|&kw| {
            let record = if kw > peak_limit_kw {
                battery.charge_with_power(kw - peak_limit_kw, false)
            } else {
                battery.discharge_with_power(peak_limit_kw - kw, false)
            };
            LimitRow {
                datetime: record.datetime,
                original_kw: kw,
                battery_kw: record.power_kw,
                new_kw: kw - record.power_kw,
                soc: record.soc,
            }
        })
        .collect();

    finish(battery, rows, peak_limit_kw)
}
