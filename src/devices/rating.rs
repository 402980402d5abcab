use serde::Serialize;

/// Nameplate rating of a battery.
///
/// Sizing swaps one rating for another between its probe and final runs,
/// see [`crate::devices::Battery::replace_rating`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rating {
    /// Maximum instantaneous charge/discharge power in kW.
    pub power_kw: f64,
    /// Usable energy capacity in kWh, before efficiency losses.
    pub capacity_kwh: f64,
}

impl Default for Rating {
    fn default() -> Self {
        Self {
            power_kw: 1000.0,
            capacity_kwh: 1000.0,
        }
    }
}

impl Rating {
    pub fn new(power_kw: f64, capacity_kwh: f64) -> Self {
        Self {
            power_kw,
            capacity_kwh,
        }
    }

    /// Energy-to-power ratio in hours.
    pub fn duration_hours(&self) -> f64 {
        if self.power_kw > 0.0 {
            self.capacity_kwh / self.power_kw
        } else {
            f64::INFINITY
        }
    }
}
