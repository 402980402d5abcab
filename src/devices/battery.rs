use tracing::trace;

use crate::devices::curves::{self, CurveRow, Curves};
use crate::devices::rating::Rating;
use crate::error::{Error, Result};
use crate::sim::advisory::{Advisory, Direction};
use crate::sim::clock::Clock;
use crate::sim::types::SimConfig;

/// Default round-trip efficiency.
pub const DEFAULT_ROUND_TRIP_EFFICIENCY: f64 = 0.92;

/// SOC a battery starts from and returns to on [`Battery::reset`].
pub const DEFAULT_SOC: f64 = 0.5;

/// A stationary battery energy storage system.
///
/// `Battery` holds the rating, the efficiencies, the current state of charge
/// (SOC) and the recorded history. Every charge/discharge operation enforces
/// the power and SOC limits and appends exactly one record to the curves.
///
/// # Power Flow Convention
/// - Positive power: charging
/// - Negative power: discharging
///
/// # Examples
///
/// ```
/// use bess_sim::devices::Battery;
///
/// let mut battery = Battery::default();
/// battery.charge_max_possible();
/// assert_eq!(battery.curves().len(), 1);
/// assert!(battery.soc() > 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Battery {
    /// Power and capacity rating.
    rating: Rating,

    /// Charging efficiency, `sqrt(round_trip)`.
    eta_c: f64,

    /// Discharging efficiency, `sqrt(round_trip)`.
    eta_d: f64,

    /// State of charge as a fraction (0.0 to 1.0).
    soc: f64,

    config: SimConfig,
    clock: Clock,
    curves: Curves,

    /// Advisories raised since they were last taken.
    advisories: Vec<Advisory>,
}

impl Default for Battery {
    fn default() -> Self {
        let efficiency = DEFAULT_ROUND_TRIP_EFFICIENCY.sqrt();
        let config = SimConfig::default();
        Self {
            rating: Rating::default(),
            eta_c: efficiency,
            eta_d: efficiency,
            soc: DEFAULT_SOC,
            clock: Clock::new(config.start, config.step()),
            config,
            curves: Curves::default(),
            advisories: Vec::new(),
        }
    }
}

impl Battery {
    /// Creates a new battery with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `rating` - Power (kW, >= 0) and capacity (kWh, > 0)
    /// * `round_trip_efficiency` - Split evenly into charge and discharge efficiency (0..=1.0)
    /// * `initial_soc` - Initial state of charge as a fraction (0.0 to 1.0)
    /// * `config` - Time axis of the recorded curves
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the power is negative, the capacity is not
    /// positive, the efficiency is outside `(0, 1]` or the SOC is outside `[0, 1]`.
    pub fn new(
        rating: Rating,
        round_trip_efficiency: f64,
        initial_soc: f64,
        config: SimConfig,
    ) -> Result<Self> {
        if !(rating.power_kw >= 0.0) {
            return Err(Error::invalid_argument("power_kw must be >= 0"));
        }
        if !(rating.capacity_kwh > 0.0) {
            return Err(Error::invalid_argument("capacity_kwh must be > 0"));
        }
        if !(round_trip_efficiency > 0.0 && round_trip_efficiency <= 1.0) {
            return Err(Error::invalid_argument(
                "round_trip_efficiency must be in (0.0, 1.0]",
            ));
        }
        if !(0.0..=1.0).contains(&initial_soc) {
            return Err(Error::invalid_argument("initial_soc must be in [0.0, 1.0]"));
        }

        let efficiency = round_trip_efficiency.sqrt();
        Ok(Self {
            rating,
            eta_c: efficiency,
            eta_d: efficiency,
            soc: initial_soc,
            clock: Clock::new(config.start, config.step()),
            config,
            curves: Curves::default(),
            advisories: Vec::new(),
        })
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// Swaps in a new rating and returns the previous one.
    ///
    /// The SOC fraction and the recorded curves are kept as they are.
    pub fn replace_rating(&mut self, rating: Rating) -> Rating {
        std::mem::replace(&mut self.rating, rating)
    }

    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// Overrides the state of charge, clamped into `[0, 1]`.
    pub fn set_soc(&mut self, soc: f64) {
        self.soc = soc.clamp(0.0, 1.0);
    }

    pub fn charge_efficiency(&self) -> f64 {
        self.eta_c
    }

    pub fn discharge_efficiency(&self) -> f64 {
        self.eta_d
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn curves(&self) -> &Curves {
        &self.curves
    }

    /// Returns the recorded curves as rows.
    pub fn curves_table(&self) -> Vec<CurveRow> {
        self.curves.rows().collect()
    }

    /// Advisories raised since the last [`Battery::take_advisories`].
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Drains the pending advisories.
    pub fn take_advisories(&mut self) -> Vec<Advisory> {
        std::mem::take(&mut self.advisories)
    }

    /// Logs the advisory and queues it until the next take.
    pub(crate) fn push_advisory(&mut self, advisory: Advisory) {
        self.advisories.push(advisory.emit());
    }

    /// Clears the curves and pending advisories and returns the SOC to 0.5.
    ///
    /// The rating is left untouched.
    pub fn reset(&mut self) {
        self.curves.clear();
        self.clock.reset();
        self.advisories.clear();
        self.soc = DEFAULT_SOC;
    }

    /// Equivalent full cycles of the recorded SOC curve.
    pub fn equivalent_full_cycles(&self) -> f64 {
        curves::equivalent_full_cycles(self.curves.soc())
    }

    /// Charges with the requested energy in kWh and returns the appended record.
    ///
    /// The request is limited by the free capacity, `(1 - soc) * capacity / eta_c`,
    /// and by the rated power, `power * eta_c * step / 60`. Negative requests are
    /// treated as zero. With `warn` set, every clamp raises an advisory.
    pub fn charge_with_energy(&mut self, requested_kwh: f64, warn: bool) -> CurveRow {
        let soc_limit = (1.0 - self.soc) * self.rating.capacity_kwh / self.eta_c;
        let power_limit = self
            .config
            .power_to_energy(self.rating.power_kw * self.eta_c);
        let max_allowed = soc_limit.min(power_limit).max(0.0);
        let applied = self.clamp_request(requested_kwh, max_allowed, Direction::Charge, warn);

        let record = self.record(applied);
        if applied > 0.0 {
            self.soc += applied * self.eta_c / self.rating.capacity_kwh;
            self.soc = self.soc.clamp(0.0, 1.0);
        }
        record
    }

    /// Charges with the requested power in kW held for one step.
    pub fn charge_with_power(&mut self, requested_kw: f64, warn: bool) -> CurveRow {
        let requested_kwh = self.config.power_to_energy(requested_kw);
        self.charge_with_energy(requested_kwh, warn)
    }

    /// Charges at rated power, without advisories.
    pub fn charge_max_possible(&mut self) -> CurveRow {
        self.charge_with_power(self.rating.power_kw, false)
    }

    /// Discharges the requested energy in kWh and returns the appended record.
    ///
    /// The request is limited by the stored energy, `soc * capacity * eta_d`, and
    /// by the rated power, `power * step / 60`. The record carries negative power
    /// and energy.
    pub fn discharge_with_energy(&mut self, requested_kwh: f64, warn: bool) -> CurveRow {
        let soc_limit = self.soc * self.rating.capacity_kwh * self.eta_d;
        let power_limit = self.config.power_to_energy(self.rating.power_kw);
        let max_allowed = soc_limit.min(power_limit).max(0.0);
        let applied = self.clamp_request(requested_kwh, max_allowed, Direction::Discharge, warn);

        let record = self.record(-applied);
        if applied > 0.0 {
            self.soc -= applied / (self.rating.capacity_kwh * self.eta_d);
            self.soc = self.soc.clamp(0.0, 1.0);
        }
        record
    }

    /// Discharges with the requested power in kW held for one step.
    pub fn discharge_with_power(&mut self, requested_kw: f64, warn: bool) -> CurveRow {
        let requested_kwh = self.config.power_to_energy(requested_kw);
        self.discharge_with_energy(requested_kwh, warn)
    }

    /// Discharges at rated power, without advisories.
    pub fn discharge_max_possible(&mut self) -> CurveRow {
        self.discharge_with_power(self.rating.power_kw, false)
    }

    /// Idles for one step. A flat record is still appended.
    pub fn do_nothing(&mut self) -> CurveRow {
        self.charge_with_power(0.0, false)
    }

    fn clamp_request(
        &mut self,
        requested_kwh: f64,
        max_allowed_kwh: f64,
        direction: Direction,
        warn: bool,
    ) -> f64 {
        if (0.0..=max_allowed_kwh).contains(&requested_kwh) {
            return requested_kwh;
        }
        // Above the ceiling, negative or NaN.
        let applied = if requested_kwh > max_allowed_kwh {
            max_allowed_kwh
        } else {
            0.0
        };

        trace!(%direction, requested_kwh, applied_kwh = applied, "clamped request");
        if warn {
            let advisory = Advisory::ClampedValue {
                datetime: self.clock.peek(),
                direction,
                requested_kwh,
                applied_kwh: applied,
            };
            self.push_advisory(advisory);
        }
        applied
    }

    /// Appends one record with the pre-update SOC.
    fn record(&mut self, signed_energy_kwh: f64) -> CurveRow {
        let power_kw = self.config.energy_to_power(signed_energy_kwh);
        let record = CurveRow {
            datetime: self.clock.tick(),
            soc: self.soc,
            power_kw,
            energy_kwh: self.config.power_to_energy(power_kw),
        };
        self.curves.push(record);
        record
    }
}
