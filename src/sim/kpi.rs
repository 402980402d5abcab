//! Post-hoc KPI computation from recorded battery curves.

use std::fmt;

use serde::Serialize;

use crate::devices::curves::{self, Curves};

/// Aggregate key performance indicators of one battery run.
///
/// Computed post-hoc from the recorded [`Curves`] so the reported figures
/// always agree with the history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiReport {
    /// Number of recorded steps.
    pub steps: usize,
    /// Energy taken from the grid side while charging (kWh).
    pub charged_kwh: f64,
    /// Energy delivered while discharging (kWh, positive magnitude).
    pub discharged_kwh: f64,
    /// Total battery energy throughput (kWh, sum of |energy|).
    pub throughput_kwh: f64,
    /// Throughput-based cycles (throughput / 2*capacity).
    pub throughput_cycles: f64,
    /// Equivalent full cycles from the SOC curve.
    pub equivalent_full_cycles: f64,
    /// Lowest recorded SOC.
    pub min_soc: f64,
    /// Highest recorded SOC.
    pub max_soc: f64,
}

impl KpiReport {
    /// Computes all KPIs from the recorded curves.
    ///
    /// # Arguments
    ///
    /// * `curves` - History of a complete run
    /// * `capacity_kwh` - Battery capacity for the throughput cycle count
    pub fn from_curves(curves: &Curves, capacity_kwh: f64) -> Self {
        if curves.is_empty() {
            return Self {
                steps: 0,
                charged_kwh: 0.0,
                discharged_kwh: 0.0,
                throughput_kwh: 0.0,
                throughput_cycles: 0.0,
                equivalent_full_cycles: 0.0,
                min_soc: 0.0,
                max_soc: 0.0,
            };
        }

        let mut charged = 0.0_f64;
        let mut discharged = 0.0_f64;
        for &e in curves.energy_kwh() {
            if e > 0.0 {
                charged += e;
            } else {
                discharged -= e;
            }
        }

        let soc = curves.soc();
        let min_soc = soc.iter().copied().fold(f64::INFINITY, f64::min);
        let max_soc = soc.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let throughput = charged + discharged;
        let cycles = if capacity_kwh > 0.0 {
            throughput / (2.0 * capacity_kwh)
        } else {
            0.0
        };

        Self {
            steps: curves.len(),
            charged_kwh: charged,
            discharged_kwh: discharged,
            throughput_kwh: throughput,
            throughput_cycles: cycles,
            equivalent_full_cycles: curves::equivalent_full_cycles(soc),
            min_soc,
            max_soc,
        }
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Steps:                 {}", self.steps)?;
        writeln!(f, "Energy charged:        {:.2} kWh", self.charged_kwh)?;
        writeln!(f, "Energy discharged:     {:.2} kWh", self.discharged_kwh)?;
        writeln!(
            f,
            "Battery throughput:    {:.2} kWh ({:.2} throughput cycles)",
            self.throughput_kwh, self.throughput_cycles
        )?;
        writeln!(f, "Equivalent cycles:     {:.3}", self.equivalent_full_cycles)?;
        write!(
            f,
            "SOC range:             {:.1}% .. {:.1}%",
            self.min_soc * 100.0,
            self.max_soc * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{Battery, Rating};
    use crate::sim::types::SimConfig;

    fn lossless(capacity_kwh: f64) -> Battery {
        Battery::new(
            Rating::new(10.0, capacity_kwh),
            1.0,
            0.5,
            SimConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn battery_throughput() {
        // energies: [2.0, -3.0, 1.0, -1.0]
        // throughput = 2 + 3 + 1 + 1 = 7.0 kWh
        let mut battery = lossless(10.0);
        battery.charge_with_energy(2.0, false);
        battery.discharge_with_energy(3.0, false);
        battery.charge_with_energy(1.0, false);
        battery.discharge_with_energy(1.0, false);

        let kpi = KpiReport::from_curves(battery.curves(), 10.0);
        assert_eq!(kpi.steps, 4);
        assert!((kpi.charged_kwh - 3.0).abs() < 1e-9);
        assert!((kpi.discharged_kwh - 4.0).abs() < 1e-9);
        assert!((kpi.throughput_kwh - 7.0).abs() < 1e-9);
        assert!((kpi.throughput_cycles - 0.35).abs() < 1e-9);
    }

    #[test]
    fn soc_range_and_cycles() {
        let mut battery = lossless(10.0);
        battery.charge_with_energy(2.0, false);
        battery.discharge_with_energy(4.0, false);
        battery.do_nothing();

        let kpi = KpiReport::from_curves(battery.curves(), 10.0);
        assert!((kpi.min_soc - 0.3).abs() < 1e-9);
        assert!((kpi.max_soc - 0.7).abs() < 1e-9);
        assert!((kpi.equivalent_full_cycles - battery.equivalent_full_cycles()).abs() < 1e-12);
    }

    #[test]
    fn empty_curves() {
        let kpi = KpiReport::from_curves(&Curves::default(), 10.0);
        assert_eq!(kpi.steps, 0);
        assert_eq!(kpi.throughput_kwh, 0.0);
    }

    #[test]
    fn zero_capacity_has_no_cycles() {
        let mut battery = lossless(10.0);
        battery.charge_with_energy(2.0, false);
        let kpi = KpiReport::from_curves(battery.curves(), 0.0);
        assert_eq!(kpi.throughput_cycles, 0.0);
    }
}
