//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use bess_sim::devices::{Battery, Rating};
use bess_sim::sim::types::SimConfig;

/// Default time axis (60 min steps from 2021-01-01).
pub fn default_config() -> SimConfig {
    SimConfig::default()
}

/// Lossless battery, so SOC arithmetic is exact.
pub fn lossless_battery(power_kw: f64, capacity_kwh: f64, soc: f64) -> Battery {
    Battery::new(
        Rating::new(power_kw, capacity_kwh),
        1.0,
        soc,
        default_config(),
    )
    .expect("valid battery parameters")
}

/// Battery with the default 92% round-trip efficiency on quarter-hour steps.
pub fn quarter_hour_battery(power_kw: f64, capacity_kwh: f64) -> Battery {
    let config = SimConfig::new(15, default_config().start).expect("valid step");
    Battery::new(Rating::new(power_kw, capacity_kwh), 0.92, 0.5, config)
        .expect("valid battery parameters")
}

/// Flat load at `limit_kw` with a single spike of `spike_kw` above it.
pub fn single_spike(steps: usize, at: usize, limit_kw: f64, spike_kw: f64) -> Vec<f64> {
    let mut load = vec![limit_kw; steps];
    load[at] = limit_kw + spike_kw;
    load
}

/// Two humps per day around `base_kw`, 24 hourly values per day.
pub fn daily_load(days: usize, base_kw: f64, amp_kw: f64) -> Vec<f64> {
    (0..24 * days)
        .map(|h| {
            let angle = 2.0 * std::f64::consts::PI * (h % 24) as f64 / 12.0;
            base_kw + amp_kw * angle.sin()
        })
        .collect()
}

/// Half-sine production between 06:00 and 18:00, 24 hourly values per day.
pub fn daily_solar(days: usize, peak_kw: f64) -> Vec<f64> {
    (0..24 * days)
        .map(|h| {
            let hour = (h % 24) as f64;
            if (6.0..18.0).contains(&hour) {
                peak_kw * (std::f64::consts::PI * (hour - 6.0) / 12.0).sin()
            } else {
                0.0
            }
        })
        .collect()
}
