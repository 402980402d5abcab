use rand::{SeedableRng, rngs::StdRng};

use crate::profiles::types::{Profile, gaussian_noise, hour_of_day};

/// Day-ahead style price curve in €/MWh.
///
/// Two daily humps (morning and evening) on top of a base price, with a
/// midday dip and Gaussian noise. Prices may go negative.
#[derive(Debug, Clone)]
pub struct PriceCurve {
    /// Average price in €/MWh.
    pub base_eur_per_mwh: f64,

    /// Amplitude of the twice-daily swing in €/MWh.
    pub amp_eur_per_mwh: f64,

    /// Standard deviation of the noise in €/MWh.
    pub noise_std: f64,

    step_minutes: u32,
    rng: StdRng,
}

impl PriceCurve {
    pub fn new(
        base_eur_per_mwh: f64,
        amp_eur_per_mwh: f64,
        noise_std: f64,
        step_minutes: u32,
        seed: u64,
    ) -> Self {
        Self {
            base_eur_per_mwh,
            amp_eur_per_mwh,
            noise_std: noise_std.max(0.0),
            step_minutes: step_minutes.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Profile for PriceCurve {
    fn value_at(&mut self, step: usize) -> f64 {
        // Troughs at 04:00 and 16:00, peaks at 10:00 and 22:00.
        let hour = hour_of_day(step, self.step_minutes);
        let angle = 4.0 * std::f64::consts::PI * (hour - 4.0) / 24.0;
        let swing = -angle.cos();
        self.base_eur_per_mwh
            + self.amp_eur_per_mwh * swing
            + gaussian_noise(&mut self.rng, self.noise_std)
    }

    fn profile_type(&self) -> &'static str {
        "PriceCurve"
    }
}
