//! Common types and helpers for synthetic input profiles.

use rand::{Rng, rngs::StdRng};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A generator of one synthetic input series.
///
/// Profiles only feed the dispatch strategies with demo inputs; the
/// simulation itself never draws random numbers.
pub trait Profile {
    /// Returns the value at the specified time step.
    ///
    /// # Arguments
    ///
    /// * `step` - Index of the step since the start of the series
    fn value_at(&mut self, step: usize) -> f64;

    /// Returns a human-readable type name for the profile.
    fn profile_type(&self) -> &'static str;

    /// Samples the first `steps` values.
    fn sample(&mut self, steps: usize) -> Vec<f64> {
        (0..steps).map(|t| self.value_at(t)).collect()
    }
}

/// Position of `step` within its day, in hours `[0, 24)`.
pub fn hour_of_day(step: usize, step_minutes: u32) -> f64 {
    let minutes = (step as u64 * u64::from(step_minutes)) % u64::from(MINUTES_PER_DAY);
    minutes as f64 / 60.0
}

/// Half-cosine daylight shape: 0 outside `[sunrise, sunset)`, 1 at solar noon.
pub fn daylight_frac(hour: f64, sunrise_hour: f64, sunset_hour: f64) -> f64 {
    if hour < sunrise_hour || hour >= sunset_hour {
        return 0.0;
    }
    let pos = (hour - sunrise_hour) / (sunset_hour - sunrise_hour);
    (std::f64::consts::PI * pos).sin().max(0.0)
}

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified standard deviation
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}
