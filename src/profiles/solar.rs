use rand::{SeedableRng, rngs::StdRng};

use crate::profiles::types::{Profile, daylight_frac, gaussian_noise, hour_of_day};

/// A solar PV generator that models production based on daylight hours.
///
/// `SolarPv` creates a half-cosine shaped production profile between sunrise and
/// sunset with configurable peak power and random noise to simulate variations
/// due to weather conditions. Production is reported as a positive kW value.
#[derive(Debug, Clone)]
pub struct SolarPv {
    /// Maximum power output in kilowatts under ideal conditions.
    pub kw_peak: f64,

    /// Hour of sunrise (inclusive).
    pub sunrise_hour: f64,

    /// Hour of sunset (exclusive).
    pub sunset_hour: f64,

    /// Standard deviation of the Gaussian noise as a fraction of output.
    pub noise_std: f64,

    /// Step length in minutes.
    step_minutes: u32,

    /// Random number generator for noise generation.
    rng: StdRng,
}

impl SolarPv {
    /// Creates a new solar PV generator with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `kw_peak` - Maximum power output in kilowatts under ideal conditions
    /// * `sunrise_hour` - Hour of the day when production starts
    /// * `sunset_hour` - Hour of the day when production stops
    /// * `noise_std` - Standard deviation of noise (e.g., 0.05 for +/-5% variation)
    /// * `step_minutes` - Step length in minutes
    /// * `seed` - Random seed for reproducible noise generation
    ///
    /// # Panics
    ///
    /// Panics if `sunrise_hour >= sunset_hour` or `sunset_hour > 24`.
    pub fn new(
        kw_peak: f64,
        sunrise_hour: f64,
        sunset_hour: f64,
        noise_std: f64,
        step_minutes: u32,
        seed: u64,
    ) -> Self {
        assert!(sunrise_hour < sunset_hour && sunset_hour <= 24.0);
        Self {
            kw_peak: kw_peak.max(0.0),
            sunrise_hour,
            sunset_hour,
            noise_std: noise_std.max(0.0),
            step_minutes: step_minutes.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Profile for SolarPv {
    /// Production at a specific time step, 0.0 during nighttime hours.
    fn value_at(&mut self, step: usize) -> f64 {
        let hour = hour_of_day(step, self.step_minutes);
        let frac = daylight_frac(hour, self.sunrise_hour, self.sunset_hour);
        if frac <= 0.0 {
            return 0.0;
        }

        let noise_mult = 1.0 + gaussian_noise(&mut self.rng, self.noise_std);
        (self.kw_peak * frac * noise_mult).max(0.0)
    }

    fn profile_type(&self) -> &'static str {
        "SolarPV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_solar_pv() {
        let pv = SolarPv::new(5.0, 6.0, 18.0, 0.05, 60, 42);
        assert_eq!(pv.kw_peak, 5.0);
        assert_eq!(pv.sunrise_hour, 6.0);
        assert_eq!(pv.sunset_hour, 18.0);
        assert_eq!(pv.noise_std, 0.05);
    }

    #[test]
    fn test_negative_kw_peak_clamped_to_zero() {
        let pv = SolarPv::new(-1.0, 6.0, 18.0, 0.05, 60, 42);
        assert_eq!(pv.kw_peak, 0.0);
    }

    #[test]
    #[should_panic]
    fn test_sunset_before_sunrise_panics() {
        SolarPv::new(5.0, 18.0, 6.0, 0.05, 60, 42);
    }

    #[test]
    #[should_panic]
    fn test_sunset_after_midnight_panics() {
        SolarPv::new(5.0, 6.0, 25.0, 0.05, 60, 42);
    }

    #[test]
    fn test_no_generation_at_night() {
        let mut pv = SolarPv::new(5.0, 6.0, 18.0, 0.0, 60, 42);
        assert_eq!(pv.value_at(0), 0.0);
        assert_eq!(pv.value_at(5), 0.0);
        assert_eq!(pv.value_at(18), 0.0);
        assert_eq!(pv.value_at(23), 0.0);
    }

    #[test]
    fn test_peak_generation_at_noon() {
        let mut pv = SolarPv::new(5.0, 6.0, 18.0, 0.0, 60, 42);
        let noon = pv.value_at(12);
        assert!(noon > 4.99 && noon <= 5.0);
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let mut pv1 = SolarPv::new(5.0, 6.0, 18.0, 0.1, 60, 42);
        let mut pv2 = SolarPv::new(5.0, 6.0, 18.0, 0.1, 60, 42);
        assert_eq!(pv1.sample(24), pv2.sample(24));
    }

    #[test]
    fn test_different_seeds_produce_different_results() {
        let mut pv1 = SolarPv::new(5.0, 6.0, 18.0, 0.1, 60, 42);
        let mut pv2 = SolarPv::new(5.0, 6.0, 18.0, 0.1, 60, 43);
        assert_ne!(pv1.sample(24), pv2.sample(24));
    }

    #[test]
    fn test_solar_never_negative() {
        let mut pv = SolarPv::new(5.0, 6.0, 18.0, 0.5, 60, 42);
        assert!(pv.sample(48).iter().all(|&kw| kw >= 0.0));
    }
}
