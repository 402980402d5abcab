use rand::{SeedableRng, rngs::StdRng};

use crate::profiles::types::{Profile, gaussian_noise, hour_of_day};

/// A load generator that models daily electricity consumption patterns.
///
/// `BaseLoad` creates a sinusoidal power demand pattern with configurable baseline,
/// amplitude, phase, and random noise to simulate typical daily load patterns.
///
/// # Examples
///
/// ```
/// use bess_sim::profiles::{BaseLoad, Profile};
///
/// // A 100 kW site swinging by ±40 kW over the day, quarter-hour steps
/// let mut load = BaseLoad::new(100.0, 40.0, 0.0, 0.0, 15, 42);
/// let day = load.sample(96);
/// assert_eq!(day.len(), 96);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLoad {
    /// Baseline power consumption in kilowatts
    pub base_kw: f64,

    /// Amplitude of the sinusoidal variation in kilowatts
    pub amp_kw: f64,

    /// Phase offset of the sinusoidal pattern in radians
    pub phase_rad: f64,

    /// Standard deviation of the Gaussian noise in kilowatts
    pub noise_std: f64,

    /// Step length in minutes
    step_minutes: u32,

    /// Random number generator for noise generation
    rng: StdRng,
}

impl BaseLoad {
    /// Creates a new baseload generator with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `base_kw` - The baseline power consumption in kilowatts
    /// * `amp_kw` - The amplitude of sinusoidal daily variation in kilowatts
    /// * `phase_rad` - The phase offset in radians (0 = rising through the mean at midnight)
    /// * `noise_std` - The standard deviation of Gaussian noise in kilowatts
    /// * `step_minutes` - Step length in minutes
    /// * `seed` - Random seed for reproducible noise generation
    pub fn new(
        base_kw: f64,
        amp_kw: f64,
        phase_rad: f64,
        noise_std: f64,
        step_minutes: u32,
        seed: u64,
    ) -> Self {
        Self {
            base_kw,
            amp_kw,
            phase_rad,
            noise_std: noise_std.max(0.0),
            step_minutes: step_minutes.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Profile for BaseLoad {
    /// Power demand combining the baseline, a daily sinusoid and Gaussian noise.
    ///
    /// The demand is guaranteed to be non-negative.
    fn value_at(&mut self, step: usize) -> f64 {
        let day_pos = hour_of_day(step, self.step_minutes) / 24.0; // [0,1)
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.phase_rad;
        let noise = gaussian_noise(&mut self.rng, self.noise_std);

        let kw = self.base_kw + self.amp_kw * angle.sin() + noise;
        kw.max(0.0) // no negative demand
    }

    fn profile_type(&self) -> &'static str {
        "BaseLoad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_baseload() {
        let load = BaseLoad::new(1.0, 0.5, 0.0, -0.1, 60, 42);
        assert_eq!(load.base_kw, 1.0);
        assert_eq!(load.amp_kw, 0.5);
        assert_eq!(load.noise_std, 0.0);
        assert_eq!(load.profile_type(), "BaseLoad");
    }

    #[test]
    fn test_noise_free_shape() {
        let mut load = BaseLoad::new(1.0, 0.5, 0.0, 0.0, 60, 42);
        assert!((load.value_at(0) - 1.0).abs() < 1e-12);
        assert!((load.value_at(6) - 1.5).abs() < 1e-12);
        assert!((load.value_at(18) - 0.5).abs() < 1e-12);
        // one day later the pattern repeats
        assert!((load.value_at(30) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_never_negative() {
        let mut load = BaseLoad::new(0.1, 1.0, 0.0, 0.5, 15, 3);
        assert!(load.sample(96 * 3).iter().all(|&kw| kw >= 0.0));
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let mut a = BaseLoad::new(1.0, 0.5, 1.2, 0.1, 60, 42);
        let mut b = BaseLoad::new(1.0, 0.5, 1.2, 0.1, 60, 42);
        assert_eq!(a.sample(48), b.sample(48));
    }
}
