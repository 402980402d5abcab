//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, TimeDelta};
use serde::Deserialize;
use thiserror::Error;

use crate::devices::{Battery, Rating};
use crate::error::Result;
use crate::io::import::read_series;
use crate::profiles::{BaseLoad, PriceCurve, Profile, SolarPv};
use crate::sim::types::SimConfig;

/// Seed offsets keep the synthetic series uncorrelated under one master seed.
const SOLAR_SEED_OFFSET: u64 = 1;
const PRICE_SEED_OFFSET: u64 = 2;

/// Accepted layouts of `simulation.start`.
const START_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the arbitrage preset. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or use one of the presets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Time axis.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Battery rating and initial state.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Strategy to run and its parameters.
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Input series read from CSV files.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// Synthetic series used where no input file is given.
    #[serde(default)]
    pub profiles: ProfilesConfig,
}

/// Time axis of the run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Step length in minutes (must be > 0).
    pub step_minutes: u32,
    /// Timestamp of the first record, e.g. `"2021-01-01T00:00:00"`.
    pub start: String,
    /// Length of the synthetic series (must be > 0).
    pub steps: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_minutes: 60,
            start: "2021-01-01T00:00:00".to_string(),
            steps: 48,
        }
    }
}

/// Battery rating and initial state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Rated power (kW).
    pub power_kw: f64,
    /// Net capacity (kWh).
    pub capacity_kwh: f64,
    /// Round-trip efficiency (0.0–1.0).
    pub round_trip_efficiency: f64,
    /// Initial state of charge (0.0–1.0).
    pub initial_soc: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            power_kw: 1000.0,
            capacity_kwh: 1000.0,
            round_trip_efficiency: 0.92,
            initial_soc: 0.5,
        }
    }
}

/// Dispatch strategy of a scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKind {
    #[default]
    Arbitrage,
    PeakShaving,
    CurtailmentAvoidance,
    LoadFollowing,
}

impl fmt::Display for ApplicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Arbitrage => "arbitrage",
            Self::PeakShaving => "peak_shaving",
            Self::CurtailmentAvoidance => "curtailment_avoidance",
            Self::LoadFollowing => "load_following",
        })
    }
}

impl ApplicationKind {
    /// Whether the strategy can be sized.
    pub fn is_sizable(self) -> bool {
        matches!(self, Self::PeakShaving | Self::LoadFollowing)
    }
}

/// Strategy parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplicationConfig {
    pub kind: ApplicationKind,
    /// Highest price to buy at (€/MWh).
    pub buy_price: f64,
    /// Lowest price to sell at (€/MWh).
    pub sell_price: f64,
    /// Limit for peak shaving and curtailment avoidance (kW).
    pub peak_limit_kw: f64,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            kind: ApplicationKind::Arbitrage,
            buy_price: 35.0,
            sell_price: 65.0,
            peak_limit_kw: 1000.0,
        }
    }
}

/// Optional CSV inputs. See [`read_series`] for the accepted layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    /// Prices (€/MWh).
    pub prices: Option<PathBuf>,
    /// Site load (kW).
    pub load: Option<PathBuf>,
    /// Local production (kW).
    pub production: Option<PathBuf>,
}

/// Synthetic series parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfilesConfig {
    /// Master random seed.
    pub seed: u64,
    pub load: LoadProfileConfig,
    pub solar: SolarProfileConfig,
    pub price: PriceProfileConfig,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            load: LoadProfileConfig::default(),
            solar: SolarProfileConfig::default(),
            price: PriceProfileConfig::default(),
        }
    }
}

/// Site load profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadProfileConfig {
    /// Baseline consumption (kW).
    pub base_kw: f64,
    /// Sinusoidal amplitude (kW).
    pub amp_kw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (kW).
    pub noise_std: f64,
}

impl Default for LoadProfileConfig {
    fn default() -> Self {
        Self {
            base_kw: 800.0,
            amp_kw: 300.0,
            phase_rad: 1.2,
            noise_std: 40.0,
        }
    }
}

/// Solar production profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarProfileConfig {
    /// Peak generation (kW).
    pub kw_peak: f64,
    /// Hour of sunrise.
    pub sunrise_hour: f64,
    /// Hour of sunset.
    pub sunset_hour: f64,
    /// Noise standard deviation as a fraction of output.
    pub noise_std: f64,
}

impl Default for SolarProfileConfig {
    fn default() -> Self {
        Self {
            kw_peak: 1500.0,
            sunrise_hour: 6.0,
            sunset_hour: 20.0,
            noise_std: 0.05,
        }
    }
}

/// Day-ahead price profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriceProfileConfig {
    /// Average price (€/MWh).
    pub base_eur_per_mwh: f64,
    /// Amplitude of the twice-daily swing (€/MWh).
    pub amp_eur_per_mwh: f64,
    /// Noise standard deviation (€/MWh).
    pub noise_std: f64,
}

impl Default for PriceProfileConfig {
    fn default() -> Self {
        Self {
            base_eur_per_mwh: 50.0,
            amp_eur_per_mwh: 30.0,
            noise_std: 5.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.step_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Timestamp of the last step, `None` if it is not representable.
fn end_of_axis(start: NaiveDateTime, sim: &SimulationConfig) -> Option<NaiveDateTime> {
    let last = i32::try_from(sim.steps.saturating_sub(1)).ok()?;
    let span = TimeDelta::try_minutes(i64::from(sim.step_minutes))?.checked_mul(last)?;
    start.checked_add_signed(span)
}

/// Input series of a scenario.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    pub prices: Vec<f64>,
    pub load: Vec<f64>,
    pub production: Vec<f64>,
}

impl ScenarioConfig {
    /// Price arbitrage on a synthetic day-ahead curve.
    pub fn arbitrage() -> Self {
        Self::default()
    }

    /// Peak shaving of a commercial site on quarter-hour steps.
    pub fn peak_shaving() -> Self {
        Self {
            simulation: SimulationConfig {
                step_minutes: 15,
                steps: 96 * 2,
                ..SimulationConfig::default()
            },
            battery: BatteryConfig {
                power_kw: 250.0,
                capacity_kwh: 800.0,
                initial_soc: 1.0,
                ..BatteryConfig::default()
            },
            application: ApplicationConfig {
                kind: ApplicationKind::PeakShaving,
                peak_limit_kw: 1000.0,
                ..ApplicationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Curtailment avoidance below an export limit.
    pub fn curtailment() -> Self {
        Self {
            battery: BatteryConfig {
                power_kw: 500.0,
                capacity_kwh: 2000.0,
                ..BatteryConfig::default()
            },
            application: ApplicationConfig {
                kind: ApplicationKind::CurtailmentAvoidance,
                peak_limit_kw: 1000.0,
                ..ApplicationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Covering the site load from local solar.
    pub fn load_following() -> Self {
        Self {
            battery: BatteryConfig {
                power_kw: 800.0,
                capacity_kwh: 4000.0,
                ..BatteryConfig::default()
            },
            application: ApplicationConfig {
                kind: ApplicationKind::LoadFollowing,
                ..ApplicationConfig::default()
            },
            profiles: ProfilesConfig {
                load: LoadProfileConfig {
                    base_kw: 500.0,
                    amp_kw: 150.0,
                    noise_std: 20.0,
                    ..LoadProfileConfig::default()
                },
                solar: SolarProfileConfig {
                    kw_peak: 1800.0,
                    ..SolarProfileConfig::default()
                },
                ..ProfilesConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["arbitrage", "peak_shaving", "curtailment", "load_following"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "arbitrage" => Ok(Self::arbitrage()),
            "peak_shaving" => Ok(Self::peak_shaving()),
            "curtailment" => Ok(Self::curtailment()),
            "load_following" => Ok(Self::load_following()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if s.step_minutes == 0 {
            errors.push(ConfigError::new("simulation.step_minutes", "must be > 0"));
        }
        if s.steps == 0 {
            errors.push(ConfigError::new("simulation.steps", "must be > 0"));
        }
        match self.start() {
            Ok(start) if s.step_minutes > 0 && end_of_axis(start, s).is_none() => {
                errors.push(ConfigError::new(
                    "simulation.steps",
                    "step_minutes * steps runs past the last representable timestamp",
                ));
            }
            Ok(_) => {}
            Err(e) => errors.push(e),
        }

        let bat = &self.battery;
        if !(bat.power_kw >= 0.0) {
            errors.push(ConfigError::new("battery.power_kw", "must be >= 0"));
        }
        if !(bat.capacity_kwh > 0.0) {
            errors.push(ConfigError::new("battery.capacity_kwh", "must be > 0"));
        }
        if !(bat.round_trip_efficiency > 0.0 && bat.round_trip_efficiency <= 1.0) {
            errors.push(ConfigError::new(
                "battery.round_trip_efficiency",
                "must be in (0.0, 1.0]",
            ));
        }
        if !(0.0..=1.0).contains(&bat.initial_soc) {
            errors.push(ConfigError::new("battery.initial_soc", "must be in [0.0, 1.0]"));
        }

        let app = &self.application;
        if app.kind == ApplicationKind::Arbitrage && !(app.buy_price < app.sell_price) {
            errors.push(ConfigError::new(
                "application.buy_price",
                "must be < application.sell_price",
            ));
        }
        if !app.peak_limit_kw.is_finite() {
            errors.push(ConfigError::new("application.peak_limit_kw", "must be finite"));
        }

        let sol = &self.profiles.solar;
        if !(sol.sunrise_hour >= 0.0 && sol.sunrise_hour < sol.sunset_hour) {
            errors.push(ConfigError::new(
                "profiles.solar.sunrise_hour",
                "must be >= 0 and < profiles.solar.sunset_hour",
            ));
        }
        if sol.sunset_hour > 24.0 {
            errors.push(ConfigError::new("profiles.solar.sunset_hour", "must be <= 24"));
        }

        errors
    }

    /// Parsed `simulation.start`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if no accepted layout matches.
    pub fn start(&self) -> Result<NaiveDateTime, ConfigError> {
        let start = self.simulation.start.trim();
        START_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(start, fmt).ok())
            .ok_or_else(|| {
                ConfigError::new(
                    "simulation.start",
                    format!("\"{start}\" is not an ISO-8601 timestamp"),
                )
            })
    }

    /// Time axis for the battery.
    ///
    /// # Errors
    ///
    /// Fails if the start cannot be parsed or the step is zero.
    pub fn sim_config(&self) -> Result<SimConfig> {
        SimConfig::new(self.simulation.step_minutes, self.start()?)
    }

    /// Builds the configured battery.
    ///
    /// # Errors
    ///
    /// Fails if the time axis or the battery parameters are invalid.
    pub fn build_battery(&self) -> Result<Battery> {
        let bat = &self.battery;
        Battery::new(
            Rating::new(bat.power_kw, bat.capacity_kwh),
            bat.round_trip_efficiency,
            bat.initial_soc,
            self.sim_config()?,
        )
    }

    /// Loads every input series, from CSV where a path is configured and
    /// from the synthetic profiles otherwise.
    ///
    /// # Errors
    ///
    /// Fails if a CSV file cannot be read or the solar window is invalid.
    pub fn load_inputs(&self) -> Result<Inputs> {
        let steps = self.simulation.steps;
        let step_minutes = self.simulation.step_minutes;
        let p = &self.profiles;

        let prices = match &self.inputs.prices {
            Some(path) => read_series(path, None)?,
            None => PriceCurve::new(
                p.price.base_eur_per_mwh,
                p.price.amp_eur_per_mwh,
                p.price.noise_std,
                step_minutes,
                p.seed.wrapping_add(PRICE_SEED_OFFSET),
            )
            .sample(steps),
        };

        let load = match &self.inputs.load {
            Some(path) => read_series(path, None)?,
            None => BaseLoad::new(
                p.load.base_kw,
                p.load.amp_kw,
                p.load.phase_rad,
                p.load.noise_std,
                step_minutes,
                p.seed,
            )
            .sample(steps),
        };

        let production = match &self.inputs.production {
            Some(path) => read_series(path, None)?,
            None => {
                let sol = &p.solar;
                if !(sol.sunrise_hour < sol.sunset_hour && sol.sunset_hour <= 24.0) {
                    return Err(ConfigError::new(
                        "profiles.solar",
                        "sunrise_hour must be < sunset_hour <= 24",
                    )
                    .into());
                }
                SolarPv::new(
                    sol.kw_peak,
                    sol.sunrise_hour,
                    sol.sunset_hour,
                    sol.noise_std,
                    step_minutes,
                    p.seed.wrapping_add(SOLAR_SEED_OFFSET),
                )
                .sample(steps)
            }
        };

        Ok(Inputs {
            prices,
            load,
            production,
        })
    }
}
