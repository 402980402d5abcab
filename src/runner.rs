//! Config-driven runs: build the battery and inputs, then dispatch or size.

use serde::Serialize;
use tracing::info;

use crate::config::{ApplicationKind, ConfigError, ScenarioConfig};
use crate::devices::{Battery, CurveRow};
use crate::dispatch::{
    ArbitrageOutcome, LimitOutcome, LoadFollowingOutcome, arbitrage, curtailment_avoidance,
    load_following, peak_shaving,
};
use crate::error::Result;
use crate::sim::advisory::Advisory;
use crate::sim::kpi::KpiReport;
use crate::sizing::{SizingOutcome, size_for_load_following, size_for_peak_shaving};

/// Strategy result of a scenario run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "application", rename_all = "snake_case")]
pub enum RunOutcome {
    Arbitrage(ArbitrageOutcome),
    PeakShaving(LimitOutcome),
    CurtailmentAvoidance(LimitOutcome),
    LoadFollowing(LoadFollowingOutcome),
}

impl RunOutcome {
    pub fn advisories(&self) -> &[Advisory] {
        match self {
            Self::Arbitrage(o) => &o.advisories,
            Self::PeakShaving(o) | Self::CurtailmentAvoidance(o) => &o.advisories,
            Self::LoadFollowing(o) => &o.advisories,
        }
    }
}

/// Everything a scenario run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub kpi: KpiReport,
    pub curves: Vec<CurveRow>,
}

/// Rejects the scenario with its first validation error.
fn check(cfg: &ScenarioConfig) -> Result<()> {
    match cfg.validate().into_iter().next() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Runs the scenario's strategy on its inputs.
///
/// # Errors
///
/// Fails if the scenario does not validate, the battery or inputs cannot be
/// built or the strategy rejects its arguments.
pub fn run_scenario(cfg: &ScenarioConfig) -> Result<RunReport> {
    check(cfg)?;
    let mut battery = cfg.build_battery()?;
    let inputs = cfg.load_inputs()?;
    let app = &cfg.application;
    info!(application = %app.kind, steps = cfg.simulation.steps, "running scenario");

    let outcome = match app.kind {
        ApplicationKind::Arbitrage => RunOutcome::Arbitrage(arbitrage(
            &mut battery,
            &inputs.prices,
            app.buy_price,
            app.sell_price,
        )?),
        ApplicationKind::PeakShaving => {
            RunOutcome::PeakShaving(peak_shaving(&mut battery, &inputs.load, app.peak_limit_kw))
        }
        ApplicationKind::CurtailmentAvoidance => RunOutcome::CurtailmentAvoidance(
            curtailment_avoidance(&mut battery, &inputs.production, app.peak_limit_kw),
        ),
        ApplicationKind::LoadFollowing => RunOutcome::LoadFollowing(load_following(
            &mut battery,
            &inputs.production,
            &inputs.load,
        )?),
    };

    Ok(report(&battery, outcome))
}

fn report(battery: &Battery, outcome: RunOutcome) -> RunReport {
    RunReport {
        outcome,
        kpi: KpiReport::from_curves(battery.curves(), battery.rating().capacity_kwh),
        curves: battery.curves_table(),
    }
}

/// Sizes the battery for a peak shaving or load following scenario.
///
/// The configured rating is only a starting point and is replaced.
///
/// # Errors
///
/// Fails for other strategies, if the scenario does not validate, or if the
/// battery or inputs cannot be built.
pub fn size_scenario(cfg: &ScenarioConfig) -> Result<SizingOutcome> {
    check(cfg)?;
    let kind = cfg.application.kind;
    if !kind.is_sizable() {
        return Err(ConfigError {
            field: "application.kind".to_string(),
            message: format!("cannot size for {kind}, use peak_shaving or load_following"),
        }
        .into());
    }

    let mut battery = cfg.build_battery()?;
    let inputs = cfg.load_inputs()?;
    match kind {
        ApplicationKind::LoadFollowing => {
            size_for_load_following(&mut battery, &inputs.production, &inputs.load)
        }
        _ => size_for_peak_shaving(&mut battery, &inputs.load, cfg.application.peak_limit_kw),
    }
}
