use std::fs;
use std::path::{Path, PathBuf};

use bess_sim::config::ScenarioConfig;
use bess_sim::runner::{RunOutcome, run_scenario, size_scenario};

fn scenario(path: &str) -> ScenarioConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(path);
    let cfg = ScenarioConfig::from_toml_file(&path).expect("scenario should parse");
    assert!(cfg.validate().is_empty(), "{} is invalid", path.display());
    cfg
}

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("bess-sim-{}-{name}", std::process::id()));
    fs::write(&path, contents).expect("temp file written");
    path
}

#[test]
fn shipped_scenarios_match_their_presets() {
    for (file, preset) in [
        ("scenarios/arbitrage.toml", "arbitrage"),
        ("scenarios/peak_shaving.toml", "peak_shaving"),
        ("scenarios/curtailment.toml", "curtailment"),
        ("scenarios/load_following.toml", "load_following"),
    ] {
        let cfg = scenario(file);
        let preset = ScenarioConfig::from_preset(preset).expect("known preset");
        assert_eq!(cfg.application.kind, preset.application.kind, "{file}");
    }
}

#[test]
fn csv_load_drives_peak_shaving() {
    let load = write_temp(
        "load.csv",
        "datetime,load_kw\n\
         2021-01-01 00:00:00,80\n\
         2021-01-01 01:00:00,140\n\
         2021-01-01 02:00:00,90\n\
         2021-01-01 03:00:00,130\n",
    );
    let toml = format!(
        r#"
        [battery]
        power_kw = 50.0
        capacity_kwh = 100.0
        round_trip_efficiency = 1.0
        initial_soc = 1.0

        [application]
        kind = "peak_shaving"
        peak_limit_kw = 100.0

        [inputs]
        load = '{}'
        "#,
        load.display()
    );
    let cfg = ScenarioConfig::from_toml_str(&toml).expect("valid TOML");
    let report = run_scenario(&cfg).expect("run succeeds");
    let _ = fs::remove_file(&load);

    let RunOutcome::PeakShaving(outcome) = report.outcome else {
        panic!("expected a peak shaving outcome");
    };
    assert_eq!(outcome.rows.len(), 4);
    assert_eq!(outcome.original_peak_kw(), 140.0);
    assert!(outcome.objective_met());
    assert_eq!(report.kpi.steps, 4);
}

#[test]
fn missing_input_file_is_an_error() {
    let cfg = ScenarioConfig::from_toml_str(
        r#"
        [application]
        kind = "arbitrage"

        [inputs]
        prices = "/nonexistent/prices.csv"
        "#,
    )
    .expect("valid TOML");

    let err = run_scenario(&cfg).unwrap_err();
    assert!(err.to_string().contains("prices.csv"));
}

#[test]
fn load_following_scenario_sizes_and_reruns() {
    let cfg = scenario("scenarios/load_following.toml");
    let outcome = size_scenario(&cfg).expect("load following is sizable");
    assert!(outcome.sizing.objective_met);
    assert_eq!(outcome.rows.len(), cfg.simulation.steps);

    let report = run_scenario(&cfg).expect("run succeeds");
    let RunOutcome::LoadFollowing(run) = report.outcome else {
        panic!("expected a load following outcome");
    };
    assert!((0.0..=1.0).contains(&run.self_sufficiency));
}
