use std::path::PathBuf;
use std::process::{Command, Output};

fn bess_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bess-sim"))
        .args(args)
        .env_remove("BESS_SCENARIO")
        .output()
        .expect("bess-sim process should run")
}

fn stdout_of(args: &[&str]) -> String {
    let output = bess_sim(args);
    assert!(
        output.status.success(),
        "bess-sim {args:?} failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn line_value<'a>(stdout: &'a str, label: &str) -> &'a str {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing line `{label}` in output: {stdout}"));
    line.split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid format for line `{line}`"))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bess-sim-{}-{name}", std::process::id()))
}

#[test]
fn presets_are_listed_with_their_strategy() {
    let stdout = stdout_of(&["presets"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("arbitrage"));
    assert!(lines[2].starts_with("curtailment"));
    assert!(lines[2].ends_with("curtailment_avoidance"));
}

#[test]
fn every_shipped_scenario_runs_via_cli() {
    for path in [
        "scenarios/arbitrage.toml",
        "scenarios/peak_shaving.toml",
        "scenarios/curtailment.toml",
        "scenarios/load_following.toml",
    ] {
        let stdout = stdout_of(&["run", "--scenario", path]);
        assert!(
            stdout.contains("Throughput, kWh"),
            "no KPI table for {path}: {stdout}"
        );
    }
}

#[test]
fn peak_shaving_preset_reports_the_limit() {
    let stdout = stdout_of(&["run", "--preset", "peak_shaving"]);
    assert_eq!(line_value(&stdout, "Limit:"), "1000.00 kW");
    let held = line_value(&stdout, "Limit held:");
    assert!(held == "yes" || held == "no");
}

#[test]
fn curves_table_is_printed_on_request() {
    let plain = stdout_of(&["run", "--preset", "arbitrage"]);
    assert!(!plain.contains("Energy, kWh"));

    let with_curves = stdout_of(&["run", "--preset", "arbitrage", "--curves"]);
    assert!(with_curves.contains("Energy, kWh"), "no curves table: {with_curves}");
}

#[test]
fn arbitrage_json_matches_the_step_count() {
    let stdout = stdout_of(&["run", "--json"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON report");

    assert_eq!(report["outcome"]["application"], "arbitrage");
    assert_eq!(report["kpi"]["steps"], 48);
    assert_eq!(report["curves"].as_array().map(Vec::len), Some(48));
}

#[test]
fn curves_and_results_are_written_as_csv() {
    let curves = temp_path("curves.csv");
    let results = temp_path("results.csv");
    stdout_of(&[
        "run",
        "--preset",
        "curtailment",
        "--curves-out",
        curves.to_str().expect("utf-8 path"),
        "--results-out",
        results.to_str().expect("utf-8 path"),
    ]);

    let curves_csv = std::fs::read_to_string(&curves).expect("curves written");
    let results_csv = std::fs::read_to_string(&results).expect("results written");
    let _ = std::fs::remove_file(&curves);
    let _ = std::fs::remove_file(&results);

    assert!(curves_csv.starts_with("datetime,soc,power_kw,energy_kwh"));
    assert_eq!(curves_csv.lines().count(), 49);
    assert!(results_csv.starts_with("datetime,original_kw,battery_kw,new_kw,soc"));
    assert_eq!(results_csv.lines().count(), 49);
}

#[test]
fn sizing_prints_the_derived_rating() {
    let stdout = stdout_of(&["size", "--preset", "peak_shaving"]);
    let summary = line_value(&stdout, "Battery power:");
    assert!(summary.contains("kW, capacity:"), "unexpected summary: {summary}");

    let json = stdout_of(&["size", "--preset", "peak_shaving", "--json"]);
    let outcome: serde_json::Value = serde_json::from_str(&json).expect("valid JSON outcome");
    assert_eq!(outcome["sizing"]["objective_met"], true);
    assert_eq!(outcome["rows"].as_array().map(Vec::len), Some(192));
}

#[test]
fn sizing_rejects_arbitrage() {
    let output = bess_sim(&["size", "--preset", "arbitrage"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot size for arbitrage"), "stderr: {stderr}");
}

#[test]
fn unknown_preset_fails() {
    let output = bess_sim(&["run", "--preset", "nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown preset"), "stderr: {stderr}");
}
