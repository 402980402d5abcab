//! Battery storage simulator entry point: CLI wiring and output.

mod cli;

use std::path::Path;

use anyhow::Context;
use bess_sim::config::ScenarioConfig;
use bess_sim::io::export::{CsvRow, export_csv};
use bess_sim::report::{
    build_advisories_table, build_curves_table, build_kpi_table, build_limit_table,
    build_load_following_table, build_sizing_table, build_transactions_table,
};
use bess_sim::runner::{RunOutcome, RunReport, run_scenario, size_scenario};
use bess_sim::sim::advisory::Advisory;
use clap::Parser;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Args, Command, RunArgs, SizeArgs};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the tracing subscriber")?;

    match args.command {
        Command::Run(run_args) => run(&run_args),
        Command::Size(size_args) => size(&size_args),
        Command::Presets => {
            for name in ScenarioConfig::PRESETS {
                let cfg = ScenarioConfig::from_preset(name)?;
                println!("{name:<16}{}", cfg.application.kind);
            }
            Ok(())
        }
    }
}

fn run(args: &RunArgs) -> anyhow::Result<()> {
    let cfg = args.scenario.load()?;
    let report = run_scenario(&cfg)?;

    if let Some(path) = &args.curves_out {
        write_rows(&report.curves, path)?;
    }
    if let Some(path) = &args.results_out {
        match &report.outcome {
            RunOutcome::Arbitrage(o) => write_rows(&o.transactions, path)?,
            RunOutcome::PeakShaving(o) | RunOutcome::CurtailmentAvoidance(o) => {
                write_rows(&o.rows, path)?;
            }
            RunOutcome::LoadFollowing(o) => write_rows(&o.rows, path)?,
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, args.curves);
    }
    Ok(())
}

fn print_report(report: &RunReport, with_curves: bool) {
    match &report.outcome {
        RunOutcome::Arbitrage(o) => {
            println!("{}", build_transactions_table(o));
            println!("Transactions: {}", o.transactions.len());
            println!("Traded volume: {:.3} MWh", o.traded_volume_mwh());
            println!("Revenue: {:.2} €", o.total_revenue_eur());
        }
        RunOutcome::PeakShaving(o) | RunOutcome::CurtailmentAvoidance(o) => {
            println!("{}", build_limit_table(o));
            println!("Limit: {:.2} kW", o.limit_kw);
            println!("Peak before: {:.2} kW", o.original_peak_kw());
            println!("Peak after: {:.2} kW", o.new_peak_kw());
            println!(
                "Limit held: {}",
                if o.objective_met() { "yes" } else { "no" }
            );
        }
        RunOutcome::LoadFollowing(o) => {
            println!("{}", build_load_following_table(o));
            println!("Self-sufficiency: {:.1}%", o.self_sufficiency * 100.0);
            println!("Own consumption: {:.1}%", o.own_consumption_ratio * 100.0);
        }
    }
    if with_curves {
        println!("{}", build_curves_table(&report.curves));
    }
    println!("{}", build_kpi_table(&report.kpi));
    print_advisories(report.outcome.advisories());
}

fn size(args: &SizeArgs) -> anyhow::Result<()> {
    let cfg = args.scenario.load()?;
    let outcome = size_scenario(&cfg)?;

    if let Some(path) = &args.results_out {
        write_rows(&outcome.rows, path)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", build_sizing_table(&outcome.sizing));
        println!("{}", outcome.sizing);
        print_advisories(&outcome.advisories);
    }
    Ok(())
}

fn print_advisories(advisories: &[Advisory]) {
    if !advisories.is_empty() {
        println!("{}", build_advisories_table(advisories));
    }
}

fn write_rows<R: CsvRow>(rows: &[R], path: &Path) -> anyhow::Result<()> {
    export_csv(rows, path).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = rows.len(), "CSV written");
    Ok(())
}
