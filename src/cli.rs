use std::path::PathBuf;

use anyhow::{Context, bail};
use bess_sim::config::ScenarioConfig;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    /// Increase log verbosity (`-v` info, `-vv` debug, `-vvv` trace).
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Advisories are warnings, so they show up without any `-v`.
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the scenario's dispatch strategy and print the results.
    #[clap(name = "run")]
    Run(RunArgs),

    /// Size the battery for a peak shaving or load following scenario.
    #[clap(name = "size")]
    Size(SizeArgs),

    /// List the built-in presets.
    #[clap(name = "presets")]
    Presets,
}

#[derive(ClapArgs)]
pub struct ScenarioArgs {
    /// Scenario TOML file.
    #[clap(long, env = "BESS_SCENARIO", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Built-in preset, `arbitrage` unless a scenario is given.
    #[clap(long)]
    pub preset: Option<String>,
}

impl ScenarioArgs {
    /// Loads and validates the selected scenario.
    pub fn load(&self) -> anyhow::Result<ScenarioConfig> {
        let cfg = match (&self.scenario, &self.preset) {
            (Some(path), _) => ScenarioConfig::from_toml_file(path)
                .with_context(|| format!("failed to load scenario {}", path.display()))?,
            (None, Some(name)) => ScenarioConfig::from_preset(name)?,
            (None, None) => ScenarioConfig::arbitrage(),
        };

        let errors = cfg.validate();
        if !errors.is_empty() {
            let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
            bail!("invalid scenario:\n  {}", details.join("\n  "));
        }
        Ok(cfg)
    }
}

#[derive(ClapArgs)]
pub struct RunArgs {
    #[clap(flatten)]
    pub scenario: ScenarioArgs,

    /// Also print the battery curves table.
    #[clap(long)]
    pub curves: bool,

    /// Write the battery curves to this CSV file.
    #[clap(long)]
    pub curves_out: Option<PathBuf>,

    /// Write the strategy result rows to this CSV file.
    #[clap(long)]
    pub results_out: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[clap(long)]
    pub json: bool,
}

#[derive(ClapArgs)]
pub struct SizeArgs {
    #[clap(flatten)]
    pub scenario: ScenarioArgs,

    /// Write the rows of the sized run to this CSV file.
    #[clap(long)]
    pub results_out: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[clap(long)]
    pub json: bool,
}
