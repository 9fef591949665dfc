use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "MoLab Developers",
    version,
    about = "MoLab CLI - Run the MoLab molecular-dynamics core headless, from a TOML scenario file.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the molecules of a scenario and run the dynamics for a number of frames.
    Run(RunArgs),
    /// Print the bonding-rule table used when molecules are built.
    Rules(RulesArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    // --- Core Arguments ---
    /// Path to the scenario file in TOML format.
    #[arg(short = 'c', long, required = true, value_name = "PATH")]
    pub scenario: PathBuf,

    /// Write the final atom positions to this file as TOML instead of printing a table.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Simulation Overrides ---
    /// Number of frames to simulate (default: 600).
    #[arg(short = 'n', long, value_name = "INT")]
    pub ticks: Option<u64>,

    /// Elapsed time per frame in seconds (default: 1/60).
    #[arg(long, value_name = "SECS")]
    pub frame_time: Option<f64>,

    /// Thermostat temperature in Kelvin (default: 298.15).
    #[arg(short, long, value_name = "KELVIN")]
    pub temperature: Option<f64>,

    /// Seed for the random generator. Runs with the same seed are reproducible.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Bonding-rule table (CSV) used to build custom bonds and placed atoms.
    #[arg(long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    // --- Dynamics Overrides ---
    /// Re-seed every velocity whenever the temperature changes between frames.
    #[arg(long)]
    pub reseed_on_temperature_change: bool,

    /// Set a specific configuration value, overriding the scenario file.
    /// Can be used multiple times. Example: -S dynamics.integrator.damping=0.95
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `rules` subcommand.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Load the table from a CSV file instead of showing the built-in rules.
    #[arg(long, value_name = "PATH")]
    pub table: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_command_parses_overrides() {
        let cli = Cli::try_parse_from([
            "molab",
            "-vv",
            "run",
            "--scenario",
            "lab.toml",
            "--ticks",
            "120",
            "--seed",
            "7",
            "-S",
            "dynamics.integrator.damping=0.9",
            "--reseed-on-temperature-change",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.scenario, PathBuf::from("lab.toml"));
        assert_eq!(args.ticks, Some(120));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.set_values, vec!["dynamics.integrator.damping=0.9"]);
        assert!(args.reseed_on_temperature_change);
        assert_eq!(args.temperature, None);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["molab", "-q", "-v", "rules"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_requires_scenario() {
        assert!(Cli::try_parse_from(["molab", "run"]).is_err());
    }
}
