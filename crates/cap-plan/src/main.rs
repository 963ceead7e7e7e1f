use std::error::Error;
use std::io;

use clap::{Parser, Subcommand};
use commands::{
    fit::{self, FitArgs},
    plan::{self, PlanArgs},
    version::{self, VersionArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "cap-plan", about = "Warehouse capacity lead-time planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the production trend and print the month to start building.
    Plan(PlanArgs),
    /// Fit the production trend and print the fit report as JSON.
    Fit(FitArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn init_tracing() {
    // stdout carries the result; diagnostics go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Plan(args) => plan::run(&args),
        Command::Fit(args) => fit::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
