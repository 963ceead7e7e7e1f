use std::error::Error;
use std::path::PathBuf;

use cap_fit::{fit_report, to_canonical_json_bytes};
use cap_io::{open_source, Loader};
use clap::Args;

use super::load_config;

#[derive(Args, Debug)]
pub struct FitArgs {
    /// Production series (xlsx or CSV): a file path or an http(s) URL.
    #[arg(long)]
    pub input: String,
    /// YAML file overriding the planning constants.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Fits the trend only and prints the report without solving for a crossing.
pub fn run(args: &FitArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_deref())?;
    let loader: Box<dyn Loader> = open_source(&args.input, &config.input);
    let series = loader.load()?;
    let report = fit_report(&series, config.degree)?;
    println!("{}", String::from_utf8(to_canonical_json_bytes(&report)?)?);
    Ok(())
}
