use std::error::Error;
use std::fs;
use std::path::PathBuf;

use cap_fit::to_canonical_json_bytes;
use cap_io::{open_source, plan_with, FigureConfig, NullRenderer, Renderer, SvgRenderer};
use clap::Args;
use tracing::info;

use super::load_config;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Production series (xlsx or CSV): a file path or an http(s) URL.
    #[arg(long)]
    pub input: String,
    /// YAML file overriding the planning constants.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory receiving fit, Taylor and threshold figures as SVG.
    #[arg(long)]
    pub plots: Option<PathBuf>,
    /// Write the full plan report as canonical JSON.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(args: &PlanArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_deref())?;
    let loader = open_source(&args.input, &config.input);
    let mut renderer: Box<dyn Renderer> = match &args.plots {
        Some(dir) => Box::new(SvgRenderer::new(dir, FigureConfig::default())),
        None => Box::new(NullRenderer),
    };

    let report = plan_with(loader.as_ref(), renderer.as_mut(), &config)?;

    if let Some(path) = &args.report {
        fs::write(path, to_canonical_json_bytes(&report)?)?;
        info!(path = %path.display(), "plan report written");
    }
    println!("{}", report.summary_line());
    Ok(())
}
