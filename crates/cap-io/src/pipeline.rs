use cap_core::errors::CapError;
use cap_core::PlanConfig;
use cap_fit::{run_plan, PlanReport};

use crate::loader::Loader;
use crate::render::{PlotScene, Renderer};

/// Loads the series, plans against it and hands the result to `renderer`.
///
/// Any failure aborts the run; figures are only drawn for a complete
/// report.
pub fn plan_with(
    loader: &dyn Loader,
    renderer: &mut dyn Renderer,
    config: &PlanConfig,
) -> Result<PlanReport, CapError> {
    let series = loader.load()?;
    let report = run_plan(&series, config)?;
    renderer.render(&PlotScene {
        series: &series,
        model: &report.fit.model,
        threshold: report.threshold,
        crossing: report.crossing.period,
        range: config.plot_range,
    })?;
    Ok(report)
}
