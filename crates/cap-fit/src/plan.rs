use cap_core::errors::CapError;
use cap_core::{PlanConfig, TimeSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::fit::{fit_report, FitReport};
use crate::hash::stable_hash_string;
use crate::lead::recommend_start;
use crate::solve::{solve_crossing, Crossing};

/// Outcome of a full planning run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanReport {
    /// Trend fit and diagnostics.
    pub fit: FitReport,
    /// Capacity the trend was solved against.
    pub threshold: f64,
    /// Where the trend reaches the threshold.
    pub crossing: Crossing,
    /// Construction lead time in months.
    pub lead_time: u32,
    /// Period at which construction should start.
    pub recommended_start: u32,
    /// Stable hash of the report payload.
    pub plan_hash: String,
}

impl PlanReport {
    /// The line printed for operators.
    pub fn summary_line(&self) -> String {
        format!(
            "Month to start building the new warehouse: {}",
            self.recommended_start
        )
    }
}

/// Fits the series, solves for the threshold crossing and applies the
/// lead time.
pub fn run_plan(series: &TimeSeries, config: &PlanConfig) -> Result<PlanReport, CapError> {
    config.validate()?;

    let fit = fit_report(series, config.degree)?;
    info!(
        points = fit.points,
        r_squared = fit.r_squared,
        rmse = fit.rmse,
        "trend fitted"
    );

    let taylor = fit.model.taylor();
    debug!(
        order = taylor.order(),
        coefficients = ?taylor.coefficients_ascending(),
        "taylor expansion around period 0"
    );

    let crossing = solve_crossing(
        &fit.model,
        config.threshold,
        config.initial_guess,
        &config.solver,
    )?;
    let last = f64::from(series.last_period());
    if crossing.period < 1.0 || crossing.period > last {
        warn!(
            period = crossing.period,
            observed_until = last,
            "crossing lies outside the observed periods"
        );
    }

    let recommended_start = recommend_start(crossing.period, config.lead_time);
    info!(
        crossing = crossing.period,
        iterations = crossing.iterations,
        recommended_start,
        "threshold crossing solved"
    );

    let plan_hash = stable_hash_string(&(
        &fit.fit_hash,
        config.threshold,
        crossing.period,
        config.lead_time,
        recommended_start,
    ))?;
    Ok(PlanReport {
        fit,
        threshold: config.threshold,
        crossing,
        lead_time: config.lead_time,
        recommended_start,
        plan_hash,
    })
}
