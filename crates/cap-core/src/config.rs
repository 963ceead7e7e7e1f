//! Planning configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CapError, ErrorInfo};

/// Highest trend degree the fitter accepts.
pub const MAX_DEGREE: usize = 10;

fn default_threshold() -> f64 {
    25_000.0
}

fn default_lead_time() -> u32 {
    13
}

fn default_degree() -> usize {
    3
}

fn default_initial_guess() -> f64 {
    144.0
}

fn default_max_iters() -> usize {
    400
}

fn default_xtol() -> f64 {
    1.49012e-8
}

fn default_ftol() -> f64 {
    1e-10
}

fn default_timeout_secs() -> u64 {
    30
}

/// Root-finder budget and tolerances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverOpts {
    /// Maximum number of iterations before giving up.
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
    /// Relative step tolerance.
    #[serde(default = "default_xtol")]
    pub xtol: f64,
    /// Residual tolerance, relative to the threshold magnitude.
    #[serde(default = "default_ftol")]
    pub ftol: f64,
}

impl Default for SolverOpts {
    fn default() -> Self {
        Self {
            max_iters: default_max_iters(),
            xtol: default_xtol(),
            ftol: default_ftol(),
        }
    }
}

/// Inclusive period window used when plotting the extrapolated trend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlotRange {
    /// First plotted period.
    pub start: f64,
    /// Last plotted period.
    pub end: f64,
    /// Number of evaluation points across the window.
    pub samples: usize,
}

impl Default for PlotRange {
    fn default() -> Self {
        Self {
            start: 1.0,
            end: 200.0,
            samples: 200,
        }
    }
}

/// How a tabular resource lays out the series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Decide from the shape of the table.
    #[default]
    Auto,
    /// One row, one value per column.
    Row,
    /// One value per row.
    Column,
}

/// Input resource settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Table layout.
    #[serde(default)]
    pub orientation: Orientation,
    /// Timeout applied to remote fetches.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Every constant the planning pipeline depends on.
///
/// Passed explicitly to each stage so tests can drive the pipeline with
/// synthetic values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanConfig {
    /// Warehouse capacity the trend is solved against.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Construction lead time in months.
    #[serde(default = "default_lead_time")]
    pub lead_time: u32,
    /// Degree of the fitted trend polynomial.
    #[serde(default = "default_degree")]
    pub degree: usize,
    /// Starting period for the root-finder.
    #[serde(default = "default_initial_guess")]
    pub initial_guess: f64,
    /// Root-finder budget.
    #[serde(default)]
    pub solver: SolverOpts,
    /// Extrapolation window for figures.
    #[serde(default)]
    pub plot_range: PlotRange,
    /// Input resource settings.
    #[serde(default)]
    pub input: InputConfig,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            lead_time: default_lead_time(),
            degree: default_degree(),
            initial_guess: default_initial_guess(),
            solver: SolverOpts::default(),
            plot_range: PlotRange::default(),
            input: InputConfig::default(),
        }
    }
}

fn invalid(field: &str, message: &str) -> CapError {
    CapError::Config(ErrorInfo::new("config.invalid", message).with_context("field", field))
}

impl PlanConfig {
    /// Reads a YAML configuration; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, CapError> {
        let bytes = fs::read(path).map_err(|err| {
            CapError::Config(
                ErrorInfo::new("config.read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        let config: PlanConfig = serde_yaml::from_slice(&bytes).map_err(|err| {
            CapError::Config(
                ErrorInfo::new("config.parse", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), CapError> {
        if !self.threshold.is_finite() {
            return Err(invalid("threshold", "threshold must be finite"));
        }
        if self.degree == 0 || self.degree > MAX_DEGREE {
            return Err(invalid(
                "degree",
                &format!("degree must be between 1 and {MAX_DEGREE}"),
            ));
        }
        if !self.initial_guess.is_finite() {
            return Err(invalid("initial_guess", "initial guess must be finite"));
        }
        if self.solver.max_iters == 0 {
            return Err(invalid("solver.max_iters", "iteration budget must be positive"));
        }
        if !(self.solver.xtol > 0.0) || self.solver.xtol.is_infinite() {
            return Err(invalid(
                "solver.xtol",
                "step tolerance must be positive and finite",
            ));
        }
        if !(self.solver.ftol >= 0.0) || self.solver.ftol.is_infinite() {
            return Err(invalid(
                "solver.ftol",
                "residual tolerance must be non-negative and finite",
            ));
        }
        let range = &self.plot_range;
        if !range.start.is_finite() || !range.end.is_finite() || range.end <= range.start {
            return Err(invalid("plot_range", "plot range must be a non-empty interval"));
        }
        if range.samples < 2 {
            return Err(invalid("plot_range.samples", "at least two samples are required"));
        }
        Ok(())
    }
}
