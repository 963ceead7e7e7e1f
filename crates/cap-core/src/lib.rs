#![deny(missing_docs)]
#![doc = "Core data model, configuration and error taxonomy for the CAP capacity planner."]

pub mod config;
pub mod errors;
pub mod series;

pub use config::{
    InputConfig, Orientation, PlanConfig, PlotRange, SolverOpts, MAX_DEGREE,
};
pub use errors::{CapError, ErrorInfo};
pub use series::{Observation, TimeSeries};
