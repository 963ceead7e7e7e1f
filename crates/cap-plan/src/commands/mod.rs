pub mod fit;
pub mod plan;
pub mod version;

use std::path::Path;

use cap_core::{CapError, PlanConfig};

/// Reads the YAML configuration when given, defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<PlanConfig, CapError> {
    match path {
        Some(path) => PlanConfig::load(path),
        None => Ok(PlanConfig::default()),
    }
}
