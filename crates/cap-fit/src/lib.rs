#![deny(missing_docs)]
#![doc = "Polynomial trend fitting, threshold crossing and construction lead-time planning."]

/// Least-squares trend fitting.
pub mod fit;
/// Canonical JSON hashing helpers.
pub mod hash;
/// Lead-time business rule.
pub mod lead;
/// End-to-end planning run.
pub mod plan;
/// Polynomial model and its Taylor view.
pub mod polynomial;
/// Threshold root-finder.
pub mod solve;

pub use fit::{fit_polynomial, fit_report, FitReport};
pub use hash::{stable_hash_string, to_canonical_json_bytes};
pub use lead::recommend_start;
pub use plan::{run_plan, PlanReport};
pub use polynomial::{Polynomial, TaylorSeries};
pub use solve::{solve_crossing, Crossing};
