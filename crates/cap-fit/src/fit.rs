use cap_core::errors::{CapError, ErrorInfo};
use cap_core::{TimeSeries, MAX_DEGREE};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hash::stable_hash_string;
use crate::polynomial::Polynomial;

fn insufficient(code: &str, message: impl Into<String>) -> ErrorInfo {
    ErrorInfo::new(code, message)
}

/// Least-squares polynomial fit of `value` over `period`.
///
/// Solves the Vandermonde system by SVD after scaling each column to unit
/// norm, then unscales the solution. Coefficients are returned highest
/// degree first.
pub fn fit_polynomial(series: &TimeSeries, degree: usize) -> Result<Polynomial, CapError> {
    if degree > MAX_DEGREE {
        return Err(CapError::Config(
            ErrorInfo::new("fit.degree", "trend degree is out of range")
                .with_context("degree", degree)
                .with_context("max", MAX_DEGREE),
        ));
    }
    let rows = series.len();
    let cols = degree + 1;
    if rows < cols {
        return Err(CapError::InsufficientData(
            insufficient(
                "fit.too_few_points",
                "a polynomial fit needs more points than its degree",
            )
            .with_context("points", rows)
            .with_context("required", cols)
            .with_context("degree", degree),
        ));
    }

    let periods: Vec<f64> = series.periods().collect();
    let mut design = DMatrix::from_fn(rows, cols, |r, c| periods[r].powi((degree - c) as i32));
    let mut scales = Vec::with_capacity(cols);
    for mut column in design.column_iter_mut() {
        let norm = column.norm();
        let scale = if norm > 0.0 { norm } else { 1.0 };
        column /= scale;
        scales.push(scale);
    }
    let target = DVector::from_iterator(rows, series.values());

    let svd = design.svd(true, true);
    let max_singular = svd.singular_values.max();
    let cutoff = max_singular * rows.max(cols) as f64 * f64::EPSILON;
    let rank = svd.rank(cutoff);
    if rank < cols {
        return Err(CapError::InsufficientData(
            insufficient("fit.rank_deficient", "design matrix is rank deficient")
                .with_context("rank", rank)
                .with_context("required", cols),
        ));
    }
    let scaled = svd.solve(&target, cutoff).map_err(|reason| {
        CapError::InsufficientData(insufficient("fit.solve", reason))
    })?;

    let coefficients: Vec<f64> = scaled
        .iter()
        .zip(scales.iter())
        .map(|(value, scale)| value / scale)
        .collect();
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(CapError::InsufficientData(insufficient(
            "fit.non_finite",
            "least-squares solution is not finite",
        )));
    }
    debug!(degree, points = rows, ?coefficients, "fitted trend polynomial");
    Polynomial::new(coefficients)
}

/// Fitted model with goodness-of-fit diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitReport {
    /// Fitted coefficients, highest degree first.
    pub model: Polynomial,
    /// Number of observations used.
    pub points: usize,
    /// Residual sum of squares.
    pub rss: f64,
    /// Root mean squared residual.
    pub rmse: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Stable hash of the coefficients.
    pub fit_hash: String,
}

/// Fits the series and summarises how well the trend explains it.
pub fn fit_report(series: &TimeSeries, degree: usize) -> Result<FitReport, CapError> {
    let model = fit_polynomial(series, degree)?;
    let points = series.len();
    let mean = series.values().sum::<f64>() / points as f64;
    let (rss, tss) = series
        .observations()
        .iter()
        .fold((0.0, 0.0), |(rss, tss), obs| {
            let resid = obs.value - model.evaluate(obs.period as f64);
            let spread = obs.value - mean;
            (rss + resid * resid, tss + spread * spread)
        });
    let r_squared = if tss > 0.0 {
        1.0 - rss / tss
    } else {
        // Constant series: any exact fit explains it fully.
        1.0
    };
    let fit_hash = stable_hash_string(&model)?;
    Ok(FitReport {
        points,
        rss,
        rmse: (rss / points as f64).sqrt(),
        r_squared,
        fit_hash,
        model,
    })
}
