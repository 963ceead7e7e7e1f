use cap_core::errors::{CapError, ErrorInfo};
use cap_core::SolverOpts;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::polynomial::Polynomial;

fn no_convergence(code: &str, message: &str, iterations: usize, period: f64) -> CapError {
    CapError::NoConvergence(
        ErrorInfo::new(code, message)
            .with_context("iterations", iterations)
            .with_context("period", period)
            .with_hint("retry with a different initial guess"),
    )
}

/// Period at which a trend reaches a threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Crossing {
    /// Continuous crossing estimate.
    pub period: f64,
    /// Iterations spent by the solver.
    pub iterations: usize,
    /// `model(period) - threshold` at the returned period.
    pub residual: f64,
}

/// Finds `p` with `model(p) = threshold`, starting from `initial_guess`.
///
/// Newton iteration on `model(p) - threshold` using the exact derivative.
/// A secant step through the previous iterate replaces Newton wherever the
/// derivative vanishes. Converges when the step is within `xtol` relative
/// to the iterate or the residual is within `ftol` relative to the
/// threshold.
pub fn solve_crossing(
    model: &Polynomial,
    threshold: f64,
    initial_guess: f64,
    opts: &SolverOpts,
) -> Result<Crossing, CapError> {
    let residual_at = |p: f64| model.evaluate(p) - threshold;
    let slope = model.derivative();
    let ftol = opts.ftol * threshold.abs().max(1.0);

    let mut period = initial_guess;
    let mut residual = residual_at(period);
    if !residual.is_finite() {
        return Err(no_convergence(
            "solve.non_finite",
            "residual is not finite at the initial guess",
            0,
            period,
        ));
    }
    if residual.abs() <= ftol {
        return Ok(Crossing {
            period,
            iterations: 0,
            residual,
        });
    }

    let mut previous: Option<(f64, f64)> = None;
    for iteration in 1..=opts.max_iters {
        let derivative = slope.evaluate(period);
        let step = if derivative != 0.0 && derivative.is_finite() {
            residual / derivative
        } else {
            match previous {
                Some((prev_period, prev_residual)) if prev_residual != residual => {
                    residual * (period - prev_period) / (residual - prev_residual)
                }
                _ => {
                    return Err(no_convergence(
                        "solve.stationary",
                        "derivative vanished at the current iterate",
                        iteration,
                        period,
                    ))
                }
            }
        };

        previous = Some((period, residual));
        period -= step;
        residual = residual_at(period);
        if !period.is_finite() || !residual.is_finite() {
            return Err(no_convergence(
                "solve.diverged",
                "iterate left the finite range",
                iteration,
                period,
            ));
        }
        if residual.abs() <= ftol || step.abs() <= opts.xtol * period.abs().max(1.0) {
            debug!(iteration, period, residual, "threshold solver converged");
            return Ok(Crossing {
                period,
                iterations: iteration,
                residual,
            });
        }
    }

    Err(no_convergence(
        "solve.budget_exhausted",
        "root-finder did not converge within its iteration budget",
        opts.max_iters,
        period,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_model_converges_in_one_step() {
        let model = Polynomial::new(vec![2.0, 10.0]).unwrap();
        let crossing = solve_crossing(&model, 50.0, 0.0, &SolverOpts::default()).unwrap();
        assert!((crossing.period - 20.0).abs() < 1e-12);
        assert!(crossing.iterations <= 2);
    }

    #[test]
    fn guess_on_root_returns_immediately() {
        let model = Polynomial::new(vec![1.0, 0.0, 0.0]).unwrap();
        let crossing = solve_crossing(&model, 16.0, 4.0, &SolverOpts::default()).unwrap();
        assert_eq!(crossing.iterations, 0);
        assert_eq!(crossing.period, 4.0);
    }

    #[test]
    fn flat_model_is_stationary() {
        let model = Polynomial::new(vec![3.0]).unwrap();
        let err = solve_crossing(&model, 10.0, 1.0, &SolverOpts::default()).unwrap_err();
        assert_eq!(err.info().code, "solve.stationary");
    }
}
