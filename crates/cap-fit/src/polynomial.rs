use cap_core::errors::{CapError, ErrorInfo};
use serde::{Deserialize, Serialize};

fn model_error(code: &str, message: impl Into<String>) -> CapError {
    CapError::Config(ErrorInfo::new(code, message))
}

/// Horner evaluation over coefficients stored highest degree first.
fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Polynomial trend model with coefficients stored highest degree first.
///
/// `[c3, c2, c1, c0]` represents `c3·x³ + c2·x² + c1·x + c0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// Creates a model from coefficients ordered highest degree first.
    pub fn new(coefficients: Vec<f64>) -> Result<Self, CapError> {
        if coefficients.is_empty() {
            return Err(model_error(
                "polynomial.empty",
                "a polynomial needs at least one coefficient",
            ));
        }
        if let Some(idx) = coefficients.iter().position(|c| !c.is_finite()) {
            return Err(CapError::Config(
                ErrorInfo::new("polynomial.non_finite", "coefficient is not finite")
                    .with_context("index", idx),
            ));
        }
        Ok(Self { coefficients })
    }

    /// Nominal degree (number of coefficients minus one).
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Coefficients, highest degree first.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Evaluates the polynomial at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        horner(&self.coefficients, x)
    }

    /// First derivative.
    pub fn derivative(&self) -> Polynomial {
        let degree = self.degree();
        if degree == 0 {
            return Polynomial {
                coefficients: vec![0.0],
            };
        }
        let coefficients = self.coefficients[..degree]
            .iter()
            .enumerate()
            .map(|(idx, &c)| c * (degree - idx) as f64)
            .collect();
        Polynomial { coefficients }
    }

    /// Restates the model as its Taylor expansion around zero.
    ///
    /// A polynomial is its own Maclaurin series, so the coefficients are
    /// carried over unchanged.
    pub fn taylor(&self) -> TaylorSeries {
        TaylorSeries {
            coefficients: self.coefficients.clone(),
        }
    }

    /// Evaluates the model at `samples` evenly spaced points in `[start, end]`.
    pub fn sample(&self, start: f64, end: f64, samples: usize) -> Vec<(f64, f64)> {
        match samples {
            0 => Vec::new(),
            1 => vec![(start, self.evaluate(start))],
            _ => {
                let step = (end - start) / (samples - 1) as f64;
                (0..samples)
                    .map(|idx| {
                        let x = start + step * idx as f64;
                        (x, self.evaluate(x))
                    })
                    .collect()
            }
        }
    }
}

impl TryFrom<Vec<f64>> for Polynomial {
    type Error = CapError;

    fn try_from(coefficients: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(coefficients)
    }
}

impl From<Polynomial> for Vec<f64> {
    fn from(model: Polynomial) -> Self {
        model.coefficients
    }
}

/// Taylor expansion of a [`Polynomial`] around the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TaylorSeries {
    // Same layout as `Polynomial` so evaluation is the same arithmetic.
    coefficients: Vec<f64>,
}

impl TaylorSeries {
    /// Order of the expansion.
    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Taylor coefficients `a_0, a_1, ..., a_n` where `a_k = f⁽ᵏ⁾(0) / k!`.
    pub fn coefficients_ascending(&self) -> Vec<f64> {
        self.coefficients.iter().rev().copied().collect()
    }

    /// The `k`-th derivative at the origin, `k! · a_k`.
    pub fn derivative_at_origin(&self, k: usize) -> f64 {
        if k > self.order() {
            return 0.0;
        }
        let a_k = self.coefficients[self.order() - k];
        let factorial = (1..=k).fold(1.0, |acc, i| acc * i as f64);
        a_k * factorial
    }

    /// Evaluates the truncated series at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        horner(&self.coefficients, x)
    }
}
