//! Monthly production series.

use serde::{Deserialize, Serialize};

use crate::errors::{CapError, ErrorInfo};

/// A single observation: production `value` recorded during `period`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// One-based month index.
    pub period: u32,
    /// Observed production quantity.
    pub value: f64,
}

/// Ordered series of observations with contiguous periods starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Validates a prebuilt observation list.
    ///
    /// Periods must start at 1 and increase by exactly one; values must be
    /// finite.
    pub fn new(observations: Vec<Observation>) -> Result<Self, CapError> {
        for (idx, obs) in observations.iter().enumerate() {
            let expected = idx as u32 + 1;
            if obs.period != expected {
                return Err(CapError::ResourceFetch(
                    ErrorInfo::new(
                        "series.non_contiguous",
                        "periods must be contiguous and start at 1",
                    )
                    .with_context("index", idx)
                    .with_context("expected", expected)
                    .with_context("found", obs.period),
                ));
            }
            if !obs.value.is_finite() {
                return Err(CapError::ResourceFetch(
                    ErrorInfo::new("series.non_finite", "observed value is not finite")
                        .with_context("period", obs.period),
                ));
            }
        }
        Ok(Self { observations })
    }

    /// Builds a series from raw values, assigning periods `1..=n`.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Result<Self, CapError> {
        let observations = (1..)
            .zip(values)
            .map(|(period, value)| Observation { period, value })
            .collect();
        Self::new(observations)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations in period order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Periods as reals, in order.
    pub fn periods(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.observations.iter().map(|obs| obs.period as f64)
    }

    /// Observed values, in order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.observations.iter().map(|obs| obs.value)
    }

    /// Last observed period, or 0 for an empty series.
    pub fn last_period(&self) -> u32 {
        self.observations.last().map(|obs| obs.period).unwrap_or(0)
    }
}

impl TryFrom<Vec<Observation>> for TimeSeries {
    type Error = CapError;

    fn try_from(observations: Vec<Observation>) -> Result<Self, Self::Error> {
        Self::new(observations)
    }
}

impl From<TimeSeries> for Vec<Observation> {
    fn from(series: TimeSeries) -> Self {
        series.observations
    }
}
