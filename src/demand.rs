//! Historical demand series.
//!
//! Demand arrives pre-aggregated from upstream preprocessing: periods are
//! aligned to one frequency, gaps are zero-imputed, and there are no
//! duplicates. Construction re-checks those guarantees so bad input fails
//! here instead of inside a solver.

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// One aggregated demand observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandPoint {
    /// Period index under the chosen aggregation frequency.
    pub period: u32,
    /// Observed demand quantity, non-negative.
    pub quantity: f64,
}

/// Ordered demand history for a single SKU.
///
/// Invariants: quantities are finite and non-negative, periods are
/// contiguous and strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandSeries {
    points: Vec<DemandPoint>,
}

impl<'de> Deserialize<'de> for DemandSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            points: Vec<DemandPoint>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.points).map_err(serde::de::Error::custom)
    }
}

impl DemandSeries {
    /// Create a series from observation points.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Config` if any quantity is negative or
    /// non-finite, or periods are not contiguous ascending.
    pub fn new(points: Vec<DemandPoint>) -> PlanResult<Self> {
        for pair in points.windows(2) {
            if pair[1].period != pair[0].period + 1 {
                return Err(PlanError::config(format!(
                    "demand periods must be contiguous ascending, found {} after {}",
                    pair[1].period, pair[0].period
                )));
            }
        }
        for point in &points {
            if !point.quantity.is_finite() || point.quantity < 0.0 {
                return Err(PlanError::config(format!(
                    "demand quantity {} at period {} must be finite and non-negative",
                    point.quantity, point.period
                )));
            }
        }
        Ok(Self { points })
    }

    /// Create a series from raw quantities, assigning periods 0, 1, 2, ...
    ///
    /// Quantities are oldest first.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Config` if any quantity is negative or non-finite.
    pub fn from_quantities(quantities: &[f64]) -> PlanResult<Self> {
        let points = (0u32..)
            .zip(quantities.iter())
            .map(|(period, &quantity)| DemandPoint { period, quantity })
            .collect();
        Self::new(points)
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All observation points, oldest first.
    #[must_use]
    pub fn points(&self) -> &[DemandPoint] {
        &self.points
    }

    /// The most recent `n` quantities, oldest first. Shorter series
    /// return everything they have.
    #[must_use]
    pub fn trailing_quantities(&self, n: usize) -> Vec<f64> {
        let start = self.points.len().saturating_sub(n);
        self.points[start..].iter().map(|p| p.quantity).collect()
    }
}
