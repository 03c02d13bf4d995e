//! Trailing-window demand forecasting.
//!
//! The estimator is deliberately minimal: arithmetic mean over the most
//! recent window plus a Bessel-corrected sample standard deviation over the
//! same slice. No smoothing and no trend or seasonality modeling, so the
//! optimizer downstream sees a fully predictable input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::demand::DemandSeries;
use crate::error::{PlanError, PlanResult};

/// Default trailing window, in aggregated periods.
pub const DEFAULT_WINDOW: usize = 8;

/// Point forecast and dispersion estimate for one SKU.
///
/// Created fresh on every forecast run and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// SKU identifier.
    pub sku: String,
    /// Mean demand over the window.
    pub mu: f64,
    /// Sample standard deviation over the same window.
    pub sigma: f64,
    /// Configured window length.
    pub window_size: usize,
    /// Observations actually used, `min(window_size, series length)`.
    pub periods_used: usize,
    /// True when fewer than two observations were available and sigma
    /// was defaulted to zero rather than estimated.
    pub sigma_defaulted: bool,
}

/// Trailing-window forecaster.
#[derive(Debug, Clone, Copy)]
pub struct ForecastModel {
    window: usize,
}

impl ForecastModel {
    /// Create a forecaster with the given trailing window.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Config` if `window` is zero.
    pub fn new(window: usize) -> PlanResult<Self> {
        if window == 0 {
            return Err(PlanError::config("forecast window must be at least 1"));
        }
        Ok(Self { window })
    }

    /// Configured window length.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Forecast one SKU from its demand series.
    ///
    /// Series shorter than the window use all available observations;
    /// that shrinkage is reported via `periods_used`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::InsufficientData` when the series is empty.
    pub fn forecast(&self, sku: &str, series: &DemandSeries) -> PlanResult<ForecastRecord> {
        if series.is_empty() {
            return Err(PlanError::insufficient_data(sku));
        }

        let tail = series.trailing_quantities(self.window);
        let n = tail.len();
        let mu = tail.iter().sum::<f64>() / n as f64;

        let (sigma, sigma_defaulted) = if n >= 2 {
            let ss: f64 = tail.iter().map(|q| (q - mu) * (q - mu)).sum();
            ((ss / (n - 1) as f64).sqrt(), false)
        } else {
            (0.0, true)
        };

        Ok(ForecastRecord {
            sku: sku.to_string(),
            mu,
            sigma,
            window_size: self.window,
            periods_used: n,
            sigma_defaulted,
        })
    }

    /// Forecast every SKU in a demand table.
    ///
    /// # Errors
    ///
    /// Fails on the first SKU with an empty series, naming it.
    pub fn forecast_all(
        &self,
        demand: &BTreeMap<String, DemandSeries>,
    ) -> PlanResult<BTreeMap<String, ForecastRecord>> {
        let mut forecasts = BTreeMap::new();
        for (sku, series) in demand {
            let record = self.forecast(sku, series)?;
            forecasts.insert(sku.clone(), record);
        }
        Ok(forecasts)
    }
}

impl Default for ForecastModel {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn series(quantities: &[f64]) -> DemandSeries {
        DemandSeries::from_quantities(quantities).unwrap()
    }

    #[test]
    fn test_mean_over_full_window() {
        let model = ForecastModel::new(3).unwrap();
        let record = model
            .forecast("SKU-1", &series(&[100.0, 10.0, 20.0, 30.0]))
            .unwrap();
        // Window covers the last three observations only.
        assert!((record.mu - 20.0).abs() < 1e-12);
        assert_eq!(record.periods_used, 3);
        assert_eq!(record.window_size, 3);
    }

    #[test]
    fn test_short_series_shrinks_window() {
        let model = ForecastModel::new(8).unwrap();
        let record = model.forecast("SKU-1", &series(&[4.0, 6.0])).unwrap();
        assert!((record.mu - 5.0).abs() < 1e-12);
        assert_eq!(record.periods_used, 2);
        assert_eq!(record.window_size, 8);
        assert!(!record.sigma_defaulted);
    }

    #[test]
    fn test_sigma_bessel_corrected() {
        let model = ForecastModel::new(4).unwrap();
        let record = model
            .forecast("SKU-1", &series(&[2.0, 4.0, 4.0, 6.0]))
            .unwrap();
        // mean 4, squared deviations 4 + 0 + 0 + 4, divisor n-1 = 3.
        let expected = (8.0f64 / 3.0).sqrt();
        assert!((record.sigma - expected).abs() < 1e-12);
    }

    #[test]
    fn test_single_observation_sigma_defaulted() {
        let model = ForecastModel::new(8).unwrap();
        let record = model.forecast("SKU-1", &series(&[42.0])).unwrap();
        assert!((record.mu - 42.0).abs() < f64::EPSILON);
        assert!((record.sigma - 0.0).abs() < f64::EPSILON);
        assert!(record.sigma_defaulted);
        assert_eq!(record.periods_used, 1);
    }

    #[test]
    fn test_empty_series_is_insufficient_data() {
        let model = ForecastModel::new(8).unwrap();
        let err = model.forecast("SKU-9", &series(&[])).unwrap_err();
        match err {
            PlanError::InsufficientData { sku } => assert_eq!(sku, "SKU-9"),
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(ForecastModel::new(0).is_err());
    }

    #[test]
    fn test_constant_series_zero_sigma() {
        let model = ForecastModel::new(5).unwrap();
        let record = model
            .forecast("SKU-1", &series(&[7.0, 7.0, 7.0, 7.0, 7.0]))
            .unwrap();
        assert!((record.mu - 7.0).abs() < f64::EPSILON);
        assert!((record.sigma - 0.0).abs() < f64::EPSILON);
        assert!(!record.sigma_defaulted);
    }

    #[test]
    fn test_forecast_all_covers_every_sku() {
        let model = ForecastModel::default();
        let mut demand = BTreeMap::new();
        demand.insert("A".to_string(), series(&[1.0, 2.0, 3.0]));
        demand.insert("B".to_string(), series(&[10.0]));

        let forecasts = model.forecast_all(&demand).unwrap();
        assert_eq!(forecasts.len(), 2);
        assert!((forecasts["A"].mu - 2.0).abs() < 1e-12);
        assert!((forecasts["B"].mu - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_forecast_all_names_failing_sku() {
        let model = ForecastModel::default();
        let mut demand = BTreeMap::new();
        demand.insert("GOOD".to_string(), series(&[1.0]));
        demand.insert("EMPTY".to_string(), series(&[]));

        let err = model.forecast_all(&demand).unwrap_err();
        assert!(err.to_string().contains("EMPTY"));
    }

    #[test]
    fn test_default_window() {
        let model = ForecastModel::default();
        assert_eq!(model.window(), DEFAULT_WINDOW);
    }
}
