//! Constrained order-quantity problem assembly.
//!
//! `OptimizationProblem` is pure data: forecasts, resolved cost profiles,
//! and optional budget/capacity limits, validated at construction so a
//! malformed problem never reaches a solver. Both backends and the
//! interpreter evaluate costs through the shared methods here, which keeps
//! their reported objectives directly comparable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cost::CostProfile;
use crate::error::{PlanError, PlanResult};
use crate::forecast::ForecastRecord;

/// Per-SKU coefficients in the split-variable formulation.
///
/// With `Q = mu + over - under`, `over >= 0`, `0 <= under <= mu`, the
/// objective decomposes into a constant `c * mu` plus `(c + h) * over`
/// plus `(p - c) * under` per SKU.
#[derive(Debug, Clone, PartialEq)]
pub struct SkuTerms {
    /// SKU identifier.
    pub sku: String,
    /// Forecast mean demand.
    pub mu: f64,
    /// Purchase cost per unit.
    pub unit_cost: f64,
    /// Holding cost per unit of overstock.
    pub holding_cost: f64,
    /// Penalty per unit of understock.
    pub shortage_penalty: f64,
    /// Storage volume per unit.
    pub unit_volume: f64,
}

impl SkuTerms {
    /// Objective coefficient of the overstock variable.
    #[must_use]
    pub fn over_coeff(&self) -> f64 {
        self.unit_cost + self.holding_cost
    }

    /// Objective coefficient of the understock variable.
    ///
    /// Negative when ordering is unprofitable (`p < c`), in which case the
    /// optimum pushes `under` to its upper bound `mu`.
    #[must_use]
    pub fn under_coeff(&self) -> f64 {
        self.shortage_penalty - self.unit_cost
    }

    /// Total cost contribution of ordering `q` units of this SKU.
    #[must_use]
    pub fn cost_at(&self, q: f64) -> f64 {
        let overstock = (q - self.mu).max(0.0);
        let understock = (self.mu - q).max(0.0);
        self.unit_cost * q
            + self.holding_cost * overstock
            + self.shortage_penalty * understock
    }
}

/// A validated, solver-independent cost-minimization problem.
///
/// Invariant: every forecast SKU has a matching cost profile, all numeric
/// fields are finite and non-negative, and limits of exactly zero have been
/// normalized away (zero means "constraint disabled").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationProblem {
    forecasts: BTreeMap<String, ForecastRecord>,
    costs: BTreeMap<String, CostProfile>,
    budget: Option<f64>,
    capacity: Option<f64>,
}

impl OptimizationProblem {
    /// Assemble and validate a problem.
    ///
    /// No solving happens here; this fails fast on inconsistent input
    /// before any backend is invoked. A budget or capacity of exactly
    /// zero is treated as "no constraint" and normalized to `None`.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::ProblemValidation` when a forecast SKU lacks a
    /// cost profile, any cost or forecast field is negative or non-finite,
    /// or a provided limit is negative or non-finite.
    pub fn build(
        forecasts: BTreeMap<String, ForecastRecord>,
        costs: BTreeMap<String, CostProfile>,
        budget: Option<f64>,
        capacity: Option<f64>,
    ) -> PlanResult<Self> {
        for (sku, record) in &forecasts {
            if !costs.contains_key(sku) {
                return Err(PlanError::problem_validation(format!(
                    "missing cost profile for forecasted SKU '{sku}'"
                )));
            }
            for (name, value) in [("mu", record.mu), ("sigma", record.sigma)] {
                if !value.is_finite() || value < 0.0 {
                    return Err(PlanError::problem_validation(format!(
                        "forecast {name} for SKU '{sku}' is {value}, must be finite and non-negative"
                    )));
                }
            }
        }

        for (sku, profile) in &costs {
            let fields = [
                ("unit_cost", profile.unit_cost),
                ("holding_cost", profile.holding_cost),
                ("shortage_penalty", profile.shortage_penalty),
                ("unit_volume", profile.unit_volume),
            ];
            for (name, value) in fields {
                if !value.is_finite() || value < 0.0 {
                    return Err(PlanError::problem_validation(format!(
                        "{name} for SKU '{sku}' is {value}, must be finite and non-negative"
                    )));
                }
            }
        }

        let budget = Self::normalize_limit("budget", budget)?;
        let capacity = Self::normalize_limit("capacity", capacity)?;

        Ok(Self {
            forecasts,
            costs,
            budget,
            capacity,
        })
    }

    /// Zero disables a limit; negative or non-finite limits are rejected.
    fn normalize_limit(name: &str, limit: Option<f64>) -> PlanResult<Option<f64>> {
        match limit {
            None => Ok(None),
            Some(value) if !value.is_finite() || value < 0.0 => {
                Err(PlanError::problem_validation(format!(
                    "{name} is {value}, must be finite and non-negative"
                )))
            }
            Some(value) if value == 0.0 => Ok(None),
            Some(value) => Ok(Some(value)),
        }
    }

    /// Active budget limit, if any.
    #[must_use]
    pub const fn budget(&self) -> Option<f64> {
        self.budget
    }

    /// Active capacity limit, if any.
    #[must_use]
    pub const fn capacity(&self) -> Option<f64> {
        self.capacity
    }

    /// Forecast records, keyed by SKU.
    #[must_use]
    pub const fn forecasts(&self) -> &BTreeMap<String, ForecastRecord> {
        &self.forecasts
    }

    /// Cost profiles, keyed by SKU.
    #[must_use]
    pub const fn costs(&self) -> &BTreeMap<String, CostProfile> {
        &self.costs
    }

    /// Number of SKUs in the portfolio.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    /// Whether the portfolio is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }

    /// Solver view: one coefficient bundle per SKU, in SKU order.
    #[must_use]
    pub fn terms(&self) -> Vec<SkuTerms> {
        self.forecasts
            .iter()
            .filter_map(|(sku, record)| {
                self.costs.get(sku).map(|profile| SkuTerms {
                    sku: sku.clone(),
                    mu: record.mu,
                    unit_cost: profile.unit_cost,
                    holding_cost: profile.holding_cost,
                    shortage_penalty: profile.shortage_penalty,
                    unit_volume: profile.unit_volume,
                })
            })
            .collect()
    }

    /// Total objective cost of a candidate order plan.
    ///
    /// SKUs absent from `orders` count as an order of zero.
    #[must_use]
    pub fn objective_value(&self, orders: &BTreeMap<String, f64>) -> f64 {
        self.terms()
            .iter()
            .map(|t| t.cost_at(orders.get(&t.sku).copied().unwrap_or(0.0)))
            .sum()
    }

    /// Total purchase spend of a candidate order plan.
    #[must_use]
    pub fn purchase_total(&self, orders: &BTreeMap<String, f64>) -> f64 {
        self.terms()
            .iter()
            .map(|t| t.unit_cost * orders.get(&t.sku).copied().unwrap_or(0.0))
            .sum()
    }

    /// Total storage volume of a candidate order plan.
    #[must_use]
    pub fn volume_total(&self, orders: &BTreeMap<String, f64>) -> f64 {
        self.terms()
            .iter()
            .map(|t| t.unit_volume * orders.get(&t.sku).copied().unwrap_or(0.0))
            .sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cost::{CostDefaults, CostProfile};

    fn forecast(sku: &str, mu: f64) -> ForecastRecord {
        ForecastRecord {
            sku: sku.to_string(),
            mu,
            sigma: 0.0,
            window_size: 8,
            periods_used: 8,
            sigma_defaulted: false,
        }
    }

    fn profile(sku: &str) -> CostProfile {
        CostProfile::merged(sku, &CostDefaults::default(), None)
    }

    fn one_sku_problem() -> OptimizationProblem {
        let mut forecasts = BTreeMap::new();
        forecasts.insert("A".to_string(), forecast("A", 100.0));
        let mut costs = BTreeMap::new();
        costs.insert("A".to_string(), profile("A"));
        OptimizationProblem::build(forecasts, costs, None, None).unwrap()
    }

    #[test]
    fn test_build_accepts_matched_maps() {
        let problem = one_sku_problem();
        assert_eq!(problem.len(), 1);
        assert!(!problem.is_empty());
    }

    #[test]
    fn test_missing_cost_profile_rejected() {
        let mut forecasts = BTreeMap::new();
        forecasts.insert("A".to_string(), forecast("A", 10.0));
        let err =
            OptimizationProblem::build(forecasts, BTreeMap::new(), None, None).unwrap_err();
        assert!(err.to_string().contains("missing cost profile"));
        assert!(err.to_string().contains('A'));
    }

    #[test]
    fn test_negative_cost_field_rejected() {
        let mut forecasts = BTreeMap::new();
        forecasts.insert("A".to_string(), forecast("A", 10.0));
        let mut costs = BTreeMap::new();
        costs.insert(
            "A".to_string(),
            CostProfile {
                sku: "A".to_string(),
                unit_cost: -1.0,
                holding_cost: 1.0,
                shortage_penalty: 5.0,
                unit_volume: 1.0,
            },
        );
        let err = OptimizationProblem::build(forecasts, costs, None, None).unwrap_err();
        assert!(err.to_string().contains("unit_cost"));
    }

    #[test]
    fn test_negative_budget_rejected() {
        let mut forecasts = BTreeMap::new();
        forecasts.insert("A".to_string(), forecast("A", 10.0));
        let mut costs = BTreeMap::new();
        costs.insert("A".to_string(), profile("A"));
        let result = OptimizationProblem::build(forecasts, costs, Some(-5.0), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_limit_means_disabled() {
        let mut forecasts = BTreeMap::new();
        forecasts.insert("A".to_string(), forecast("A", 10.0));
        let mut costs = BTreeMap::new();
        costs.insert("A".to_string(), profile("A"));
        let problem =
            OptimizationProblem::build(forecasts, costs, Some(0.0), Some(0.0)).unwrap();
        assert_eq!(problem.budget(), None);
        assert_eq!(problem.capacity(), None);
    }

    #[test]
    fn test_positive_limits_kept() {
        let mut forecasts = BTreeMap::new();
        forecasts.insert("A".to_string(), forecast("A", 10.0));
        let mut costs = BTreeMap::new();
        costs.insert("A".to_string(), profile("A"));
        let problem =
            OptimizationProblem::build(forecasts, costs, Some(500.0), Some(80.0)).unwrap();
        assert_eq!(problem.budget(), Some(500.0));
        assert_eq!(problem.capacity(), Some(80.0));
    }

    #[test]
    fn test_non_finite_forecast_rejected() {
        let mut forecasts = BTreeMap::new();
        forecasts.insert("A".to_string(), forecast("A", f64::NAN));
        let mut costs = BTreeMap::new();
        costs.insert("A".to_string(), profile("A"));
        assert!(OptimizationProblem::build(forecasts, costs, None, None).is_err());
    }

    #[test]
    fn test_objective_at_mean_is_purchase_only() {
        let problem = one_sku_problem();
        let mut orders = BTreeMap::new();
        orders.insert("A".to_string(), 100.0);
        // Default unit cost 10, Q = mu = 100: no over/understock terms.
        assert!((problem.objective_value(&orders) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_objective_understock_term() {
        let problem = one_sku_problem();
        let mut orders = BTreeMap::new();
        orders.insert("A".to_string(), 90.0);
        // 10*90 purchase + 5*10 shortage (default penalty 5).
        assert!((problem.objective_value(&orders) - 950.0).abs() < 1e-9);
    }

    #[test]
    fn test_objective_overstock_term() {
        let problem = one_sku_problem();
        let mut orders = BTreeMap::new();
        orders.insert("A".to_string(), 110.0);
        // 10*110 purchase + 1*10 holding (default holding 1).
        assert!((problem.objective_value(&orders) - 1110.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_order_counts_as_zero() {
        let problem = one_sku_problem();
        let orders = BTreeMap::new();
        // Q = 0: pure shortage, 5 * 100.
        assert!((problem.objective_value(&orders) - 500.0).abs() < 1e-9);
        assert!((problem.purchase_total(&orders)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_split_coefficients() {
        let terms = one_sku_problem().terms();
        assert_eq!(terms.len(), 1);
        // c=10, h=1, p=5.
        assert!((terms[0].over_coeff() - 11.0).abs() < f64::EPSILON);
        assert!((terms[0].under_coeff() + 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_terms_in_sku_order() {
        let mut forecasts = BTreeMap::new();
        let mut costs = BTreeMap::new();
        for sku in ["B", "A", "C"] {
            forecasts.insert(sku.to_string(), forecast(sku, 1.0));
            costs.insert(sku.to_string(), profile(sku));
        }
        let problem = OptimizationProblem::build(forecasts, costs, None, None).unwrap();
        let terms = problem.terms();
        let order: Vec<&str> = terms.iter().map(|t| t.sku.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }
}
