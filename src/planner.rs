//! End-to-end planning pipeline.
//!
//! `Planner` wires the stages in order: demand table, forecasts, cost
//! merge, problem assembly, backend selection, solve, interpretation. It
//! adds no semantics of its own; the binary, integration tests, and
//! benches all run through it so there is exactly one wiring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::config::PlannerConfig;
use crate::cost::CostProfile;
use crate::error::PlanResult;
use crate::forecast::{ForecastModel, ForecastRecord};
use crate::insight::{AggregateMetrics, Finding, ResultInterpreter, SkuInsight};
use crate::problem::OptimizationProblem;
use crate::solver::{CancelToken, OptimizationResult, SolverSelector};

/// Everything one planning run produces, as plain structured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    /// Per-SKU forecasts the problem was built from.
    pub forecasts: BTreeMap<String, ForecastRecord>,
    /// Raw solver output.
    pub result: OptimizationResult,
    /// Per-SKU cost breakdowns, ranked by total cost.
    pub insights: Vec<SkuInsight>,
    /// Portfolio-level summary.
    pub metrics: AggregateMetrics,
    /// Structured observations for the presentation layer.
    pub findings: Vec<Finding>,
}

/// The forecasting-to-optimization pipeline, driven by one config.
#[derive(Debug, Clone)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    /// Create a planner from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the config's cross-field rules
    /// fail (the YAML loader has already run them; this re-checks
    /// builder-constructed configs).
    pub fn new(config: PlannerConfig) -> PlanResult<Self> {
        config.validate_semantic()?;
        Ok(Self { config })
    }

    /// The configuration this planner runs.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    ///
    /// Propagates validation and forecast errors raised before solving,
    /// and solver failures.
    pub fn run(&self) -> PlanResult<PlanReport> {
        self.run_with_cancel(&CancelToken::new())
    }

    /// Run the full pipeline with cooperative cancellation.
    ///
    /// Each solve is an independent unit of work: nothing is shared
    /// across calls and no partial report is ever returned.
    ///
    /// # Errors
    ///
    /// As [`Planner::run`], plus `PlanError::Cancelled` when the token
    /// fires mid-solve.
    pub fn run_with_cancel(&self, cancel: &CancelToken) -> PlanResult<PlanReport> {
        let demand = {
            let _span = info_span!("demand").entered();
            let table = self.config.demand_table()?;
            debug!(skus = table.len(), "demand table materialized");
            table
        };

        let forecasts = {
            let _span = info_span!("forecast").entered();
            let model = ForecastModel::new(self.config.forecast.window)?;
            model.forecast_all(&demand)?
        };

        let problem = {
            let _span = info_span!("assemble").entered();
            let costs: BTreeMap<String, CostProfile> = forecasts
                .keys()
                .map(|sku| {
                    let profile = CostProfile::merged(
                        sku,
                        &self.config.defaults,
                        self.config.overrides.get(sku),
                    );
                    (sku.clone(), profile)
                })
                .collect();
            OptimizationProblem::build(
                forecasts.clone(),
                costs,
                self.config.constraints.budget_limit(),
                self.config.constraints.capacity_limit(),
            )?
        };

        let result = {
            let _span = info_span!("solve").entered();
            let selector = SolverSelector::new(
                self.config.solver.max_iterations,
                self.config.solver.tolerance,
            );
            let selection = selector.select(self.config.solver.backend);
            let mut result = selection.backend.solve_with_cancel(&problem, cancel)?;
            result.fallback_occurred = selection.fallback_occurred;
            info!(
                backend = %result.solver_used,
                converged = result.converged,
                iterations = result.iterations,
                objective = result.objective_value,
                "solve finished"
            );
            result
        };

        let (insights, metrics, findings) = {
            let _span = info_span!("interpret").entered();
            let (insights, metrics) = ResultInterpreter::interpret(&result, &problem);
            let findings = ResultInterpreter::findings(&result, &insights, &metrics);
            (insights, metrics, findings)
        };

        Ok(PlanReport {
            forecasts,
            result,
            insights,
            metrics,
            findings,
        })
    }
}
