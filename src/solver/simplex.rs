//! Exact LP backend over the `microlp` simplex solver.
//!
//! Uses the same overstock/understock splitting as the
//! augmented-Lagrangian backend, under which the objective and both
//! resource constraints are linear, so the simplex method returns the
//! global optimum of this convex problem rather than a stationary point.
//!
//! Only compiled with the `simplex` feature; without it the backend type
//! does not exist and the selector falls back.

use std::collections::BTreeMap;

use microlp::{ComparisonOp, OptimizationDirection, Problem as LpProblem, Variable};

use crate::error::{PlanError, PlanResult};
use crate::problem::OptimizationProblem;
use crate::solver::{
    BackendKind, CancelToken, ConstraintUsage, OptimizationResult, SolverBackend,
};

/// Exact constrained backend; global optimum via the simplex method.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplexSolver;

impl SimplexSolver {
    /// Create the backend.
    ///
    /// Construction only succeeds in builds carrying the solver runtime;
    /// there is no partially initialized state to observe.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SolverBackend for SimplexSolver {
    fn kind(&self) -> BackendKind {
        BackendKind::Simplex
    }

    fn solve_with_cancel(
        &self,
        problem: &OptimizationProblem,
        cancel: &CancelToken,
    ) -> PlanResult<OptimizationResult> {
        if cancel.is_cancelled() {
            return Err(PlanError::Cancelled);
        }

        let terms = problem.terms();
        let mut lp = LpProblem::new(OptimizationDirection::Minimize);

        // One (over, under) pair per SKU; the constant sum(c*mu) is left
        // out of the LP and restored through the shared cost formula.
        let vars: Vec<(Variable, Variable)> = terms
            .iter()
            .map(|t| {
                let over = lp.add_var(t.over_coeff(), (0.0, f64::INFINITY));
                let under = lp.add_var(t.under_coeff(), (0.0, t.mu));
                (over, under)
            })
            .collect();

        if let Some(budget) = problem.budget() {
            let spend_at_mean: f64 = terms.iter().map(|t| t.unit_cost * t.mu).sum();
            let row: Vec<(Variable, f64)> = terms
                .iter()
                .zip(&vars)
                .flat_map(|(t, &(over, under))| {
                    [(over, t.unit_cost), (under, -t.unit_cost)]
                })
                .collect();
            lp.add_constraint(row, ComparisonOp::Le, budget - spend_at_mean);
        }
        if let Some(capacity) = problem.capacity() {
            let volume_at_mean: f64 = terms.iter().map(|t| t.unit_volume * t.mu).sum();
            let row: Vec<(Variable, f64)> = terms
                .iter()
                .zip(&vars)
                .flat_map(|(t, &(over, under))| {
                    [(over, t.unit_volume), (under, -t.unit_volume)]
                })
                .collect();
            lp.add_constraint(row, ComparisonOp::Le, capacity - volume_at_mean);
        }

        let solution = lp.solve().map_err(|err| match err {
            microlp::Error::Infeasible => {
                PlanError::infeasible("constraint set admits no order plan")
            }
            microlp::Error::Unbounded => {
                PlanError::infeasible("objective unbounded below, formulation inconsistent")
            }
            other => PlanError::solver(other.to_string()),
        })?;

        let order_quantities: BTreeMap<String, f64> = terms
            .iter()
            .zip(&vars)
            .map(|(t, &(over, under))| {
                let q = (t.mu + solution[over] - solution[under]).max(0.0);
                (t.sku.clone(), q)
            })
            .collect();

        // Objective recomputed through the shared formula so both
        // backends report identically shaped numbers.
        let objective_value = problem.objective_value(&order_quantities);
        let constraint_usage = ConstraintUsage {
            budget_used: problem.purchase_total(&order_quantities),
            capacity_used: problem.volume_total(&order_quantities),
        };

        Ok(OptimizationResult {
            order_quantities,
            objective_value,
            solver_used: BackendKind::Simplex,
            converged: true,
            fallback_occurred: false,
            iterations: 1,
            constraint_usage,
        })
    }
}
