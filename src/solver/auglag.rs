//! Augmented-Lagrangian solver with exact coordinate descent.
//!
//! Works on the split formulation `Q_i = mu_i + over_i - under_i`, which
//! makes the objective linear in the split variables and removes the kink
//! at `Q_i = mu_i`. The two resource constraints enter through an
//! augmented-Lagrangian penalty; each coordinate subproblem is a convex
//! piecewise-quadratic minimized exactly (leftmost argmin on flat
//! segments). A feasibility polish after descent projects onto the active
//! constraints and greedily refills remaining slack, so returned iterates
//! satisfy the limits exactly in f64 arithmetic.

use std::collections::BTreeMap;

use crate::error::{PlanError, PlanResult};
use crate::problem::{OptimizationProblem, SkuTerms};
use crate::solver::{
    BackendKind, CancelToken, ConstraintUsage, OptimizationResult, SolverBackend,
};

/// Default iteration budget (coordinate sweeps).
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
/// Default convergence tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Sweeps between multiplier updates.
const SWEEPS_PER_MULTIPLIER_UPDATE: usize = 25;
/// Penalty growth factor when constraint violation stalls.
const PENALTY_GROWTH: f64 = 10.0;
/// Penalty ceiling.
const PENALTY_MAX: f64 = 1e8;
/// Required violation shrink per multiplier update before the penalty grows.
const VIOLATION_SHRINK: f64 = 0.25;
/// Initial-point scale-down when the mean-demand guess violates a limit.
const INITIAL_SCALE: f64 = 0.95;

/// General nonlinear continuous backend; always available.
#[derive(Debug, Clone, Copy)]
pub struct AugLagSolver {
    max_iterations: usize,
    tolerance: f64,
}

/// One resource constraint `sum(coeff_i * Q_i) <= limit` in solver form.
struct Constraint {
    /// Per-SKU coefficient (unit cost for budget, unit volume for capacity).
    coeffs: Vec<f64>,
    limit: f64,
    /// Current `sum(coeff_i * Q_i) - limit`.
    residual: f64,
    multiplier: f64,
}

impl AugLagSolver {
    /// Create a solver with an iteration budget and tolerance.
    #[must_use]
    pub const fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    fn initial_orders(terms: &[SkuTerms], problem: &OptimizationProblem) -> Vec<f64> {
        let mut orders: Vec<f64> = terms.iter().map(|t| t.mu).collect();
        if let Some(budget) = problem.budget() {
            let spend: f64 = terms.iter().zip(&orders).map(|(t, q)| t.unit_cost * q).sum();
            if spend > budget {
                let scale = budget / spend * INITIAL_SCALE;
                for q in &mut orders {
                    *q *= scale;
                }
            }
        }
        if let Some(capacity) = problem.capacity() {
            let volume: f64 = terms
                .iter()
                .zip(&orders)
                .map(|(t, q)| t.unit_volume * q)
                .sum();
            if volume > capacity {
                let scale = capacity / volume * INITIAL_SCALE;
                for q in &mut orders {
                    *q *= scale;
                }
            }
        }
        orders
    }

    fn build_constraints(
        terms: &[SkuTerms],
        problem: &OptimizationProblem,
        orders: &[f64],
    ) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        if let Some(budget) = problem.budget() {
            let coeffs: Vec<f64> = terms.iter().map(|t| t.unit_cost).collect();
            let used: f64 = coeffs.iter().zip(orders).map(|(c, q)| c * q).sum();
            constraints.push(Constraint {
                coeffs,
                limit: budget,
                residual: used - budget,
                multiplier: 0.0,
            });
        }
        if let Some(capacity) = problem.capacity() {
            let coeffs: Vec<f64> = terms.iter().map(|t| t.unit_volume).collect();
            let used: f64 = coeffs.iter().zip(orders).map(|(v, q)| v * q).sum();
            constraints.push(Constraint {
                coeffs,
                limit: capacity,
                residual: used - capacity,
                multiplier: 0.0,
            });
        }
        constraints
    }

    /// Exact minimizer of `w*t + sum_j psi_j(t)` over `[lo, hi]`, where
    /// `psi_j` is the augmented-Lagrangian term of constraint `j` and the
    /// coordinate enters constraint `j` with coefficient `coeff_j`.
    ///
    /// The derivative is piecewise linear and nondecreasing; the minimizer
    /// is its leftmost zero crossing, clamped to the bounds.
    fn minimize_coordinate(
        w: f64,
        lo: f64,
        hi: f64,
        current: f64,
        pieces: &[(f64, f64, f64)], // (coeff, residual, multiplier)
        rho: f64,
    ) -> f64 {
        let deriv = |t: f64| -> f64 {
            w + pieces
                .iter()
                .map(|&(coeff, residual, multiplier)| {
                    coeff * (multiplier + rho * (residual + coeff * (t - current))).max(0.0)
                })
                .sum::<f64>()
        };

        if deriv(lo) >= 0.0 {
            return lo;
        }

        // Breakpoints where a constraint's penalty switches on or off.
        let mut breaks: Vec<f64> = pieces
            .iter()
            .filter(|&&(coeff, _, _)| coeff.abs() > 0.0)
            .map(|&(coeff, residual, multiplier)| {
                current + (-multiplier / rho - residual) / coeff
            })
            .filter(|t| *t > lo && *t < hi)
            .collect();
        breaks.sort_by(f64::total_cmp);

        let mut seg_lo = lo;
        let mut d_lo = deriv(lo);
        for b in breaks {
            let d_b = deriv(b);
            if d_b >= 0.0 {
                let slope = (d_b - d_lo) / (b - seg_lo);
                return if slope > 0.0 {
                    (seg_lo - d_lo / slope).clamp(lo, hi)
                } else {
                    b
                };
            }
            seg_lo = b;
            d_lo = d_b;
        }

        // Final segment: the derivative is linear on it, so its slope is
        // recoverable from one probe point inside the segment.
        let probe = if hi.is_finite() {
            (seg_lo + hi) / 2.0
        } else {
            seg_lo + 1.0
        };
        if probe > seg_lo {
            let slope = (deriv(probe) - d_lo) / (probe - seg_lo);
            if slope > 0.0 {
                let root = seg_lo - d_lo / slope;
                if root.is_finite() {
                    return root.clamp(lo, hi);
                }
            }
        }
        // Derivative stays negative: minimum sits at the upper bound.
        if hi.is_finite() {
            hi
        } else {
            current
        }
    }

    /// One cyclic sweep over all split variables. Returns the largest
    /// coordinate change.
    fn sweep(
        terms: &[SkuTerms],
        over: &mut [f64],
        under: &mut [f64],
        constraints: &mut [Constraint],
        rho: f64,
    ) -> f64 {
        let mut max_delta: f64 = 0.0;
        for i in 0..terms.len() {
            // Understock variable: enters each constraint with -coeff.
            let pieces: Vec<(f64, f64, f64)> = constraints
                .iter()
                .map(|c| (-c.coeffs[i], c.residual, c.multiplier))
                .collect();
            let new_u = Self::minimize_coordinate(
                terms[i].under_coeff(),
                0.0,
                terms[i].mu,
                under[i],
                &pieces,
                rho,
            );
            let delta_u = new_u - under[i];
            if delta_u.abs() > 0.0 {
                for c in constraints.iter_mut() {
                    c.residual -= c.coeffs[i] * delta_u;
                }
                under[i] = new_u;
                max_delta = max_delta.max(delta_u.abs());
            }

            // Overstock variable: enters each constraint with +coeff. Its
            // objective coefficient c+h is non-negative, so it pins to
            // zero unless a future constraint kind rewards overstock.
            let pieces: Vec<(f64, f64, f64)> = constraints
                .iter()
                .map(|c| (c.coeffs[i], c.residual, c.multiplier))
                .collect();
            let new_o = Self::minimize_coordinate(
                terms[i].over_coeff(),
                0.0,
                f64::INFINITY,
                over[i],
                &pieces,
                rho,
            );
            let delta_o = new_o - over[i];
            if delta_o.abs() > 0.0 {
                for c in constraints.iter_mut() {
                    c.residual += c.coeffs[i] * delta_o;
                }
                over[i] = new_o;
                max_delta = max_delta.max(delta_o.abs());
            }
        }
        max_delta
    }

    /// Project onto the active limits, then greedily refill remaining
    /// slack toward mean demand for SKUs where ordering is profitable.
    fn polish(terms: &[SkuTerms], orders: &mut [f64], problem: &OptimizationProblem) {
        for q in orders.iter_mut() {
            *q = q.max(0.0);
        }

        let mut scale: f64 = 1.0;
        if let Some(budget) = problem.budget() {
            let spend: f64 = terms.iter().zip(orders.iter()).map(|(t, q)| t.unit_cost * q).sum();
            if spend > budget {
                scale = scale.min(budget / spend);
            }
        }
        if let Some(capacity) = problem.capacity() {
            let volume: f64 = terms
                .iter()
                .zip(orders.iter())
                .map(|(t, q)| t.unit_volume * q)
                .sum();
            if volume > capacity {
                scale = scale.min(capacity / volume);
            }
        }
        if scale < 1.0 {
            for q in orders.iter_mut() {
                *q *= scale;
            }
        }

        let mut budget_slack = problem.budget().map_or(f64::INFINITY, |b| {
            b - terms
                .iter()
                .zip(orders.iter())
                .map(|(t, q)| t.unit_cost * q)
                .sum::<f64>()
        });
        let mut capacity_slack = problem.capacity().map_or(f64::INFINITY, |c| {
            c - terms
                .iter()
                .zip(orders.iter())
                .map(|(t, q)| t.unit_volume * q)
                .sum::<f64>()
        });

        // Most shortage relief per budget dollar first; sku breaks ties.
        let mut candidates: Vec<usize> = (0..terms.len())
            .filter(|&i| {
                terms[i].shortage_penalty > terms[i].unit_cost && orders[i] < terms[i].mu
            })
            .collect();
        candidates.sort_by(|&a, &b| {
            let gain = |i: usize| {
                let t = &terms[i];
                if t.unit_cost > 0.0 {
                    (t.shortage_penalty - t.unit_cost) / t.unit_cost
                } else {
                    f64::INFINITY
                }
            };
            gain(b)
                .partial_cmp(&gain(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| terms[a].sku.cmp(&terms[b].sku))
        });

        for i in candidates {
            if budget_slack <= 0.0 || capacity_slack <= 0.0 {
                break;
            }
            let t = &terms[i];
            let mut add = t.mu - orders[i];
            if t.unit_cost > 0.0 {
                add = add.min(budget_slack / t.unit_cost);
            }
            if t.unit_volume > 0.0 {
                add = add.min(capacity_slack / t.unit_volume);
            }
            if add > 0.0 {
                orders[i] += add;
                budget_slack -= t.unit_cost * add;
                capacity_slack -= t.unit_volume * add;
            }
        }
    }

    fn empty_result() -> OptimizationResult {
        OptimizationResult {
            order_quantities: BTreeMap::new(),
            objective_value: 0.0,
            solver_used: BackendKind::AugmentedLagrangian,
            converged: true,
            fallback_occurred: false,
            iterations: 0,
            constraint_usage: ConstraintUsage {
                budget_used: 0.0,
                capacity_used: 0.0,
            },
        }
    }
}

impl Default for AugLagSolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE)
    }
}

impl SolverBackend for AugLagSolver {
    fn kind(&self) -> BackendKind {
        BackendKind::AugmentedLagrangian
    }

    fn solve_with_cancel(
        &self,
        problem: &OptimizationProblem,
        cancel: &CancelToken,
    ) -> PlanResult<OptimizationResult> {
        let terms = problem.terms();
        if terms.is_empty() {
            return Ok(Self::empty_result());
        }

        let initial = Self::initial_orders(&terms, problem);
        let mut over = vec![0.0_f64; terms.len()];
        let mut under: Vec<f64> = terms
            .iter()
            .zip(&initial)
            .map(|(t, q)| (t.mu - q).max(0.0))
            .collect();
        let mut orders: Vec<f64> = initial;
        let mut constraints = Self::build_constraints(&terms, problem, &orders);

        let scale = terms.iter().map(|t| t.mu).fold(1.0_f64, f64::max);
        let step_tol = self.tolerance * scale;

        let mut rho = 10.0_f64;
        let mut prev_violation = f64::INFINITY;
        let mut iterations = 0usize;
        let mut converged = false;

        'outer: loop {
            let mut settled = false;
            for _ in 0..SWEEPS_PER_MULTIPLIER_UPDATE {
                if cancel.is_cancelled() {
                    return Err(PlanError::Cancelled);
                }
                if iterations >= self.max_iterations {
                    break 'outer;
                }
                iterations += 1;
                let delta =
                    Self::sweep(&terms, &mut over, &mut under, &mut constraints, rho);
                if delta <= step_tol {
                    settled = true;
                    break;
                }
            }

            let violation = constraints
                .iter()
                .map(|c| c.residual.max(0.0) / (1.0 + c.limit))
                .fold(0.0_f64, f64::max);

            if settled && violation <= self.tolerance {
                converged = true;
                break;
            }
            if iterations >= self.max_iterations {
                break;
            }

            for c in &mut constraints {
                c.multiplier = (c.multiplier + rho * c.residual).max(0.0);
            }
            if violation > VIOLATION_SHRINK * prev_violation {
                rho = (rho * PENALTY_GROWTH).min(PENALTY_MAX);
            }
            prev_violation = violation;
            tracing::debug!(iterations, violation, rho, "multiplier update");
        }

        for (i, t) in terms.iter().enumerate() {
            orders[i] = (t.mu + over[i] - under[i]).max(0.0);
        }
        Self::polish(&terms, &mut orders, problem);

        let order_quantities: BTreeMap<String, f64> = terms
            .iter()
            .zip(&orders)
            .map(|(t, q)| (t.sku.clone(), *q))
            .collect();
        let objective_value = problem.objective_value(&order_quantities);
        let constraint_usage = ConstraintUsage {
            budget_used: problem.purchase_total(&order_quantities),
            capacity_used: problem.volume_total(&order_quantities),
        };

        if !converged {
            tracing::warn!(iterations, "iteration budget exhausted before tolerance");
        }

        Ok(OptimizationResult {
            order_quantities,
            objective_value,
            solver_used: BackendKind::AugmentedLagrangian,
            converged,
            fallback_occurred: false,
            iterations,
            constraint_usage,
        })
    }
}
