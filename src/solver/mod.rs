//! Solver backends and backend selection.
//!
//! Two interchangeable backends solve the same split-variable formulation:
//! an augmented-Lagrangian method that is always available, and an exact
//! simplex LP backend behind the `simplex` feature (standing in for an
//! external solver runtime). Downstream code sees only
//! [`OptimizationResult`], never backend internals.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::PlanResult;
use crate::problem::OptimizationProblem;

pub mod auglag;
#[cfg(feature = "simplex")]
pub mod simplex;

pub use auglag::AugLagSolver;
#[cfg(feature = "simplex")]
pub use simplex::SimplexSolver;

/// Which solver backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Augmented Lagrangian with exact coordinate descent; always available.
    #[default]
    AugmentedLagrangian,
    /// Exact LP via the simplex method; requires the `simplex` feature.
    Simplex,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AugmentedLagrangian => write!(f, "augmented-lagrangian"),
            Self::Simplex => write!(f, "simplex"),
        }
    }
}

/// How much of each active constraint the solution consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintUsage {
    /// Total purchase spend, `sum(c_i * Q_i)`.
    pub budget_used: f64,
    /// Total storage volume, `sum(v_i * Q_i)`.
    pub capacity_used: f64,
}

/// Outcome of one solve.
///
/// Immutable and never partially populated: a failed solve returns an
/// error instead. `converged = false` is data, not a failure; the caller
/// decides how prominently to warn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Optimal order quantity per SKU, all non-negative.
    pub order_quantities: BTreeMap<String, f64>,
    /// Objective value at the returned quantities.
    pub objective_value: f64,
    /// Backend that produced this result.
    pub solver_used: BackendKind,
    /// Whether the numerical method met its tolerance in budget.
    pub converged: bool,
    /// True when the requested backend was unavailable and the
    /// selector substituted another.
    pub fallback_occurred: bool,
    /// Iterations consumed by the numerical method.
    pub iterations: usize,
    /// Constraint consumption at the returned quantities.
    pub constraint_usage: ConstraintUsage,
}

/// Cooperative cancellation handle for long-running solves.
///
/// Cloned tokens share state; cancelling any clone aborts the solve at
/// its next iteration checkpoint, discarding partial state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, non-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A solver backend consuming a validated problem.
///
/// Implementations hold configuration only; no state is shared across
/// calls, so one backend instance may serve concurrent solves.
pub trait SolverBackend: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Solve the problem, polling `cancel` at iteration checkpoints.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Cancelled` when the token fires, or
    /// `PlanError::Infeasible` when the constraint set admits no solution.
    fn solve_with_cancel(
        &self,
        problem: &OptimizationProblem,
        cancel: &CancelToken,
    ) -> PlanResult<OptimizationResult>;

    /// Solve without external cancellation.
    ///
    /// # Errors
    ///
    /// Same as [`SolverBackend::solve_with_cancel`], minus cancellation.
    fn solve(&self, problem: &OptimizationProblem) -> PlanResult<OptimizationResult> {
        self.solve_with_cancel(problem, &CancelToken::new())
    }
}

/// Which backends this process can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// Whether the simplex runtime is present in this build.
    pub simplex: bool,
}

impl Availability {
    /// Probe backend availability, once per process.
    ///
    /// The probe result is cached for the process lifetime; backends are
    /// never probed per-call.
    #[must_use]
    pub fn probe() -> Self {
        static PROBED: OnceLock<Availability> = OnceLock::new();
        *PROBED.get_or_init(|| Self {
            simplex: cfg!(feature = "simplex"),
        })
    }
}

/// A chosen backend plus whether fallback substitution happened.
pub struct Selection {
    /// The backend to run.
    pub backend: Box<dyn SolverBackend>,
    /// True when the requested backend was unavailable and the
    /// augmented-Lagrangian backend was substituted.
    pub fallback_occurred: bool,
}

/// Chooses a backend for a requested kind, with deterministic fallback.
#[derive(Debug, Clone, Copy)]
pub struct SolverSelector {
    max_iterations: usize,
    tolerance: f64,
}

impl SolverSelector {
    /// Create a selector carrying the solver controls to configure
    /// whichever backend gets chosen.
    #[must_use]
    pub const fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    /// Select a backend, substituting the augmented-Lagrangian solver
    /// when the requested one is unavailable.
    ///
    /// Substitution is the documented behavior, not an error: the caller
    /// always gets a usable backend, and `fallback_occurred` is carried
    /// onto the eventual result.
    #[must_use]
    pub fn select(&self, requested: BackendKind) -> Selection {
        self.select_with(requested, Availability::probe())
    }

    /// Selection against an explicit availability, as an injection seam
    /// so the fallback path is testable in any build.
    #[must_use]
    pub fn select_with(&self, requested: BackendKind, availability: Availability) -> Selection {
        match requested {
            BackendKind::AugmentedLagrangian => Selection {
                backend: Box::new(self.auglag()),
                fallback_occurred: false,
            },
            BackendKind::Simplex => self.select_simplex(availability),
        }
    }

    #[cfg(feature = "simplex")]
    fn select_simplex(&self, availability: Availability) -> Selection {
        if availability.simplex {
            Selection {
                backend: Box::new(SimplexSolver::new()),
                fallback_occurred: false,
            }
        } else {
            tracing::warn!("simplex backend unavailable, falling back to augmented-lagrangian");
            Selection {
                backend: Box::new(self.auglag()),
                fallback_occurred: true,
            }
        }
    }

    #[cfg(not(feature = "simplex"))]
    fn select_simplex(&self, _availability: Availability) -> Selection {
        tracing::warn!("simplex backend unavailable, falling back to augmented-lagrangian");
        Selection {
            backend: Box::new(self.auglag()),
            fallback_occurred: true,
        }
    }

    fn auglag(&self) -> AugLagSolver {
        AugLagSolver::new(self.max_iterations, self.tolerance)
    }
}

impl Default for SolverSelector {
    fn default() -> Self {
        Self::new(auglag::DEFAULT_MAX_ITERATIONS, auglag::DEFAULT_TOLERANCE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_serde_kebab_case() {
        let json = serde_json::to_string(&BackendKind::AugmentedLagrangian).unwrap();
        assert_eq!(json, "\"augmented-lagrangian\"");
        let kind: BackendKind = serde_json::from_str("\"simplex\"").unwrap();
        assert_eq!(kind, BackendKind::Simplex);
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::AugmentedLagrangian.to_string(), "augmented-lagrangian");
        assert_eq!(BackendKind::Simplex.to_string(), "simplex");
    }

    #[test]
    fn test_cancel_token_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_probe_is_stable() {
        // Cached per process: repeated probes agree.
        assert_eq!(Availability::probe(), Availability::probe());
    }

    #[test]
    fn test_auglag_never_falls_back() {
        let selection = SolverSelector::default()
            .select_with(BackendKind::AugmentedLagrangian, Availability { simplex: false });
        assert!(!selection.fallback_occurred);
        assert_eq!(selection.backend.kind(), BackendKind::AugmentedLagrangian);
    }

    #[test]
    fn test_unavailable_simplex_substitutes_auglag() {
        let selection = SolverSelector::default()
            .select_with(BackendKind::Simplex, Availability { simplex: false });
        assert!(selection.fallback_occurred);
        assert_eq!(selection.backend.kind(), BackendKind::AugmentedLagrangian);
    }

    #[cfg(feature = "simplex")]
    #[test]
    fn test_available_simplex_selected() {
        let selection = SolverSelector::default()
            .select_with(BackendKind::Simplex, Availability { simplex: true });
        assert!(!selection.fallback_occurred);
        assert_eq!(selection.backend.kind(), BackendKind::Simplex);
    }
}
