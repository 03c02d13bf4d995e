//! Error types for restock.
//!
//! All fallible operations return `Result<T, PlanError>`; numerical
//! non-convergence is reported inside results, never as an error.

use thiserror::Error;

/// Result type alias for restock operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Unified error type for all restock operations.
///
/// Validation errors stop the pipeline before any solver runs. Solver
/// unavailability is absorbed by the selector's fallback and only surfaces
/// when fallback has been disabled explicitly.
#[derive(Debug, Error)]
pub enum PlanError {
    // ===== Forecast Errors =====
    /// A SKU has zero demand observations and cannot be forecast.
    #[error("Insufficient data: SKU '{sku}' has no demand observations")]
    InsufficientData {
        /// SKU that could not be forecast.
        sku: String,
    },

    // ===== Problem Errors =====
    /// Malformed optimization problem, detected at construction.
    #[error("Problem validation failed: {message}")]
    ProblemValidation {
        /// Description of the inconsistency.
        message: String,
    },

    /// Constraints admit no feasible order quantities.
    #[error("Infeasible problem: {detail}")]
    Infeasible {
        /// Description of the conflicting constraints.
        detail: String,
    },

    // ===== Solver Errors =====
    /// Requested backend's runtime is not present in this build.
    #[error("Solver backend '{backend}' is unavailable")]
    SolverUnavailable {
        /// Name of the missing backend.
        backend: String,
    },

    /// A solve was cancelled at an iteration checkpoint.
    #[error("Solve cancelled before completion")]
    Cancelled,

    /// Unexpected solver failure.
    #[error("Solver error: {message}")]
    Solver {
        /// Description of the failure.
        message: String,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Schema validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PlanError {
    /// Create an insufficient-data error for a SKU.
    #[must_use]
    pub fn insufficient_data(sku: impl Into<String>) -> Self {
        Self::InsufficientData { sku: sku.into() }
    }

    /// Create a problem-validation error with a message.
    #[must_use]
    pub fn problem_validation(message: impl Into<String>) -> Self {
        Self::ProblemValidation {
            message: message.into(),
        }
    }

    /// Create an infeasibility error.
    #[must_use]
    pub fn infeasible(detail: impl Into<String>) -> Self {
        Self::Infeasible {
            detail: detail.into(),
        }
    }

    /// Create a solver-unavailable error for a backend name.
    #[must_use]
    pub fn solver_unavailable(backend: impl Into<String>) -> Self {
        Self::SolverUnavailable {
            backend: backend.into(),
        }
    }

    /// Create an unexpected-solver-failure error.
    #[must_use]
    pub fn solver(message: impl Into<String>) -> Self {
        Self::Solver {
            message: message.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this error was raised before any solver ran
    /// (bad input rather than a failed solve).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. }
                | Self::ProblemValidation { .. }
                | Self::Config { .. }
                | Self::YamlParse(_)
                | Self::Validation(_)
        )
    }
}
