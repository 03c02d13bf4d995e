//! Scenario configuration with YAML schema and validation.
//!
//! A `PlannerConfig` is the single input to a planning run: forecast
//! window, cost defaults and per-SKU overrides, constraint limits, solver
//! controls, and the demand source. Unknown fields are rejected, schema
//! checks run via `validator`, and cross-field rules run in a semantic
//! pass, so a config that loads is a config that can run.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::cost::{CostDefaults, CostOverride};
use crate::demand::DemandSeries;
use crate::error::{PlanError, PlanResult};
use crate::forecast::DEFAULT_WINDOW;
use crate::solver::BackendKind;
use crate::synthetic::SyntheticConfig;

/// Top-level planning scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Forecasting settings.
    #[validate(nested)]
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Cost parameters applied to SKUs without explicit overrides.
    #[validate(nested)]
    #[serde(default)]
    pub defaults: CostDefaults,

    /// Per-SKU partial cost overrides, merged field-by-field.
    #[serde(default)]
    pub overrides: BTreeMap<String, CostOverride>,

    /// Budget and capacity limits.
    #[validate(nested)]
    #[serde(default)]
    pub constraints: ConstraintConfig,

    /// Solver backend and controls.
    #[validate(nested)]
    #[serde(default)]
    pub solver: SolverConfig,

    /// Where demand history comes from. `singleton_map` keeps the YAML
    /// shape a plain nested map (`demand:\n  inline: ...`) instead of
    /// serde_yaml's `!tag` notation.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub demand: DemandSource,
}

/// Forecasting settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    /// Trailing window length in periods.
    #[validate(range(min = 1))]
    #[serde(default = "default_window")]
    pub window: usize,
}

const fn default_window() -> usize {
    DEFAULT_WINDOW
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

/// Budget and capacity limits. Zero disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, Default)]
#[serde(deny_unknown_fields)]
pub struct ConstraintConfig {
    /// Maximum total purchase spend; 0 means no constraint.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub budget: f64,

    /// Maximum total storage volume; 0 means no constraint.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub capacity: f64,
}

impl ConstraintConfig {
    /// Budget as an optional limit (zero means disabled).
    #[must_use]
    pub fn budget_limit(&self) -> Option<f64> {
        (self.budget > 0.0).then_some(self.budget)
    }

    /// Capacity as an optional limit (zero means disabled).
    #[must_use]
    pub fn capacity_limit(&self) -> Option<f64> {
        (self.capacity > 0.0).then_some(self.capacity)
    }
}

/// Solver backend and numerical controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    /// Which backend to run.
    #[serde(default)]
    pub backend: BackendKind,

    /// Iteration budget for the numerical method.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Convergence tolerance.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

const fn default_max_iterations() -> usize {
    crate::solver::auglag::DEFAULT_MAX_ITERATIONS
}

const fn default_tolerance() -> f64 {
    crate::solver::auglag::DEFAULT_TOLERANCE
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

/// Demand history source: inline series or seeded synthetic generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum DemandSource {
    /// Per-SKU quantities, oldest first, periods implied.
    Inline(BTreeMap<String, Vec<f64>>),
    /// Seeded synthetic generation.
    Synthetic(SyntheticConfig),
}

impl PlannerConfig {
    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, the YAML does not
    /// parse, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> PlanResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error when parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> PlanResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        config.validate_semantic()?;
        Ok(config)
    }

    /// Create a builder for programmatic construction.
    #[must_use]
    pub fn builder() -> PlannerConfigBuilder {
        PlannerConfigBuilder::default()
    }

    /// Cross-field rules beyond what the schema can express.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Config` on violation.
    pub fn validate_semantic(&self) -> PlanResult<()> {
        if !self.solver.tolerance.is_finite() || self.solver.tolerance <= 0.0 {
            return Err(PlanError::config(format!(
                "solver tolerance must be positive and finite, got {}",
                self.solver.tolerance
            )));
        }
        for (sku, ov) in &self.overrides {
            ov.validate()?;
            if sku.is_empty() {
                return Err(PlanError::config("override SKU identifier is empty"));
            }
        }
        match &self.demand {
            DemandSource::Inline(table) => {
                if table.is_empty() {
                    return Err(PlanError::config("inline demand table has no SKUs"));
                }
            }
            DemandSource::Synthetic(synthetic) => synthetic.validate()?,
        }
        Ok(())
    }

    /// Materialize the demand table from the configured source.
    ///
    /// # Errors
    ///
    /// Propagates series construction failures (negative or non-finite
    /// quantities in inline data).
    pub fn demand_table(&self) -> PlanResult<BTreeMap<String, DemandSeries>> {
        match &self.demand {
            DemandSource::Inline(table) => table
                .iter()
                .map(|(sku, quantities)| {
                    Ok((sku.clone(), DemandSeries::from_quantities(quantities)?))
                })
                .collect(),
            DemandSource::Synthetic(synthetic) => synthetic.generate(),
        }
    }
}

/// Builder for programmatic scenario construction.
#[derive(Debug, Default)]
pub struct PlannerConfigBuilder {
    window: Option<usize>,
    defaults: Option<CostDefaults>,
    overrides: BTreeMap<String, CostOverride>,
    budget: Option<f64>,
    capacity: Option<f64>,
    backend: Option<BackendKind>,
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
    demand: Option<DemandSource>,
}

impl PlannerConfigBuilder {
    /// Set the forecast window.
    #[must_use]
    pub const fn window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }

    /// Set the cost defaults table.
    #[must_use]
    pub const fn defaults(mut self, defaults: CostDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Add a per-SKU cost override.
    #[must_use]
    pub fn cost_override(mut self, sku: impl Into<String>, ov: CostOverride) -> Self {
        self.overrides.insert(sku.into(), ov);
        self
    }

    /// Set the budget limit (0 disables).
    #[must_use]
    pub const fn budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Set the capacity limit (0 disables).
    #[must_use]
    pub const fn capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the solver backend.
    #[must_use]
    pub const fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the solver iteration budget.
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Set the solver tolerance.
    #[must_use]
    pub const fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Provide inline demand: per-SKU quantities, oldest first.
    #[must_use]
    pub fn inline_demand(mut self, table: BTreeMap<String, Vec<f64>>) -> Self {
        self.demand = Some(DemandSource::Inline(table));
        self
    }

    /// Provide a synthetic demand source.
    #[must_use]
    pub fn synthetic_demand(mut self, synthetic: SyntheticConfig) -> Self {
        self.demand = Some(DemandSource::Synthetic(synthetic));
        self
    }

    /// Build the configuration.
    ///
    /// An unset demand source yields an empty inline table, which fails
    /// semantic validation at run time; real callers always set one.
    #[must_use]
    pub fn build(self) -> PlannerConfig {
        PlannerConfig {
            forecast: ForecastConfig {
                window: self.window.unwrap_or(DEFAULT_WINDOW),
            },
            defaults: self.defaults.unwrap_or_default(),
            overrides: self.overrides,
            constraints: ConstraintConfig {
                budget: self.budget.unwrap_or(0.0),
                capacity: self.capacity.unwrap_or(0.0),
            },
            solver: SolverConfig {
                backend: self.backend.unwrap_or_default(),
                max_iterations: self.max_iterations.unwrap_or_else(default_max_iterations),
                tolerance: self.tolerance.unwrap_or_else(default_tolerance),
            },
            demand: self.demand.unwrap_or(DemandSource::Inline(BTreeMap::new())),
        }
    }
}
