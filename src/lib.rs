//! # restock
//!
//! Demand forecasting and constrained order-quantity optimization for SKU
//! portfolios.
//!
//! The pipeline: per-SKU demand history is reduced to a trailing-window
//! forecast, merged with cost parameters into a validated optimization
//! problem, solved by one of two interchangeable backends (an
//! augmented-Lagrangian method, always available, or an exact simplex LP
//! behind the `simplex` feature), and interpreted into cost breakdowns
//! and structured findings.
//!
//! ## Example
//!
//! ```rust
//! use restock::prelude::*;
//! use std::collections::BTreeMap;
//!
//! let mut demand = BTreeMap::new();
//! demand.insert("WIDGET-A".to_string(), vec![100.0, 110.0, 90.0, 100.0]);
//!
//! let config = PlannerConfig::builder()
//!     .window(4)
//!     .budget(5_000.0)
//!     .inline_demand(demand)
//!     .build();
//!
//! let report = Planner::new(config)?.run()?;
//! assert!(report.result.converged);
//! # Ok::<(), restock::PlanError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::suboptimal_flops,  // Numerical code choices are intentional
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
    clippy::float_cmp,  // Exact float comparisons are deliberate at validation seams
)]

pub mod cli;
pub mod config;
pub mod cost;
pub mod demand;
pub mod error;
pub mod forecast;
pub mod insight;
pub mod planner;
pub mod problem;
pub mod solver;
pub mod synthetic;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{DemandSource, PlannerConfig, PlannerConfigBuilder};
    pub use crate::cost::{CostDefaults, CostOverride, CostProfile};
    pub use crate::demand::{DemandPoint, DemandSeries};
    pub use crate::error::{PlanError, PlanResult};
    pub use crate::forecast::{ForecastModel, ForecastRecord};
    pub use crate::insight::{AggregateMetrics, Finding, ResultInterpreter, SkuInsight};
    pub use crate::planner::{PlanReport, Planner};
    pub use crate::problem::OptimizationProblem;
    pub use crate::solver::{
        AugLagSolver, Availability, BackendKind, CancelToken, OptimizationResult,
        SolverBackend, SolverSelector,
    };
    pub use crate::synthetic::{SyntheticConfig, SyntheticSku};
}

pub use error::{PlanError, PlanResult};
