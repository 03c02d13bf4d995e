//! CLI output formatting.
//!
//! Text and JSON renderers over the plain report data, plus the help,
//! version, and starter-scenario printers. Rendering returns strings so
//! tests can assert on output without capturing stdout.

use crate::error::{PlanError, PlanResult};
use crate::insight::Finding;
use crate::planner::PlanReport;

/// Print version information.
pub fn print_version() {
    println!("restock {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message.
pub fn print_help() {
    println!(
        r"restock - demand forecasting and constrained order-quantity optimization

USAGE:
    restock <COMMAND> [OPTIONS]

COMMANDS:
    plan <scenario.yaml>        Run a planning scenario
        --json                  Emit the full report as JSON
        --seed <N>              Override the synthetic demand seed
        --backend <K>           Override the solver backend
                                (augmented-lagrangian | simplex)

    example                     Print a starter scenario to stdout

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    restock example > scenario.yaml
    restock plan scenario.yaml
    restock plan scenario.yaml --json --backend simplex
"
    );
}

/// A starter scenario, runnable as-is.
#[must_use]
pub fn example_scenario() -> &'static str {
    r"# restock scenario
forecast:
  window: 8
defaults:
  unit_cost: 10.0
  holding_cost: 1.0
  shortage_penalty: 5.0
  unit_volume: 1.0
overrides:
  WIDGET-A:
    shortage_penalty: 25.0
constraints:
  budget: 5000.0   # 0 disables
  capacity: 0.0    # 0 disables
solver:
  backend: augmented-lagrangian
  max_iterations: 1000
  tolerance: 1.0e-6
demand:
  synthetic:
    seed: 42
    periods: 24
    skus:
      - sku: WIDGET-A
        base_level: 120.0
        noise: 0.2
      - sku: WIDGET-B
        base_level: 45.0
        noise: 0.1
"
}

/// Render a report as human-readable text.
#[must_use]
pub fn render_text(report: &PlanReport) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let result = &report.result;
    let metrics = &report.metrics;

    let _ = writeln!(out, "Solver: {}", result.solver_used);
    let _ = writeln!(
        out,
        "Converged: {} ({} iterations)",
        if result.converged { "yes" } else { "no" },
        result.iterations
    );
    if result.fallback_occurred {
        let _ = writeln!(out, "Note: requested backend unavailable, fell back");
    }
    let _ = writeln!(out, "Objective: {:.2}", result.objective_value);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:<16} {:>10} {:>10} {:>12} {:>12} {:>12} {:>12}",
        "SKU", "mean", "order", "purchase", "holding", "shortage", "total"
    );
    for insight in &report.insights {
        let _ = writeln!(
            out,
            "{:<16} {:>10.2} {:>10.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
            insight.sku,
            insight.mean_demand,
            insight.order_quantity,
            insight.purchase_cost,
            insight.holding_cost,
            insight.shortage_cost,
            insight.total_cost
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Total cost:     {:.2}", metrics.total_cost);
    let _ = writeln!(out, "  purchase:     {:.2}", metrics.total_purchase_cost);
    let _ = writeln!(out, "  holding:      {:.2}", metrics.total_holding_cost);
    let _ = writeln!(out, "  shortage:     {:.2}", metrics.total_shortage_cost);
    if let Some(utilization) = metrics.budget_utilization {
        let _ = writeln!(
            out,
            "Budget:         {:.2} used ({:.1}%)",
            metrics.budget_used,
            utilization * 100.0
        );
    }
    if let Some(utilization) = metrics.capacity_utilization {
        let _ = writeln!(
            out,
            "Capacity:       {:.2} used ({:.1}%)",
            metrics.capacity_used,
            utilization * 100.0
        );
    }

    if !report.findings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Findings:");
        for finding in &report.findings {
            let _ = writeln!(out, "  - {}", describe_finding(finding));
        }
    }

    out
}

/// Render a report as pretty-printed JSON.
///
/// # Errors
///
/// Returns `PlanError::Serialization` if JSON encoding fails.
pub fn render_json(report: &PlanReport) -> PlanResult<String> {
    serde_json::to_string_pretty(report).map_err(|e| PlanError::serialization(e.to_string()))
}

fn describe_finding(finding: &Finding) -> String {
    match finding {
        Finding::BudgetNearLimit { utilization } => format!(
            "budget utilization is {:.1}%, consider raising the budget",
            utilization * 100.0
        ),
        Finding::BudgetUnderused { utilization } => format!(
            "only {:.1}% of the budget is used, it could be reduced",
            utilization * 100.0
        ),
        Finding::CapacityNearLimit { utilization } => format!(
            "capacity utilization is {:.1}%, storage is nearly full",
            utilization * 100.0
        ),
        Finding::CapacityUnderused { utilization } => format!(
            "only {:.1}% of capacity is used",
            utilization * 100.0
        ),
        Finding::Stockpiling { sku, ratio } => format!(
            "{sku} is ordered at {:.0}% of forecast demand (stockpiling)",
            ratio * 100.0
        ),
        Finding::LeanOrdering { sku, ratio } => format!(
            "{sku} is ordered at {:.0}% of forecast demand (lean)",
            ratio * 100.0
        ),
        Finding::HoldingDominated { holding, shortage } => format!(
            "holding cost ({holding:.2}) dominates shortage cost ({shortage:.2})"
        ),
        Finding::ShortageDominated { holding, shortage } => format!(
            "shortage cost ({shortage:.2}) dominates holding cost ({holding:.2})"
        ),
        Finding::TopCostDrivers { skus } => {
            format!("top cost drivers: {}", skus.join(", "))
        }
        Finding::NotConverged => {
            "solver stopped on its iteration budget before reaching tolerance".to_string()
        }
        Finding::FallbackUsed => {
            "requested backend was unavailable, results come from the fallback".to_string()
        }
    }
}
