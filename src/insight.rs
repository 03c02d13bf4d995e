//! Interpretation of solver output into cost breakdowns and findings.
//!
//! Everything here is pure arithmetic over an [`OptimizationResult`] and
//! the problem it came from: per-SKU cost components, aggregate totals and
//! utilizations, and structured findings for the presentation layer. No
//! solving happens here and repeated calls with identical inputs produce
//! identical output.

use serde::{Deserialize, Serialize};

use crate::problem::OptimizationProblem;
use crate::solver::OptimizationResult;

/// Utilization above which a constraint counts as nearly exhausted.
const NEAR_LIMIT_THRESHOLD: f64 = 0.95;
/// Utilization below which an active constraint counts as underused.
const UNDERUSED_THRESHOLD: f64 = 0.5;
/// Order-to-mean ratio above which a SKU counts as stockpiled.
const STOCKPILING_RATIO: f64 = 1.2;
/// Order-to-mean ratio below which a SKU counts as lean.
const LEAN_RATIO: f64 = 0.8;
/// Factor by which one cost component must exceed the other to dominate.
const DOMINANCE_FACTOR: f64 = 1.5;
/// How many SKUs the cost-driver finding names.
const TOP_DRIVERS: usize = 3;

/// Per-SKU cost breakdown derived from a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuInsight {
    /// SKU identifier.
    pub sku: String,
    /// Optimal order quantity.
    pub order_quantity: f64,
    /// Forecast mean demand.
    pub mean_demand: f64,
    /// `unit_cost * Q`.
    pub purchase_cost: f64,
    /// `holding_cost * max(Q - mu, 0)`.
    pub holding_cost: f64,
    /// `shortage_penalty * max(mu - Q, 0)`.
    pub shortage_cost: f64,
    /// Sum of the three components.
    pub total_cost: f64,
    /// `Q / mu`; `None` when mean demand is zero.
    pub order_to_mean_ratio: Option<f64>,
}

/// Portfolio-level cost and utilization summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    /// Sum of purchase costs.
    pub total_purchase_cost: f64,
    /// Sum of holding costs.
    pub total_holding_cost: f64,
    /// Sum of shortage costs.
    pub total_shortage_cost: f64,
    /// Sum of total costs.
    pub total_cost: f64,
    /// Total purchase spend.
    pub budget_used: f64,
    /// `budget_used / budget`; `None` when no budget is active.
    pub budget_utilization: Option<f64>,
    /// Total storage volume.
    pub capacity_used: f64,
    /// `capacity_used / capacity`; `None` when no capacity is active.
    pub capacity_utilization: Option<f64>,
    /// Number of SKUs in the solve.
    pub sku_count: usize,
}

/// A structured observation about a solve, for the presentation layer.
///
/// Findings are data; rendering them as prose is the consumer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Finding {
    /// Budget utilization exceeds the near-limit threshold.
    BudgetNearLimit {
        /// Fraction of budget consumed.
        utilization: f64,
    },
    /// An active budget is less than half used.
    BudgetUnderused {
        /// Fraction of budget consumed.
        utilization: f64,
    },
    /// Capacity utilization exceeds the near-limit threshold.
    CapacityNearLimit {
        /// Fraction of capacity consumed.
        utilization: f64,
    },
    /// An active capacity is less than half used.
    CapacityUnderused {
        /// Fraction of capacity consumed.
        utilization: f64,
    },
    /// A SKU is ordered well above its forecast mean.
    Stockpiling {
        /// SKU identifier.
        sku: String,
        /// Order-to-mean ratio.
        ratio: f64,
    },
    /// A SKU is ordered well below its forecast mean.
    LeanOrdering {
        /// SKU identifier.
        sku: String,
        /// Order-to-mean ratio.
        ratio: f64,
    },
    /// Holding cost dominates shortage cost across the portfolio.
    HoldingDominated {
        /// Total holding cost.
        holding: f64,
        /// Total shortage cost.
        shortage: f64,
    },
    /// Shortage cost dominates holding cost across the portfolio.
    ShortageDominated {
        /// Total holding cost.
        holding: f64,
        /// Total shortage cost.
        shortage: f64,
    },
    /// The SKUs contributing the most total cost, highest first.
    TopCostDrivers {
        /// Up to three SKU identifiers.
        skus: Vec<String>,
    },
    /// The solver stopped on its iteration budget before tolerance.
    NotConverged,
    /// The requested backend was unavailable and another was substituted.
    FallbackUsed,
}

/// Turns raw order quantities into insights, metrics, and findings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultInterpreter;

impl ResultInterpreter {
    /// Derive per-SKU insights and aggregate metrics from a solve.
    ///
    /// Insights come back ranked by total cost descending, ties broken by
    /// SKU ascending, so the ordering is stable and deterministic.
    #[must_use]
    pub fn interpret(
        result: &OptimizationResult,
        problem: &OptimizationProblem,
    ) -> (Vec<SkuInsight>, AggregateMetrics) {
        let mut insights: Vec<SkuInsight> = problem
            .terms()
            .iter()
            .map(|t| {
                let q = result
                    .order_quantities
                    .get(&t.sku)
                    .copied()
                    .unwrap_or(0.0);
                let overstock = (q - t.mu).max(0.0);
                let understock = (t.mu - q).max(0.0);
                let purchase_cost = t.unit_cost * q;
                let holding_cost = t.holding_cost * overstock;
                let shortage_cost = t.shortage_penalty * understock;
                SkuInsight {
                    sku: t.sku.clone(),
                    order_quantity: q,
                    mean_demand: t.mu,
                    purchase_cost,
                    holding_cost,
                    shortage_cost,
                    total_cost: purchase_cost + holding_cost + shortage_cost,
                    order_to_mean_ratio: (t.mu > 0.0).then(|| q / t.mu),
                }
            })
            .collect();

        insights.sort_by(|a, b| {
            b.total_cost
                .partial_cmp(&a.total_cost)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.sku.cmp(&b.sku))
        });

        let total_purchase_cost: f64 = insights.iter().map(|i| i.purchase_cost).sum();
        let total_holding_cost: f64 = insights.iter().map(|i| i.holding_cost).sum();
        let total_shortage_cost: f64 = insights.iter().map(|i| i.shortage_cost).sum();
        let capacity_used = result.constraint_usage.capacity_used;

        let metrics = AggregateMetrics {
            total_purchase_cost,
            total_holding_cost,
            total_shortage_cost,
            total_cost: total_purchase_cost + total_holding_cost + total_shortage_cost,
            budget_used: total_purchase_cost,
            budget_utilization: problem.budget().map(|b| total_purchase_cost / b),
            capacity_used,
            capacity_utilization: problem.capacity().map(|c| capacity_used / c),
            sku_count: insights.len(),
        };

        (insights, metrics)
    }

    /// Structured findings over a solve's insights and metrics.
    ///
    /// The `insights` slice must come from [`ResultInterpreter::interpret`]
    /// over the same result, so it is already ranked by total cost.
    #[must_use]
    pub fn findings(
        result: &OptimizationResult,
        insights: &[SkuInsight],
        metrics: &AggregateMetrics,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();

        if let Some(utilization) = metrics.budget_utilization {
            if utilization > NEAR_LIMIT_THRESHOLD {
                findings.push(Finding::BudgetNearLimit { utilization });
            } else if utilization < UNDERUSED_THRESHOLD {
                findings.push(Finding::BudgetUnderused { utilization });
            }
        }
        if let Some(utilization) = metrics.capacity_utilization {
            if utilization > NEAR_LIMIT_THRESHOLD {
                findings.push(Finding::CapacityNearLimit { utilization });
            } else if utilization < UNDERUSED_THRESHOLD {
                findings.push(Finding::CapacityUnderused { utilization });
            }
        }

        for insight in insights {
            if let Some(ratio) = insight.order_to_mean_ratio {
                if ratio > STOCKPILING_RATIO {
                    findings.push(Finding::Stockpiling {
                        sku: insight.sku.clone(),
                        ratio,
                    });
                } else if ratio < LEAN_RATIO {
                    findings.push(Finding::LeanOrdering {
                        sku: insight.sku.clone(),
                        ratio,
                    });
                }
            }
        }

        let holding = metrics.total_holding_cost;
        let shortage = metrics.total_shortage_cost;
        if holding > 0.0 && holding >= DOMINANCE_FACTOR * shortage {
            findings.push(Finding::HoldingDominated { holding, shortage });
        } else if shortage > 0.0 && shortage >= DOMINANCE_FACTOR * holding {
            findings.push(Finding::ShortageDominated { holding, shortage });
        }

        if !insights.is_empty() {
            findings.push(Finding::TopCostDrivers {
                skus: insights
                    .iter()
                    .take(TOP_DRIVERS)
                    .map(|i| i.sku.clone())
                    .collect(),
            });
        }

        if !result.converged {
            findings.push(Finding::NotConverged);
        }
        if result.fallback_occurred {
            findings.push(Finding::FallbackUsed);
        }

        findings
    }
}
