// Orchestration of the two lexicographic phases: profit-maximal mix first,
// then cost-minimal certified routing for that fixed mix

use log::info;

use crate::algorithms::detour::plan_route;
use crate::algorithms::knapsack::solve_product_mix;
use crate::algorithms::verify::verify_detours;
use crate::error::PlanError;
use crate::models::{Instance, ProductMix, RoutePlan, VerificationResult};
use crate::utils::graph::Graph;

/// Everything a solve produces, ready for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub mix: ProductMix,
    pub plan: RoutePlan,
    pub verification: VerificationResult,
}

impl SolveOutcome {
    /// Profit of the mix minus the total travel cost of the route
    pub fn net_profit(&self) -> f64 {
        self.mix.profit - self.plan.total_cost()
    }
}

/// Solves a complete instance. Aborts with `VerificationMismatch` when the
/// brute-force check disagrees with the planner; an uncertified route is
/// never returned.
pub fn solve_instance(instance: &Instance) -> Result<SolveOutcome, PlanError> {
    let graph = Graph::new(instance.graph.nodes.clone(), &instance.graph.edges)?;

    // Phase 1: profit maximisation on aggregated goods
    let mix = solve_product_mix(
        &instance.products,
        &instance.inventory,
        &instance.constraints,
    )?;
    info!(
        "target mix: {} units, profit {:.2}",
        mix.total_units, mix.profit
    );

    // Phase 2: cost minimisation subject to the fixed mix
    let plan = plan_route(
        &graph,
        &instance.inventory,
        &mix.counts,
        &instance.routing.start_node,
        &instance.routing.end_node,
    )?;
    info!(
        "route costs {:.2} ({:.2} backbone + {:.2} detours)",
        plan.total_cost(),
        plan.backbone_cost,
        plan.detour_cost
    );

    // Certification: the brute-force answer must match, never replace, the DP
    let verification = verify_detours(
        &graph,
        &plan.backbone,
        &instance.inventory,
        &mix.counts,
        plan.detour_cost,
    )?;
    if !verification.matches {
        return Err(PlanError::VerificationMismatch {
            claimed: plan.detour_cost,
            best: verification.best_cost,
        });
    }

    Ok(SolveOutcome {
        mix,
        plan,
        verification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Constraints, GraphSpec, Product, RoutingSpec};
    use std::collections::HashMap;

    fn sample_instance() -> Instance {
        Instance {
            graph: GraphSpec {
                nodes: vec!["A".into(), "B".into(), "C".into(), "N".into()],
                edges: vec![
                    ("A".into(), "B".into(), 1.0),
                    ("B".into(), "N".into(), 1.0),
                    ("A".into(), "C".into(), 2.0),
                ],
            },
            products: HashMap::from([("gemstones".to_string(), Product::new(10.0, 0.5))]),
            inventory: HashMap::from([(
                "C".to_string(),
                HashMap::from([("gemstones".to_string(), 2)]),
            )]),
            constraints: Constraints {
                warehouse_capacity_tons: 10.0,
                truck_capacity_units: 10,
                ratio_constraints: Vec::new(),
                per_product_caps: HashMap::new(),
                require_nonempty: false,
            },
            routing: RoutingSpec {
                start_node: "A".into(),
                end_node: "N".into(),
            },
        }
    }

    #[test]
    fn test_solve_certifies_single_detour() {
        let outcome = solve_instance(&sample_instance()).unwrap();
        assert_eq!(outcome.mix.count(&"gemstones".to_string()), 2);
        assert_eq!(outcome.plan.detours.len(), 1);
        assert_eq!(outcome.plan.detour_cost, 4.0);
        assert!(outcome.verification.matches);
        assert_eq!(outcome.net_profit(), 20.0 - 6.0);
    }

    #[test]
    fn test_invalid_graph_rejected_before_solving() {
        let mut instance = sample_instance();
        instance.graph.edges.push(("A".into(), "N".into(), -3.0));
        assert!(matches!(
            solve_instance(&instance),
            Err(PlanError::InvalidGraph(_))
        ));
    }
}
