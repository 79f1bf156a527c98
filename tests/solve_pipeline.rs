// End-to-end tests of the solve pipeline: knapsack, routing and verification

use std::collections::HashMap;
use std::path::Path;

use freight_planner::models::{
    Constraints, GraphSpec, Instance, NodeId, Product, ProductId, Quantity, RoutingSpec,
};
use freight_planner::planner::solve_instance;
use freight_planner::utils::loader::load_instance;
use freight_planner::PlanError;

fn nodes(names: &[&str]) -> Vec<NodeId> {
    names.iter().map(|name| name.to_string()).collect()
}

fn stock(items: &[(&str, Quantity)]) -> HashMap<ProductId, Quantity> {
    items
        .iter()
        .map(|(product, amount)| (product.to_string(), *amount))
        .collect()
}

fn open_constraints() -> Constraints {
    Constraints {
        warehouse_capacity_tons: 100.0,
        truck_capacity_units: 100,
        ratio_constraints: Vec::new(),
        per_product_caps: HashMap::new(),
        require_nonempty: false,
    }
}

/// Scenario 1: two nodes, the only product sits off the direct path
#[test]
fn test_single_detour_costs_twice_the_edge_weight() {
    let instance = Instance {
        graph: GraphSpec {
            nodes: nodes(&["S", "T", "O"]),
            edges: vec![
                ("S".into(), "T".into(), 5.0),
                ("S".into(), "O".into(), 3.0),
            ],
        },
        products: HashMap::from([("gemstones".to_string(), Product::new(8.0, 0.1))]),
        inventory: HashMap::from([("O".to_string(), stock(&[("gemstones", 1)]))]),
        constraints: open_constraints(),
        routing: RoutingSpec {
            start_node: "S".into(),
            end_node: "T".into(),
        },
    };

    let outcome = solve_instance(&instance).unwrap();
    assert_eq!(outcome.plan.backbone, nodes(&["S", "T"]));
    assert_eq!(outcome.plan.detours.len(), 1);
    assert_eq!(outcome.plan.detours[0].candidate.node, "O");
    assert_eq!(outcome.plan.detour_cost, 6.0);
    assert_eq!(outcome.plan.total_cost(), 11.0);
    assert!(outcome.verification.matches);
}

/// Scenario 2: even a single unit violates truck capacity, so the empty mix
/// wins and the route is the bare backbone
#[test]
fn test_empty_mix_yields_backbone_route() {
    let mut constraints = open_constraints();
    constraints.truck_capacity_units = 0;

    let instance = Instance {
        graph: GraphSpec {
            nodes: nodes(&["S", "T", "O"]),
            edges: vec![
                ("S".into(), "T".into(), 5.0),
                ("S".into(), "O".into(), 3.0),
            ],
        },
        products: HashMap::from([("gemstones".to_string(), Product::new(8.0, 0.1))]),
        inventory: HashMap::from([("O".to_string(), stock(&[("gemstones", 1)]))]),
        constraints,
        routing: RoutingSpec {
            start_node: "S".into(),
            end_node: "T".into(),
        },
    };

    let outcome = solve_instance(&instance).unwrap();
    assert!(outcome.mix.is_empty());
    assert_eq!(outcome.mix.profit, 0.0);
    assert!(outcome.plan.detours.is_empty());
    assert_eq!(outcome.plan.final_route, nodes(&["S", "T"]));
    assert_eq!(outcome.verification.best_cost, 0.0);
    assert!(outcome.verification.matches);
}

fn two_detour_instance() -> Instance {
    Instance {
        graph: GraphSpec {
            nodes: nodes(&["A", "B", "C", "F", "K", "N"]),
            edges: vec![
                ("A".into(), "B".into(), 1.0),
                ("B".into(), "F".into(), 1.0),
                ("F".into(), "N".into(), 1.0),
                ("A".into(), "C".into(), 1.0),
                ("F".into(), "K".into(), 1.0),
            ],
        },
        products: HashMap::from([
            ("gemstones".to_string(), Product::new(10.0, 0.5)),
            ("epoxy".to_string(), Product::new(3.0, 0.2)),
            ("copper".to_string(), Product::new(4.0, 1.0)),
        ]),
        inventory: HashMap::from([
            ("B".to_string(), stock(&[("epoxy", 2)])),
            ("C".to_string(), stock(&[("gemstones", 2)])),
            ("K".to_string(), stock(&[("gemstones", 1), ("copper", 2)])),
        ]),
        constraints: Constraints {
            warehouse_capacity_tons: 4.0,
            truck_capacity_units: 5,
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

/// Scenario 3: gemstones at C, gemstones and copper at K, two detours whose
/// summed cost of 4.00 the verifier confirms minimal
#[test]
fn test_two_detours_certified_minimal() {
    let outcome = solve_instance(&two_detour_instance()).unwrap();

    assert_eq!(outcome.mix.count(&"gemstones".to_string()), 3);
    assert_eq!(outcome.mix.count(&"copper".to_string()), 2);
    assert_eq!(outcome.mix.profit, 38.0);

    assert_eq!(outcome.plan.backbone, nodes(&["A", "B", "F", "N"]));
    assert_eq!(outcome.plan.detours.len(), 2);
    assert_eq!(outcome.plan.detour_cost, 4.0);
    assert_eq!(outcome.verification.best_cost, 4.0);
    assert!(outcome.verification.matches);

    // Every unit of the mix is picked up exactly once
    let mut totals: HashMap<&ProductId, Quantity> = HashMap::new();
    for goods in outcome.plan.goods_picked.values() {
        for (product, amount) in goods {
            *totals.entry(product).or_insert(0) += amount;
        }
    }
    for (product, required) in &outcome.mix.counts {
        assert_eq!(totals.get(product).copied().unwrap_or(0), *required);
    }
}

/// The planner's cost must always equal the verifier's best cost
#[test]
fn test_planner_matches_verifier_across_instances() {
    let instances = vec![two_detour_instance()];
    for instance in instances {
        let outcome = solve_instance(&instance).unwrap();
        assert_eq!(outcome.plan.detour_cost, outcome.verification.best_cost);
    }
}

#[test]
fn test_solving_twice_is_identical() {
    let instance = two_detour_instance();
    let first = solve_instance(&instance).unwrap();
    let second = solve_instance(&instance).unwrap();
    assert_eq!(first.mix, second.mix);
    assert_eq!(first.plan, second.plan);
}

#[test]
fn test_unreachable_stock_fails_the_solve() {
    let mut instance = two_detour_instance();
    // Cut C off entirely; its gemstones are still needed for the best mix
    instance.graph.edges.retain(|(a, b, _)| a != "C" && b != "C");
    let result = solve_instance(&instance);
    assert_eq!(
        result,
        Err(PlanError::UnreachableObligation {
            product: "gemstones".to_string()
        })
    );
}

#[test]
fn test_shipped_instance_solves_and_certifies() {
    let instance = load_instance(Path::new("data/problem_instance.json")).unwrap();
    let outcome = solve_instance(&instance).unwrap();
    assert_eq!(outcome.mix.profit, 38.0);
    assert_eq!(outcome.plan.detour_cost, 4.0);
    assert!(outcome.verification.matches);
}
