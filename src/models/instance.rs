// Instance model describing a complete problem: graph, catalog, inventory,
// constraints and the start/end pair for routing

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Cost, NodeId, Product, ProductId, Quantity};

/// Undirected weighted graph description as it appears in the instance file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSpec {
    /// Node identifiers
    pub nodes: Vec<NodeId>,

    /// Edges as (origin, target, cost) triples
    pub edges: Vec<(NodeId, NodeId, Cost)>,
}

/// Coupling rule linking two product quantities:
/// `counts[numerator] <= factor * counts[denominator]`, and a zero
/// denominator count forces a zero numerator count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioRule {
    pub numerator: ProductId,
    pub denominator: ProductId,
    pub factor: f64,
}

/// Global purchase limits applied to every candidate product mix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraints {
    /// Upper bound on the summed weight of all purchased units
    pub warehouse_capacity_tons: f64,

    /// Upper bound on the total number of units carried
    pub truck_capacity_units: Quantity,

    /// Coupling rules between product quantities
    #[serde(default)]
    pub ratio_constraints: Vec<RatioRule>,

    /// Optional explicit per-product purchase caps
    #[serde(default)]
    pub per_product_caps: HashMap<ProductId, Quantity>,

    /// When set, an all-zero optimum is reported as infeasible instead of
    /// falling back to the empty mix
    #[serde(default)]
    pub require_nonempty: bool,
}

/// Designated start and end locations for the route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingSpec {
    pub start_node: NodeId,
    pub end_node: NodeId,
}

/// A complete, immutable problem instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub graph: GraphSpec,

    /// Product catalog keyed by product id
    pub products: HashMap<ProductId, Product>,

    /// Per-location stock: node -> product -> available units
    #[serde(default)]
    pub inventory: HashMap<NodeId, HashMap<ProductId, Quantity>>,

    pub constraints: Constraints,

    pub routing: RoutingSpec,
}

impl Instance {
    /// Aggregates the inventory across all locations into global totals
    pub fn total_inventory(&self) -> HashMap<ProductId, Quantity> {
        aggregate_inventory(&self.inventory)
    }
}

/// Sums per-location stock into a product -> total units map
pub fn aggregate_inventory(
    inventory: &HashMap<NodeId, HashMap<ProductId, Quantity>>,
) -> HashMap<ProductId, Quantity> {
    let mut totals: HashMap<ProductId, Quantity> = HashMap::new();
    for stock in inventory.values() {
        for (product, amount) in stock {
            *totals.entry(product.clone()).or_insert(0) += amount;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_inventory() {
        let mut inventory: HashMap<NodeId, HashMap<ProductId, Quantity>> = HashMap::new();
        inventory.insert(
            "C".to_string(),
            HashMap::from([("gemstones".to_string(), 2)]),
        );
        inventory.insert(
            "K".to_string(),
            HashMap::from([("gemstones".to_string(), 1), ("copper".to_string(), 4)]),
        );

        let totals = aggregate_inventory(&inventory);
        assert_eq!(totals.get("gemstones"), Some(&3));
        assert_eq!(totals.get("copper"), Some(&4));
        assert_eq!(totals.get("epoxy"), None);
    }

    #[test]
    fn test_constraints_defaults() {
        let constraints: Constraints = serde_json::from_str(
            r#"{"warehouse_capacity_tons": 4.0, "truck_capacity_units": 5}"#,
        )
        .unwrap();
        assert!(constraints.ratio_constraints.is_empty());
        assert!(constraints.per_product_caps.is_empty());
        assert!(!constraints.require_nonempty);
    }
}
