// Instance loader: reads a JSON instance file and validates it eagerly,
// before any solving starts

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;

use crate::error::LoadError;
use crate::models::Instance;

/// Reads, parses and validates an instance file
pub fn load_instance(path: &Path) -> Result<Instance, LoadError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let instance: Instance = serde_json::from_reader(reader)?;
    validate_instance(&instance)?;
    info!(
        "loaded instance with {} nodes, {} edges, {} products",
        instance.graph.nodes.len(),
        instance.graph.edges.len(),
        instance.products.len()
    );
    Ok(instance)
}

/// Structural checks on a parsed instance. Anything that would make the
/// solve ill-defined is rejected here rather than mid-computation.
pub fn validate_instance(instance: &Instance) -> Result<(), LoadError> {
    let nodes: HashSet<&String> = instance.graph.nodes.iter().collect();
    if nodes.is_empty() {
        return Err(LoadError::Validation("graph has no nodes".to_string()));
    }
    if nodes.len() != instance.graph.nodes.len() {
        return Err(LoadError::Validation(
            "duplicate node identifiers".to_string(),
        ));
    }

    for (origin, target, cost) in &instance.graph.edges {
        if !nodes.contains(origin) || !nodes.contains(target) {
            return Err(LoadError::Validation(format!(
                "edge {}-{} references an unknown node",
                origin, target
            )));
        }
        if origin == target {
            return Err(LoadError::Validation(format!("self-loop on {}", origin)));
        }
        if !cost.is_finite() || *cost < 0.0 {
            return Err(LoadError::Validation(format!(
                "edge {}-{} has invalid weight {}",
                origin, target, cost
            )));
        }
    }

    for (id, product) in &instance.products {
        if !product.profit_per_unit.is_finite() {
            return Err(LoadError::Validation(format!(
                "product {} has a non-finite profit",
                id
            )));
        }
        if !product.weight_per_unit.is_finite() || product.weight_per_unit < 0.0 {
            return Err(LoadError::Validation(format!(
                "product {} has an invalid weight",
                id
            )));
        }
    }

    for (node, stock) in &instance.inventory {
        if !nodes.contains(node) {
            return Err(LoadError::Validation(format!(
                "inventory references unknown node {}",
                node
            )));
        }
        for product in stock.keys() {
            if !instance.products.contains_key(product) {
                return Err(LoadError::Validation(format!(
                    "inventory at {} references unknown product {}",
                    node, product
                )));
            }
        }
    }

    let constraints = &instance.constraints;
    if !constraints.warehouse_capacity_tons.is_finite() || constraints.warehouse_capacity_tons < 0.0
    {
        return Err(LoadError::Validation(
            "warehouse capacity must be a non-negative number".to_string(),
        ));
    }
    for rule in &constraints.ratio_constraints {
        if !instance.products.contains_key(&rule.numerator)
            || !instance.products.contains_key(&rule.denominator)
        {
            return Err(LoadError::Validation(format!(
                "ratio rule {}/{} references an unknown product",
                rule.numerator, rule.denominator
            )));
        }
        if !rule.factor.is_finite() || rule.factor < 0.0 {
            return Err(LoadError::Validation(format!(
                "ratio rule {}/{} has an invalid factor",
                rule.numerator, rule.denominator
            )));
        }
    }
    for product in constraints.per_product_caps.keys() {
        if !instance.products.contains_key(product) {
            return Err(LoadError::Validation(format!(
                "per-product cap references unknown product {}",
                product
            )));
        }
    }

    if !nodes.contains(&instance.routing.start_node) {
        return Err(LoadError::Validation(format!(
            "unknown start node {}",
            instance.routing.start_node
        )));
    }
    if !nodes.contains(&instance.routing.end_node) {
        return Err(LoadError::Validation(format!(
            "unknown end node {}",
            instance.routing.end_node
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Constraints, GraphSpec, Product, RoutingSpec};
    use std::collections::HashMap;

    fn valid_instance() -> Instance {
        Instance {
            graph: GraphSpec {
                nodes: vec!["A".into(), "N".into()],
                edges: vec![("A".into(), "N".into(), 2.0)],
            },
            products: HashMap::from([("gemstones".to_string(), Product::new(10.0, 0.5))]),
            inventory: HashMap::from([(
                "A".to_string(),
                HashMap::from([("gemstones".to_string(), 1)]),
            )]),
            constraints: Constraints {
                warehouse_capacity_tons: 5.0,
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

    #[test]
    fn test_valid_instance_passes() {
        assert!(validate_instance(&valid_instance()).is_ok());
    }

    #[test]
    fn test_negative_edge_weight_rejected() {
        let mut instance = valid_instance();
        instance.graph.edges[0].2 = -1.0;
        assert!(matches!(
            validate_instance(&instance),
            Err(LoadError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_inventory_node_rejected() {
        let mut instance = valid_instance();
        instance.inventory.insert(
            "Z".to_string(),
            HashMap::from([("gemstones".to_string(), 1)]),
        );
        assert!(matches!(
            validate_instance(&instance),
            Err(LoadError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_product_in_ratio_rule_rejected() {
        let mut instance = valid_instance();
        instance
            .constraints
            .ratio_constraints
            .push(crate::models::RatioRule {
                numerator: "copper".to_string(),
                denominator: "gemstones".to_string(),
                factor: 1.0,
            });
        assert!(matches!(
            validate_instance(&instance),
            Err(LoadError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_start_node_rejected() {
        let mut instance = valid_instance();
        instance.routing.start_node = "Z".to_string();
        assert!(matches!(
            validate_instance(&instance),
            Err(LoadError::Validation(_))
        ));
    }

    #[test]
    fn test_instance_round_trips_through_json() {
        let instance = valid_instance();
        let json = serde_json::to_string(&instance).unwrap();
        let parsed: Instance = serde_json::from_str(&json).unwrap();
        assert!(validate_instance(&parsed).is_ok());
        assert_eq!(parsed.graph.nodes, instance.graph.nodes);
    }
}
