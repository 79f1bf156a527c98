// Undirected weighted graph with Dijkstra shortest paths and path reconstruction

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::error::PlanError;
use crate::models::{Cost, NodeId};

// Custom wrapper to give f64 heap keys a total order
#[derive(PartialEq, Copy, Clone, Debug)]
struct CostKey(f64);

impl Eq for CostKey {}

impl PartialOrd for CostKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Ord for CostKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Heap entry for Dijkstra
#[derive(PartialEq, Eq, Debug)]
struct QueueEntry {
    cost: CostKey,
    node: NodeId,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the BinaryHeap acts as a min-heap; equal costs fall back
        // to the node id so the processing order is fixed across runs
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Undirected weighted location graph with Dijkstra support
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<NodeId>,
    adjacency: HashMap<NodeId, Vec<(NodeId, Cost)>>,
}

impl Graph {
    /// Builds the graph, rejecting malformed edges eagerly: unknown
    /// endpoints, self-loops and negative or non-finite weights
    pub fn new(nodes: Vec<NodeId>, edges: &[(NodeId, NodeId, Cost)]) -> Result<Self, PlanError> {
        let mut adjacency: HashMap<NodeId, Vec<(NodeId, Cost)>> = nodes
            .iter()
            .map(|node| (node.clone(), Vec::new()))
            .collect();

        for (origin, target, cost) in edges {
            if !adjacency.contains_key(origin) || !adjacency.contains_key(target) {
                return Err(PlanError::InvalidGraph(format!(
                    "edge {}-{} references an unknown node",
                    origin, target
                )));
            }
            if origin == target {
                return Err(PlanError::InvalidGraph(format!(
                    "self-loop on node {}",
                    origin
                )));
            }
            if !cost.is_finite() || *cost < 0.0 {
                return Err(PlanError::InvalidGraph(format!(
                    "edge {}-{} has invalid weight {}",
                    origin, target, cost
                )));
            }

            if let Some(list) = adjacency.get_mut(origin) {
                list.push((target.clone(), *cost));
            }
            if let Some(list) = adjacency.get_mut(target) {
                list.push((origin.clone(), *cost));
            }
        }

        // Fixed neighbour order keeps relaxation, and therefore tie-breaking
        // between equal-cost paths, deterministic
        for list in adjacency.values_mut() {
            list.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
        }

        Ok(Self { nodes, adjacency })
    }

    /// Node identifiers in instance order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Whether the graph contains the given node
    pub fn contains(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Neighbours of a node with edge costs
    pub fn neighbors(&self, node: &str) -> &[(NodeId, Cost)] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cost of the direct edge between two nodes, if present
    pub fn edge_cost(&self, origin: &str, target: &str) -> Option<Cost> {
        self.neighbors(origin)
            .iter()
            .find(|(neighbor, _)| neighbor == target)
            .map(|(_, cost)| *cost)
    }

    /// Single-source shortest paths: tentative distances and predecessors
    pub fn dijkstra(
        &self,
        source: &str,
    ) -> Result<(HashMap<NodeId, Cost>, HashMap<NodeId, NodeId>), PlanError> {
        if !self.contains(source) {
            return Err(PlanError::InvalidGraph(format!(
                "unknown source node {}",
                source
            )));
        }

        let mut distances: HashMap<NodeId, Cost> = HashMap::new();
        let mut predecessors: HashMap<NodeId, NodeId> = HashMap::new();
        let mut queue = BinaryHeap::new();

        distances.insert(source.to_string(), 0.0);
        queue.push(QueueEntry {
            cost: CostKey(0.0),
            node: source.to_string(),
        });

        while let Some(QueueEntry { cost, node }) = queue.pop() {
            let settled = *distances.get(&node).unwrap_or(&f64::INFINITY);
            if cost.0 > settled {
                continue; // stale entry
            }

            for (neighbor, edge_cost) in self.neighbors(&node) {
                let candidate = settled + edge_cost;
                let current = *distances.get(neighbor).unwrap_or(&f64::INFINITY);
                // Strict improvement only: the first equal-cost path found
                // under the fixed processing order wins
                if candidate < current {
                    distances.insert(neighbor.clone(), candidate);
                    predecessors.insert(neighbor.clone(), node.clone());
                    queue.push(QueueEntry {
                        cost: CostKey(candidate),
                        node: neighbor.clone(),
                    });
                }
            }
        }

        Ok((distances, predecessors))
    }

    /// Recovers both the cost and the explicit node sequence between source
    /// and target
    pub fn shortest_path(
        &self,
        source: &str,
        target: &str,
    ) -> Result<(Cost, Vec<NodeId>), PlanError> {
        if !self.contains(target) {
            return Err(PlanError::InvalidGraph(format!(
                "unknown target node {}",
                target
            )));
        }

        let (distances, predecessors) = self.dijkstra(source)?;
        let cost = match distances.get(target) {
            Some(cost) => *cost,
            None => {
                return Err(PlanError::NoPath {
                    from: source.to_string(),
                    to: target.to_string(),
                })
            }
        };

        let mut path = vec![target.to_string()];
        while path.last().map(String::as_str) != Some(source) {
            let last = path.last().cloned().unwrap_or_default();
            match predecessors.get(&last) {
                Some(previous) => path.push(previous.clone()),
                None => {
                    return Err(PlanError::NoPath {
                        from: source.to_string(),
                        to: target.to_string(),
                    })
                }
            }
        }
        path.reverse();
        Ok((cost, path))
    }

    /// Total cost of walking the given node sequence edge by edge
    pub fn path_cost(&self, path: &[NodeId]) -> Result<Cost, PlanError> {
        let mut total = 0.0;
        for pair in path.windows(2) {
            match self.edge_cost(&pair[0], &pair[1]) {
                Some(cost) => total += cost,
                None => {
                    return Err(PlanError::InvalidGraph(format!(
                        "edge {}-{} not present in graph",
                        pair[0], pair[1]
                    )))
                }
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_names(names: &[&str]) -> Vec<NodeId> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn edge(origin: &str, target: &str, cost: f64) -> (NodeId, NodeId, Cost) {
        (origin.to_string(), target.to_string(), cost)
    }

    fn diamond() -> Graph {
        // A-B-D is longer than A-C-D
        Graph::new(
            node_names(&["A", "B", "C", "D"]),
            &[
                edge("A", "B", 2.0),
                edge("B", "D", 2.0),
                edge("A", "C", 1.0),
                edge("C", "D", 1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_shortest_path_picks_cheaper_branch() {
        let graph = diamond();
        let (cost, path) = graph.shortest_path("A", "D").unwrap();
        assert_eq!(cost, 2.0);
        assert_eq!(path, node_names(&["A", "C", "D"]));
    }

    #[test]
    fn test_shortest_path_to_self() {
        let graph = diamond();
        let (cost, path) = graph.shortest_path("A", "A").unwrap();
        assert_eq!(cost, 0.0);
        assert_eq!(path, node_names(&["A"]));
    }

    #[test]
    fn test_no_path_error() {
        let graph = Graph::new(node_names(&["A", "B", "X"]), &[edge("A", "B", 1.0)]).unwrap();
        let result = graph.shortest_path("A", "X");
        assert_eq!(
            result,
            Err(PlanError::NoPath {
                from: "A".to_string(),
                to: "X".to_string()
            })
        );
    }

    #[test]
    fn test_negative_weight_rejected() {
        let result = Graph::new(node_names(&["A", "B"]), &[edge("A", "B", -1.0)]);
        assert!(matches!(result, Err(PlanError::InvalidGraph(_))));
    }

    #[test]
    fn test_self_loop_rejected() {
        let result = Graph::new(node_names(&["A"]), &[edge("A", "A", 1.0)]);
        assert!(matches!(result, Err(PlanError::InvalidGraph(_))));
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let result = Graph::new(node_names(&["A"]), &[edge("A", "Z", 1.0)]);
        assert!(matches!(result, Err(PlanError::InvalidGraph(_))));
    }

    #[test]
    fn test_path_cost_matches_shortest_path() {
        let graph = diamond();
        let (cost, path) = graph.shortest_path("A", "D").unwrap();
        assert_eq!(graph.path_cost(&path).unwrap(), cost);
    }

    #[test]
    fn test_path_cost_rejects_missing_edge() {
        let graph = diamond();
        let path = node_names(&["A", "D"]);
        assert!(matches!(
            graph.path_cost(&path),
            Err(PlanError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_equal_cost_tie_break_is_deterministic() {
        // Two equal-cost A->D paths; the fixed order must always pick the same
        let graph = Graph::new(
            node_names(&["A", "B", "C", "D"]),
            &[
                edge("A", "B", 1.0),
                edge("B", "D", 1.0),
                edge("A", "C", 1.0),
                edge("C", "D", 1.0),
            ],
        )
        .unwrap();

        let (cost, first) = graph.shortest_path("A", "D").unwrap();
        assert_eq!(cost, 2.0);
        for _ in 0..10 {
            let (_, path) = graph.shortest_path("A", "D").unwrap();
            assert_eq!(path, first);
        }
    }
}
