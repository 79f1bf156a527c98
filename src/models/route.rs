// Route models for the routing phase: detours, the assembled plan and the
// verifier's certificate

use std::collections::HashMap;

use crate::models::{Cost, NodeId, ProductId, Quantity};

/// A possible side trip: an off-backbone location together with its cheapest
/// anchoring point on the backbone and the stored outbound path
#[derive(Debug, Clone, PartialEq)]
pub struct DetourCandidate {
    /// Off-backbone location to visit
    pub node: NodeId,

    /// Backbone location the detour leaves from and returns to
    pub anchor: NodeId,

    /// Shortest path from the anchor out to the node (anchor inclusive)
    pub path_to_node: Vec<NodeId>,

    /// Cost of the outbound leg
    pub outbound_cost: Cost,

    /// Full round-trip cost: out and back along the same path
    pub detour_cost: Cost,
}

/// A detour chosen by the planner, with the goods lifted during the visit
#[derive(Debug, Clone, PartialEq)]
pub struct DetourSelection {
    pub candidate: DetourCandidate,
    pub goods_picked: HashMap<ProductId, Quantity>,
}

/// The final routing decision: backbone plus selected detours
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Shortest start-to-end path, ignoring pickups
    pub backbone: Vec<NodeId>,

    /// Cost of the backbone alone
    pub backbone_cost: Cost,

    /// Selected detours, in route order
    pub detours: Vec<DetourSelection>,

    /// Summed round-trip cost of all selected detours
    pub detour_cost: Cost,

    /// Backbone interleaved with the out-and-back detour paths
    pub final_route: Vec<NodeId>,

    /// Goods collected per visited location (backbone and detour pickups)
    pub goods_picked: HashMap<NodeId, HashMap<ProductId, Quantity>>,
}

impl RoutePlan {
    /// Total travel cost of the plan
    pub fn total_cost(&self) -> Cost {
        self.backbone_cost + self.detour_cost
    }
}

/// Outcome of the independent brute-force check of the detour selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerificationResult {
    /// True minimum detour cost found by exhaustive covering search
    pub best_cost: Cost,

    /// Whether the planner's claimed cost equals the true minimum
    pub matches: bool,
}
