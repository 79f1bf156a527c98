// Independent brute-force certification of the detour selection: enumerate
// every covering of the outstanding demand and confirm the planner's cost is
// the true minimum

use std::collections::{HashMap, HashSet};

use log::debug;
use rayon::prelude::*;

use crate::error::PlanError;
use crate::models::{Cost, NodeId, ProductId, Quantity, VerificationResult};
use crate::utils::graph::Graph;

/// Relative tolerance for comparing the claimed and brute-force costs
const COST_TOLERANCE: f64 = 1e-9;

/// Brute-force check of the planner's detour cost.
///
/// Recomputes everything from the raw inputs: which demand the backbone
/// leaves outstanding, which off-backbone locations can supply it, and the
/// cheapest round trip to each from any anchor. Every subset of those
/// locations is enumerated; the cheapest demand-covering subset is the true
/// optimum. Nothing from the planner's DP is reused.
pub fn verify_detours(
    graph: &Graph,
    backbone: &[NodeId],
    inventory: &HashMap<NodeId, HashMap<ProductId, Quantity>>,
    target_counts: &HashMap<ProductId, Quantity>,
    claimed_cost: Cost,
) -> Result<VerificationResult, PlanError> {
    let remaining = outstanding_after_backbone(backbone, inventory, target_counts);

    if remaining.is_empty() {
        let matches = costs_match(0.0, claimed_cost);
        return Ok(VerificationResult {
            best_cost: 0.0,
            matches,
        });
    }

    // Candidate stashes, each priced independently of the planner: the
    // cheapest round trip over all anchors, via fresh shortest-path runs
    let on_backbone: HashSet<&NodeId> = backbone.iter().collect();
    let mut candidates: Vec<(&NodeId, &HashMap<ProductId, Quantity>)> = inventory
        .iter()
        .filter(|(node, stock)| {
            !on_backbone.contains(node)
                && stock
                    .iter()
                    .any(|(product, amount)| *amount > 0 && remaining.contains_key(product))
        })
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(b.0));

    let mut round_trips: Vec<Option<Cost>> = Vec::with_capacity(candidates.len());
    for (node, _) in &candidates {
        let mut cheapest: Option<Cost> = None;
        for anchor in backbone {
            if let Ok((outbound, _)) = graph.shortest_path(anchor, node) {
                let round_trip = 2.0 * outbound;
                if cheapest.map_or(true, |best| round_trip < best) {
                    cheapest = Some(round_trip);
                }
            }
        }
        round_trips.push(cheapest);
    }

    let subset_count = 1usize << candidates.len();
    debug!(
        "verifying against {} candidate subsets",
        subset_count
    );

    let best_cost = (0..subset_count)
        .into_par_iter()
        .filter_map(|mask| covering_cost(mask, &candidates, &round_trips, &remaining))
        .reduce(|| f64::INFINITY, f64::min);

    if !best_cost.is_finite() {
        let mut products: Vec<&ProductId> = remaining.keys().collect();
        products.sort();
        let product = products.first().map(|p| (*p).clone()).unwrap_or_default();
        return Err(PlanError::UnreachableObligation { product });
    }

    Ok(VerificationResult {
        best_cost,
        matches: costs_match(best_cost, claimed_cost),
    })
}

/// Cost of a subset if it is usable (every member reachable) and covers the
/// outstanding demand
fn covering_cost(
    mask: usize,
    candidates: &[(&NodeId, &HashMap<ProductId, Quantity>)],
    round_trips: &[Option<Cost>],
    remaining: &HashMap<ProductId, Quantity>,
) -> Option<Cost> {
    let mut total = 0.0;
    for (index, cost) in round_trips.iter().enumerate() {
        if mask & (1 << index) != 0 {
            total += (*cost)?;
        }
    }

    let covered = remaining.iter().all(|(product, need)| {
        let supplied: Quantity = candidates
            .iter()
            .enumerate()
            .filter(|(index, _)| mask & (1 << index) != 0)
            .map(|(_, (_, stock))| *stock.get(product).unwrap_or(&0))
            .sum();
        supplied >= *need
    });

    covered.then_some(total)
}

/// The verifier's own walk of the backbone, deliberately re-deriving the
/// outstanding demand instead of trusting the planner's
fn outstanding_after_backbone(
    backbone: &[NodeId],
    inventory: &HashMap<NodeId, HashMap<ProductId, Quantity>>,
    target_counts: &HashMap<ProductId, Quantity>,
) -> HashMap<ProductId, Quantity> {
    let mut remaining = target_counts.clone();
    let mut products: Vec<ProductId> = target_counts.keys().cloned().collect();
    products.sort();

    for node in backbone {
        if let Some(stock) = inventory.get(node) {
            for product in &products {
                let need = *remaining.get(product).unwrap_or(&0);
                let available = *stock.get(product).unwrap_or(&0);
                if need > 0 && available > 0 {
                    remaining.insert(product.clone(), need - available.min(need));
                }
            }
        }
    }

    remaining.retain(|_, amount| *amount > 0);
    remaining
}

fn costs_match(best: Cost, claimed: Cost) -> bool {
    (best - claimed).abs() <= COST_TOLERANCE * claimed.abs().max(1.0)
}
