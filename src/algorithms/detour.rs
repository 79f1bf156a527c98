// Detour planner: augments the backbone shortest path with minimum-cost
// round-trip side trips until every unit of the target mix is collected

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::error::PlanError;
use crate::models::{
    Cost, DetourCandidate, DetourSelection, NodeId, ProductId, Quantity, RoutePlan,
};
use crate::utils::graph::Graph;

/// Walks the path in order and greedily lifts whatever needed stock each
/// location holds. Returns the per-location pickups and the outstanding
/// demand that must be covered by detours.
pub fn collect_on_path(
    path: &[NodeId],
    inventory: &HashMap<NodeId, HashMap<ProductId, Quantity>>,
    required: &HashMap<ProductId, Quantity>,
) -> (
    HashMap<NodeId, HashMap<ProductId, Quantity>>,
    HashMap<ProductId, Quantity>,
) {
    let mut picked: HashMap<NodeId, HashMap<ProductId, Quantity>> = HashMap::new();
    let mut remaining = required.clone();

    let mut products: Vec<ProductId> = required.keys().cloned().collect();
    products.sort();

    for node in path {
        let Some(stock) = inventory.get(node) else {
            continue;
        };
        for product in &products {
            let need = *remaining.get(product).unwrap_or(&0);
            if need == 0 {
                continue;
            }
            let available = *stock.get(product).unwrap_or(&0);
            let take = available.min(need);
            if take > 0 {
                *picked
                    .entry(node.clone())
                    .or_default()
                    .entry(product.clone())
                    .or_insert(0) += take;
                remaining.insert(product.clone(), need - take);
            }
        }
    }

    remaining.retain(|_, amount| *amount > 0);
    (picked, remaining)
}

/// Per-candidate routing data used by the DP: the node, the needed stock it
/// holds, and the outbound shortest path from every backbone anchor
struct CandidateTable {
    nodes: Vec<NodeId>,
    stock: Vec<HashMap<ProductId, Quantity>>,
    // [candidate][anchor index] -> (outbound cost, outbound path)
    from_anchor: Vec<Vec<Option<(Cost, Vec<NodeId>)>>>,
}

impl CandidateTable {
    fn build(
        graph: &Graph,
        backbone: &[NodeId],
        inventory: &HashMap<NodeId, HashMap<ProductId, Quantity>>,
        remaining: &HashMap<ProductId, Quantity>,
    ) -> Self {
        let on_backbone: HashSet<&NodeId> = backbone.iter().collect();

        // Off-backbone locations holding any still-needed product, in a fixed
        // order for reproducible selections
        let mut nodes: Vec<NodeId> = inventory
            .iter()
            .filter(|(node, stock)| {
                !on_backbone.contains(node)
                    && stock
                        .iter()
                        .any(|(product, amount)| {
                            *amount > 0 && remaining.get(product).is_some_and(|need| *need > 0)
                        })
            })
            .map(|(node, _)| node.clone())
            .collect();
        nodes.sort();

        let stock: Vec<HashMap<ProductId, Quantity>> = nodes
            .iter()
            .map(|node| {
                inventory[node]
                    .iter()
                    .filter(|(product, amount)| {
                        **amount > 0 && remaining.contains_key(*product)
                    })
                    .map(|(product, amount)| (product.clone(), *amount))
                    .collect()
            })
            .collect();

        let from_anchor: Vec<Vec<Option<(Cost, Vec<NodeId>)>>> = nodes
            .iter()
            .map(|node| {
                backbone
                    .iter()
                    .map(|anchor| graph.shortest_path(anchor, node).ok())
                    .collect()
            })
            .collect();

        Self {
            nodes,
            stock,
            from_anchor,
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn reachable(&self, candidate: usize) -> bool {
        self.from_anchor[candidate].iter().any(Option::is_some)
    }

    /// Whether the candidates in `mask` jointly hold enough stock to cover
    /// the outstanding demand
    fn covers(&self, mask: usize, remaining: &HashMap<ProductId, Quantity>) -> bool {
        remaining.iter().all(|(product, need)| {
            let supplied: Quantity = (0..self.len())
                .filter(|candidate| mask & (1 << candidate) != 0)
                .map(|candidate| *self.stock[candidate].get(product).unwrap_or(&0))
                .sum();
            supplied >= *need
        })
    }
}

/// One DP step: either move to the next backbone position or insert a detour
/// to a candidate at the current one
#[derive(Debug, Clone, Copy)]
enum Step {
    Advance,
    Detour(usize),
}

/// Plans the full route for the target mix: backbone, on-path pickups, then
/// the minimum-cost set of round-trip detours covering the rest.
pub fn plan_route(
    graph: &Graph,
    inventory: &HashMap<NodeId, HashMap<ProductId, Quantity>>,
    target_counts: &HashMap<ProductId, Quantity>,
    start: &NodeId,
    end: &NodeId,
) -> Result<RoutePlan, PlanError> {
    let (backbone_cost, backbone) = graph.shortest_path(start, end)?;
    info!(
        "backbone {} -> {} costs {:.2} over {} nodes",
        start,
        end,
        backbone_cost,
        backbone.len()
    );

    let (picked_on_base, remaining) = collect_on_path(&backbone, inventory, target_counts);

    let mut plan = RoutePlan {
        backbone: backbone.clone(),
        backbone_cost,
        detours: Vec::new(),
        detour_cost: 0.0,
        final_route: backbone.clone(),
        goods_picked: picked_on_base,
    };

    if remaining.is_empty() {
        verify_pickup_totals(&plan.goods_picked, target_counts)?;
        return Ok(plan);
    }

    let table = CandidateTable::build(graph, &backbone, inventory, &remaining);

    // Reject demand that no reachable candidate can supply
    let mut needed_products: Vec<(&ProductId, &Quantity)> = remaining.iter().collect();
    needed_products.sort();
    for (product, need) in needed_products {
        let reachable_supply: Quantity = (0..table.len())
            .filter(|candidate| table.reachable(*candidate))
            .map(|candidate| *table.stock[candidate].get(product).unwrap_or(&0))
            .sum();
        if reachable_supply < *need {
            return Err(PlanError::UnreachableObligation {
                product: product.clone(),
            });
        }
    }

    let selections = select_detours(&table, &backbone, &remaining)?;
    debug!("selected {} detours", selections.len());

    let detour_selections = allocate_pickups(&table, &selections, &remaining);
    plan.detour_cost = detour_selections
        .iter()
        .map(|selection| selection.candidate.detour_cost)
        .sum();

    for selection in &detour_selections {
        let node_entry = plan
            .goods_picked
            .entry(selection.candidate.node.clone())
            .or_default();
        for (product, amount) in &selection.goods_picked {
            *node_entry.entry(product.clone()).or_insert(0) += amount;
        }
    }

    plan.final_route = build_final_route(&backbone, &detour_selections);
    plan.detours = detour_selections;

    verify_pickup_totals(&plan.goods_picked, target_counts)?;
    Ok(plan)
}

/// DP over (backbone position, bitmask of visited candidates). The cheapest
/// way to end the backbone with a demand-covering mask wins; ties go to the
/// smaller mask because masks are scanned in ascending order with a strict
/// comparison.
fn select_detours(
    table: &CandidateTable,
    backbone: &[NodeId],
    remaining: &HashMap<ProductId, Quantity>,
) -> Result<Vec<(usize, usize)>, PlanError> {
    let positions = backbone.len();
    let masks = 1usize << table.len();

    let mut cost = vec![vec![f64::INFINITY; masks]; positions];
    let mut parent: Vec<Vec<Option<Step>>> = vec![vec![None; masks]; positions];
    cost[0][0] = 0.0;

    for position in 0..positions {
        for mask in 0..masks {
            let here = cost[position][mask];
            if !here.is_finite() {
                continue;
            }

            // Insert a detour anchored at this position. Ascending mask order
            // means chains of detours at the same anchor are handled within
            // this position's sweep.
            for candidate in 0..table.len() {
                let bit = 1 << candidate;
                if mask & bit != 0 {
                    continue;
                }
                if let Some((outbound, _)) = &table.from_anchor[candidate][position] {
                    let next = here + 2.0 * outbound;
                    let next_mask = mask | bit;
                    if next < cost[position][next_mask] {
                        cost[position][next_mask] = next;
                        parent[position][next_mask] = Some(Step::Detour(candidate));
                    }
                }
            }

            if position + 1 < positions && here < cost[position + 1][mask] {
                cost[position + 1][mask] = here;
                parent[position + 1][mask] = Some(Step::Advance);
            }
        }
    }

    let last = positions - 1;
    let mut best_mask = None;
    let mut best_cost = f64::INFINITY;
    for mask in 0..masks {
        if cost[last][mask] < best_cost && table.covers(mask, remaining) {
            best_cost = cost[last][mask];
            best_mask = Some(mask);
        }
    }

    let Some(best_mask) = best_mask else {
        // The reachability pre-check makes this unreachable for well-formed
        // tables, but the error is still the right one to surface
        let product = remaining.keys().min().cloned().unwrap_or_default();
        return Err(PlanError::UnreachableObligation { product });
    };

    // Walk the parent pointers back to (0, 0), collecting (anchor, candidate)
    let mut chosen = Vec::new();
    let mut position = last;
    let mut mask = best_mask;
    while position != 0 || mask != 0 {
        match parent[position][mask] {
            Some(Step::Advance) => position -= 1,
            Some(Step::Detour(candidate)) => {
                chosen.push((position, candidate));
                mask &= !(1 << candidate);
            }
            None => break,
        }
    }
    chosen.reverse();
    Ok(chosen)
}

/// Assigns concrete pickup quantities to the chosen detours, walking them in
/// route order and filling each product's outstanding demand greedily
fn allocate_pickups(
    table: &CandidateTable,
    selections: &[(usize, usize)],
    remaining: &HashMap<ProductId, Quantity>,
) -> Vec<DetourSelection> {
    let mut outstanding = remaining.clone();
    let mut products: Vec<ProductId> = remaining.keys().cloned().collect();
    products.sort();

    selections
        .iter()
        .map(|&(anchor_index, candidate)| {
            let (outbound_cost, path) = table.from_anchor[candidate][anchor_index]
                .clone()
                .unwrap_or((0.0, Vec::new()));

            let mut goods: HashMap<ProductId, Quantity> = HashMap::new();
            for product in &products {
                let need = *outstanding.get(product).unwrap_or(&0);
                if need == 0 {
                    continue;
                }
                let available = *table.stock[candidate].get(product).unwrap_or(&0);
                let take = available.min(need);
                if take > 0 {
                    goods.insert(product.clone(), take);
                    outstanding.insert(product.clone(), need - take);
                }
            }

            DetourSelection {
                candidate: DetourCandidate {
                    node: table.nodes[candidate].clone(),
                    anchor: path.first().cloned().unwrap_or_default(),
                    path_to_node: path,
                    outbound_cost,
                    detour_cost: 2.0 * outbound_cost,
                },
                goods_picked: goods,
            }
        })
        .collect()
}

/// Expands the backbone into the final node sequence, splicing each detour in
/// as an out-and-back walk at its anchor
fn build_final_route(backbone: &[NodeId], detours: &[DetourSelection]) -> Vec<NodeId> {
    let mut by_anchor: HashMap<&NodeId, Vec<&DetourSelection>> = HashMap::new();
    for detour in detours {
        by_anchor
            .entry(&detour.candidate.anchor)
            .or_default()
            .push(detour);
    }

    let mut route: Vec<NodeId> = Vec::new();
    for node in backbone {
        if route.last() != Some(node) {
            route.push(node.clone());
        }
        if let Some(anchored) = by_anchor.get(node) {
            for detour in anchored {
                let path = &detour.candidate.path_to_node;
                if path.len() < 2 {
                    continue;
                }
                route.extend(path[1..].iter().cloned());
                route.extend(path[..path.len() - 1].iter().rev().cloned());
            }
        }
    }
    route
}

/// Confirms the planned pickups add up to exactly the target mix
fn verify_pickup_totals(
    goods_picked: &HashMap<NodeId, HashMap<ProductId, Quantity>>,
    target_counts: &HashMap<ProductId, Quantity>,
) -> Result<(), PlanError> {
    let mut totals: HashMap<&ProductId, Quantity> = HashMap::new();
    for stock in goods_picked.values() {
        for (product, amount) in stock {
            *totals.entry(product).or_insert(0) += amount;
        }
    }

    let mut products: Vec<&ProductId> = target_counts.keys().collect();
    products.sort();
    for product in products {
        let required = target_counts[product];
        let planned = *totals.get(product).unwrap_or(&0);
        if planned != required {
            return Err(PlanError::InconsistentPlan {
                product: product.clone(),
                required,
                planned,
            });
        }
    }
    Ok(())
}
