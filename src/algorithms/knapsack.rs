// Exhaustive product-mix solver: enumerates every integer quantity vector
// under the constraint set and keeps the profit-maximal one

use std::collections::HashMap;

use log::debug;
use rayon::prelude::*;

use crate::error::PlanError;
use crate::models::{
    aggregate_inventory, Constraints, NodeId, Product, ProductId, ProductMix, Quantity,
};

const RATIO_EPS: f64 = 1e-9;

/// A complete quantity vector under the fixed product order, with its
/// feasibility-relevant aggregates
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    counts: Vec<Quantity>,
    profit: f64,
    weight: f64,
    total_units: Quantity,
}

impl Candidate {
    /// Fixed total order used both sequentially and when merging parallel
    /// partial results: higher profit, then fewer units, then the
    /// lexicographically smaller vector
    fn beats(&self, other: &Candidate) -> bool {
        if self.profit != other.profit {
            return self.profit > other.profit;
        }
        if self.total_units != other.total_units {
            return self.total_units < other.total_units;
        }
        self.counts < other.counts
    }
}

struct SearchSpace {
    order: Vec<ProductId>,
    profits: Vec<f64>,
    weights: Vec<f64>,
    bounds: Vec<Quantity>,
    // Best possible profit from product index i onwards, for pruning
    suffix_best: Vec<f64>,
    ratios: Vec<(usize, usize, f64)>,
    unit_limit: Quantity,
    weight_limit: f64,
}

impl SearchSpace {
    fn build(
        products: &HashMap<ProductId, Product>,
        inventory: &HashMap<NodeId, HashMap<ProductId, Quantity>>,
        constraints: &Constraints,
    ) -> Self {
        // Fixed product order so enumeration and tie-breaking are reproducible
        let mut order: Vec<ProductId> = products.keys().cloned().collect();
        order.sort();

        let totals = aggregate_inventory(inventory);

        let profits: Vec<f64> = order
            .iter()
            .map(|id| products[id].profit_per_unit)
            .collect();
        let weights: Vec<f64> = order
            .iter()
            .map(|id| products[id].weight_per_unit)
            .collect();

        // Per-product upper bound: total stock, any explicit cap, and the
        // truck capacity (no single product can exceed it)
        let bounds: Vec<Quantity> = order
            .iter()
            .map(|id| {
                let stock = *totals.get(id).unwrap_or(&0);
                let cap = *constraints
                    .per_product_caps
                    .get(id)
                    .unwrap_or(&Quantity::MAX);
                stock.min(cap).min(constraints.truck_capacity_units)
            })
            .collect();

        let mut suffix_best = vec![0.0; order.len() + 1];
        for i in (0..order.len()).rev() {
            suffix_best[i] = suffix_best[i + 1] + profits[i].max(0.0) * bounds[i] as f64;
        }

        let index_of: HashMap<&ProductId, usize> =
            order.iter().enumerate().map(|(i, id)| (id, i)).collect();
        let ratios: Vec<(usize, usize, f64)> = constraints
            .ratio_constraints
            .iter()
            .filter_map(|rule| {
                match (index_of.get(&rule.numerator), index_of.get(&rule.denominator)) {
                    (Some(&num), Some(&den)) => Some((num, den, rule.factor)),
                    _ => None,
                }
            })
            .collect();

        Self {
            order,
            profits,
            weights,
            bounds,
            suffix_best,
            ratios,
            unit_limit: constraints.truck_capacity_units,
            weight_limit: constraints.warehouse_capacity_tons,
        }
    }

    fn ratios_satisfied(&self, counts: &[Quantity]) -> bool {
        self.ratios.iter().all(|&(num, den, factor)| {
            if counts[den] == 0 {
                counts[num] == 0
            } else {
                counts[num] as f64 <= factor * counts[den] as f64 + RATIO_EPS
            }
        })
    }

    /// Depth-first enumeration over products `index..`, with monotone capacity
    /// breaks and a best-case profit bound. Pruning uses a strict `<` so a
    /// branch that could still tie the incumbent is always explored.
    fn enumerate(
        &self,
        index: usize,
        counts: &mut Vec<Quantity>,
        units: Quantity,
        weight: f64,
        profit: f64,
        best: &mut Option<Candidate>,
    ) {
        if let Some(incumbent) = best {
            if profit + self.suffix_best[index] < incumbent.profit {
                return;
            }
        }

        if index == self.order.len() {
            if !self.ratios_satisfied(counts) {
                return;
            }
            let candidate = Candidate {
                counts: counts.clone(),
                profit,
                weight,
                total_units: units,
            };
            let improves = match best {
                Some(incumbent) => candidate.beats(incumbent),
                None => true,
            };
            if improves {
                *best = Some(candidate);
            }
            return;
        }

        for quantity in 0..=self.bounds[index] {
            let next_units = units + quantity;
            if next_units > self.unit_limit {
                // More of this product only adds units
                break;
            }
            let next_weight = weight + quantity as f64 * self.weights[index];
            if next_weight > self.weight_limit {
                // More of this product only adds weight
                break;
            }

            counts.push(quantity);
            self.enumerate(
                index + 1,
                counts,
                next_units,
                next_weight,
                profit + quantity as f64 * self.profits[index],
                best,
            );
            counts.pop();
        }
    }
}

/// Determines the profit-maximal aggregate product mix.
///
/// The first product's quantity axis is split across rayon workers; partial
/// winners are merged with the same total order used inside each worker, so
/// parallel execution never changes the selected mix.
pub fn solve_product_mix(
    products: &HashMap<ProductId, Product>,
    inventory: &HashMap<NodeId, HashMap<ProductId, Quantity>>,
    constraints: &Constraints,
) -> Result<ProductMix, PlanError> {
    let space = SearchSpace::build(products, inventory, constraints);

    if space.order.is_empty() {
        if constraints.require_nonempty {
            return Err(PlanError::Infeasible);
        }
        return Ok(ProductMix::empty());
    }

    debug!(
        "enumerating product mixes over {} products, bounds {:?}",
        space.order.len(),
        space.bounds
    );

    let best = (0..=space.bounds[0])
        .into_par_iter()
        .map(|first_quantity| {
            let units = first_quantity;
            if units > space.unit_limit {
                return None;
            }
            let weight = first_quantity as f64 * space.weights[0];
            if weight > space.weight_limit {
                return None;
            }

            let mut counts = vec![first_quantity];
            let mut branch_best = None;
            space.enumerate(
                1,
                &mut counts,
                units,
                weight,
                first_quantity as f64 * space.profits[0],
                &mut branch_best,
            );
            branch_best
        })
        .reduce(
            || None,
            |left, right| match (left, right) {
                (Some(a), Some(b)) => {
                    if b.beats(&a) {
                        Some(b)
                    } else {
                        Some(a)
                    }
                }
                (Some(a), None) => Some(a),
                (None, b) => b,
            },
        );

    let best = best.ok_or(PlanError::Infeasible)?;
    if constraints.require_nonempty && best.total_units == 0 {
        return Err(PlanError::Infeasible);
    }

    debug!(
        "selected mix with profit {:.2}, {} units, {:.3} weight",
        best.profit, best.total_units, best.weight
    );

    let counts = space
        .order
        .iter()
        .cloned()
        .zip(best.counts.iter().copied())
        .collect();
    Ok(ProductMix {
        counts,
        profit: best.profit,
        weight: best.weight,
        total_units: best.total_units,
    })
}
