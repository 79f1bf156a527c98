// Product mix model: the aggregate purchase decision made by the knapsack phase

use std::collections::HashMap;

use crate::models::{Cost, ProductId, Quantity};

/// The profit-maximal product mix selected by the knapsack solver.
/// Treated as immutable input by the routing phase.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMix {
    /// Chosen quantity for every catalog product (zero entries included)
    pub counts: HashMap<ProductId, Quantity>,

    /// Total profit of the mix, before travel costs
    pub profit: Cost,

    /// Total weight of the mix
    pub weight: f64,

    /// Total number of units across all products
    pub total_units: Quantity,
}

impl ProductMix {
    /// The empty mix: always feasible unless the instance forbids it
    pub fn empty() -> Self {
        Self {
            counts: HashMap::new(),
            profit: 0.0,
            weight: 0.0,
            total_units: 0,
        }
    }

    /// Chosen quantity for a product, zero when absent
    pub fn count(&self, product: &ProductId) -> Quantity {
        *self.counts.get(product).unwrap_or(&0)
    }

    /// True when nothing is purchased
    pub fn is_empty(&self) -> bool {
        self.total_units == 0
    }
}
