// Product model representing catalog entries that can be hauled for profit

use serde::{Deserialize, Serialize};

use crate::models::Cost;

/// Immutable catalog entry: the per-unit profit and weight of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Profit earned for each unit sold at the destination
    pub profit_per_unit: Cost,

    /// Weight of a single unit, counted against the warehouse capacity
    pub weight_per_unit: f64,
}

impl Product {
    /// Creates a new catalog entry with the given per-unit profit and weight
    pub fn new(profit_per_unit: Cost, weight_per_unit: f64) -> Self {
        Self {
            profit_per_unit,
            weight_per_unit,
        }
    }
}
