// Models module - exports all model types

mod instance;
mod mix;
mod product;
mod route;

// Re-export model types
pub use self::instance::{
    aggregate_inventory, Constraints, GraphSpec, Instance, RatioRule, RoutingSpec,
};
pub use self::mix::ProductMix;
pub use self::product::Product;
pub use self::route::{DetourCandidate, DetourSelection, RoutePlan, VerificationResult};

// Common type aliases for improved code readability
pub type NodeId = String;
pub type ProductId = String;
pub type Cost = f64;
pub type Quantity = u32;
