// Public modules
pub mod algorithms;
pub mod error;
pub mod models;
pub mod planner;
pub mod utils;

// Re-exports for convenience
pub use algorithms::{plan_route, solve_product_mix, verify_detours};
pub use error::{LoadError, PlanError};
pub use models::{Instance, Product, ProductMix, RoutePlan, VerificationResult};
pub use planner::{solve_instance, SolveOutcome};
pub use utils::Graph;
