// Algorithms module: the three engines of the solve pipeline

pub mod detour;
pub mod knapsack;
pub mod verify;

pub use self::detour::{collect_on_path, plan_route};
pub use self::knapsack::solve_product_mix;
pub use self::verify::verify_detours;
