// Error taxonomy for instance loading and the solve pipeline

use thiserror::Error;

use crate::models::{Cost, NodeId, ProductId, Quantity};

/// Fatal conditions raised by the core solve pipeline.
/// None of these are retried: every computation is deterministic, so the only
/// recovery path is a corrected input or a corrected algorithm.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// The graph was rejected before solving began
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// The target is unreachable from the source
    #[error("no path between {from} and {to}")]
    NoPath { from: NodeId, to: NodeId },

    /// No product mix satisfies the constraint set
    #[error("no feasible product mix satisfies the constraints")]
    Infeasible,

    /// Required stock cannot be reached from any backbone location
    #[error("required stock of {product} cannot be reached from the backbone")]
    UnreachableObligation { product: ProductId },

    /// The planned pickups diverge from the target mix
    #[error("planned pickups for {product} do not match the target: need {required}, planned {planned}")]
    InconsistentPlan {
        product: ProductId,
        required: Quantity,
        planned: Quantity,
    },

    /// The brute-force check found a cheaper detour covering than the DP did
    #[error("detour verification failed: planner claimed {claimed}, brute force found {best}")]
    VerificationMismatch { claimed: Cost, best: Cost },
}

/// Conditions raised while reading and validating an instance file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read instance file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed instance file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid instance: {0}")]
    Validation(String),
}
