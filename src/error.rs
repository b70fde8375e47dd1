use thiserror::Error;

use crate::layer::FacePair;

/// Top-level error type for the layer solver.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("epsilon must be finite and positive, got {0}")]
    InvalidEpsilon(f64),
}

/// Errors raised while checking the input mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("{what} index {index} is out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{what} has {found} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unknown edge assignment: {0:?}")]
    UnknownAssignment(String),

    #[error("missing adjacency: {0}")]
    MissingAdjacency(&'static str),
}

/// Errors produced by the layer-order solver.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The unconditional constraints contradict each other: no layer order exists.
    #[error("no valid layer ordering{}", conflict_suffix(.pair))]
    NoSolution { pair: Option<FacePair> },

    #[error("branch exploration exceeded {limit} nodes")]
    BranchLimitExceeded { limit: usize },

    #[error("invalid face pair key: {0:?}")]
    InvalidPairKey(String),
}

fn conflict_suffix(pair: &Option<FacePair>) -> String {
    match pair {
        Some(pair) => format!(" (conflict on face pair {pair})"),
        None => String::new(),
    }
}

/// Convenience type alias for results using [`LayerError`].
pub type Result<T> = std::result::Result<T, LayerError>;
