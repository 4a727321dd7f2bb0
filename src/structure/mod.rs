//! Discrete secondary-structure algorithms: pair validation, main-layer
//! extraction and loop decomposition.

mod layer;
mod loops;
mod pair;

pub use layer::main_layer;
pub use loops::{Loop, LoopKind, build_loops};
pub use pair::BasePair;

/// Structural failures. These are fatal: unlike geometric degeneracies they
/// mean the input itself is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// A residue or pair endpoint outside `1..=limit`.
    #[error("residue index {index} outside valid range 1..={limit}")]
    InvalidIndex { index: u32, limit: u32 },

    /// A pair list that cannot describe a planar nesting.
    #[error("invalid pairing ({i},{j}): {reason}")]
    InvalidPairing { i: u32, j: u32, reason: String },

    /// A mode integer outside the allowed set.
    #[error("parameter {name} must be 0 or 1, got {value}")]
    InvalidParameter { name: &'static str, value: i64 },
}
