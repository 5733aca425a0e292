use thiserror::Error;

use crate::cursor::Position;

/// Returned by [`HeartwoodMap::at`](crate::HeartwoodMap::at) when the key has
/// no mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("key not present in map")]
pub struct KeyNotPresent;

/// First broken property found by [`Heartwood::validate`](crate::Heartwood::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root node is red")]
    RedRoot,

    #[error("red node {node:?} has red child {child:?}")]
    RedRedEdge { node: Position, child: Position },

    #[error("path ending below {node:?} holds {found} black nodes, expected {expected}")]
    BlackHeightMismatch {
        node: Position,
        expected: usize,
        found: usize,
    },

    #[error("{node:?} orders after its successor")]
    OutOfOrder { node: Position },

    #[error("comparator is not antisymmetric between {node:?} and its successor")]
    AsymmetricComparator { node: Position },

    #[error("{node:?} repeats its predecessor's key in a unique-key tree")]
    DuplicateKey { node: Position },

    #[error("cached minimum {cached:?} is not the leftmost node {actual:?}")]
    StaleMinimum { cached: Position, actual: Position },

    #[error("cached maximum {cached:?} is not the rightmost node {actual:?}")]
    StaleMaximum { cached: Position, actual: Position },

    #[error("{node:?} does not point back at its parent")]
    BrokenParentLink { node: Position },

    #[error("tree records {recorded} values but {reachable} are reachable")]
    SizeMismatch { recorded: usize, reachable: usize },
}
