//! Error types for the Arcane prototype.
//!
//! Runtime operations in the core are total. These errors cover
//! construction input and invariant checks only.

use thiserror::Error;

use crate::coords::CellCoord;

/// Top-level error type for Arcane operations.
#[derive(Debug, Error)]
pub enum ArcaneError {
    /// Animation graph construction errors
    #[error("Animation error: {0}")]
    Animation(#[from] AnimationError),

    /// Spatial grid invariant errors
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Animation graph construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    /// A cycle was requested with no frames
    #[error("cycle '{name}' has no frames")]
    EmptyCycle {
        /// Name of the cycle
        name: String,
    },

    /// A state id does not belong to this graph
    #[error("state {index} is out of range (graph has {len} states)")]
    UnknownState {
        /// Offending index
        index: usize,
        /// Number of states in the graph
        len: usize,
    },

    /// A state cannot be reached from its declared start
    #[error("state {index} is unreachable from start {start}")]
    Unreachable {
        /// Unreachable state index
        index: usize,
        /// Declared start index
        start: usize,
    },
}

/// Spatial grid invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Entity listed in more than one cell, or twice in one cell
    #[error("entity {id} appears {count} times across cells")]
    Duplicated {
        /// Raw entity id
        id: u64,
        /// Number of occurrences
        count: usize,
    },

    /// Reverse map disagrees with cell contents
    #[error("entity {id} is mapped to {mapped:?} but stored in {actual:?}")]
    Misplaced {
        /// Raw entity id
        id: u64,
        /// Cell recorded in the reverse map
        mapped: CellCoord,
        /// Cell that actually holds it
        actual: Option<CellCoord>,
    },

    /// Entity stored in a cell but absent from the reverse map
    #[error("entity {id} is stored in {cell:?} but not registered")]
    Orphaned {
        /// Raw entity id
        id: u64,
        /// Cell holding the orphan
        cell: CellCoord,
    },
}

/// Result type alias for Arcane operations.
pub type ArcaneResult<T> = Result<T, ArcaneError>;
