//! Error types for tree-state synchronization

use thiserror::Error;

/// Errors that can occur while capturing or restoring tree state
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A visual node on the path carries no stable identifier
    #[error("tree node at depth {depth} has no stable identifier")]
    UnidentifiableNode { depth: usize },

    /// The snapshot already holds a capture; use a fresh snapshot
    #[error("snapshot has already been captured")]
    AlreadyCaptured,

    /// The snapshot was never captured
    #[error("snapshot has not been captured")]
    NotCaptured,
}
