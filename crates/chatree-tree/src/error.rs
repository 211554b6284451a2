use thiserror::Error;

use crate::path::NodeId;

/// Errors from structural tree operations.
///
/// All of them mean the caller addressed the tree with a path that does not
/// belong to the snapshot it is operating on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("the root cannot be inserted, replaced or removed through a path")]
    RootNotAddressable,

    #[error("path {path} does not exist (no node at depth {depth})")]
    StalePath { path: NodeId, depth: usize },

    #[error("position {position} out of range for {path} (parent has {len} children)")]
    PositionOutOfRange {
        path: NodeId,
        position: usize,
        len: usize,
    },
}

pub type TreeResult<T> = Result<T, TreeError>;
