//! Network construction and validation errors.

use af_core::AfError;
use thiserror::Error;

/// Errors raised while building a network or validating it for a solve.
///
/// Construction errors fail immediately and leave the network unchanged;
/// topology errors surface lazily when a solver asks for validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// A node with this id already exists.
    #[error("Duplicate node id {id}")]
    DuplicateNodeId { id: i64 },

    /// A link with this id already exists.
    #[error("Duplicate link id {id}")]
    DuplicateLinkId { id: i64 },

    /// A link references a node id not present in the network.
    #[error("Link {link} references unknown node id {node}")]
    UnknownNode { link: i64, node: i64 },

    /// Lookup of a node id that does not exist.
    #[error("Node id {id} not found")]
    NodeNotFound { id: i64 },

    /// Lookup of a link id that does not exist.
    #[error("Link id {id} not found")]
    LinkNotFound { id: i64 },

    /// A solvable network needs at least one ambient pressure boundary.
    #[error("Network has no ambient node")]
    NoAmbientNode,

    /// A normal node has no undirected path to any ambient node.
    #[error("Node {id} ({name}) has no path to an ambient node")]
    UnreachableNode { id: i64, name: String },
}

pub type NetworkResult<T> = Result<T, NetworkError>;

impl From<NetworkError> for AfError {
    fn from(err: NetworkError) -> Self {
        AfError::Invariant {
            what: err.to_string(),
        }
    }
}
