//! Errors of the core graph crate.

use thiserror::Error;

use crate::graph::node::NodeId;
use crate::graph::tag::TagId;

/// Representation-level errors found in a graph loaded from untrusted input.
///
/// These are recoverable, typed errors for data problems; they are distinct
/// from the semantic invariant checks of the verification suite, whose
/// failures indicate bugs in mutation code.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("live set and arena disagree about {0}")]
    LiveSetMismatch(NodeId),

    #[error("arena slot {slot} holds a node with id {id}")]
    IdMismatch { slot: usize, id: NodeId },

    #[error("{node} links to {neighbor}, which is not live")]
    UnknownNeighbor { node: NodeId, neighbor: NodeId },

    #[error("{node} carries unknown tag handle {tag}")]
    UnknownTag { node: NodeId, tag: TagId },

    #[error("{0} links to itself")]
    SelfLink(NodeId),

    #[error("link {from} -> {to} ({tag}) is not mirrored on the other endpoint")]
    UnmirroredLink { from: NodeId, to: NodeId, tag: TagId },

    #[error("equivalence classes track {actual} ids but {expected} were created")]
    EqClassSize { expected: usize, actual: usize },
}
