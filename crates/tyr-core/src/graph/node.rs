//! Layout nodes: candidate memory regions under reconstruction.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::tag::TagId;

/// Dense, monotonically assigned node identifier.
///
/// Identifiers are handed out by [`LayoutGraph::create_node`] and stay stable
/// for the node's lifetime; they are never reassigned to a different node.
///
/// [`LayoutGraph::create_node`]: super::LayoutGraph::create_node
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Index into the owning graph's arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The raw identifier, as used by the equivalence-class tracker.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// Whether the children embedded in a node may overlap.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum InterferingInfo {
    /// Not classified yet, or invalidated by a merge.
    #[default]
    Unknown,
    /// Children occupy overlapping byte ranges: the node is union-like.
    AllChildrenInterfering,
    /// Children occupy disjoint byte ranges: the node is struct-like.
    AllChildrenNonInterfering,
}

/// One adjacency entry: the neighbor and the interned tag of the link.
pub type Link = (NodeId, TagId);

/// A vertex of the layout type graph.
///
/// Adjacency is always mirrored: for every `(n, t)` in a node's successors,
/// `(self, t)` is in `n`'s predecessors, and vice versa. A node never appears
/// in its own adjacency sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutNode {
    /// Stable identifier within the owning graph.
    pub id: NodeId,
    /// Byte size; 0 means the size is not yet known.
    pub size: u64,
    /// Interference classification of the node's embedded children.
    pub interfering: InterferingInfo,
    /// Outgoing links, ordered, no duplicate (neighbor, tag) pair.
    pub successors: BTreeSet<Link>,
    /// Incoming links, ordered, no duplicate (neighbor, tag) pair.
    pub predecessors: BTreeSet<Link>,
}

impl LayoutNode {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            size: 0,
            interfering: InterferingInfo::Unknown,
            successors: BTreeSet::new(),
            predecessors: BTreeSet::new(),
        }
    }

    /// True if the node has no outgoing links at all.
    pub fn is_sink(&self) -> bool {
        self.successors.is_empty()
    }
}

impl fmt::Display for LayoutNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LTN {} size {}", self.id, self.size)
    }
}
