//! Edge-kind filters and node predicates.
//!
//! An [`EdgeFilter`] restricts a traversal to one kind of link; the graph
//! views built on top of it are shared by the verification suite and by the
//! simplification steps that consume the engine.

use std::fmt;

use super::node::{InterferingInfo, Link, NodeId};
use super::tag::{LinkTag, TagKind};
use super::LayoutGraph;

/// A view selector over link kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFilter {
    /// Every link.
    Any,
    /// Every link except pointer links.
    NotPointer,
    Equality,
    Inheritance,
    Instance,
    /// Instance links at offset zero with no array dimensions: the pure
    /// nesting sub-relation.
    InstanceOff0,
    Pointer,
}

impl EdgeFilter {
    pub fn matches(self, tag: &LinkTag) -> bool {
        match self {
            EdgeFilter::Any => true,
            EdgeFilter::NotPointer => tag.kind() != TagKind::Pointer,
            EdgeFilter::Equality => tag.kind() == TagKind::Equality,
            EdgeFilter::Inheritance => tag.kind() == TagKind::Inheritance,
            EdgeFilter::Instance => tag.kind() == TagKind::Instance,
            EdgeFilter::InstanceOff0 => tag.is_instance_at_zero(),
            EdgeFilter::Pointer => tag.kind() == TagKind::Pointer,
        }
    }
}

impl fmt::Display for EdgeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeFilter::Any => write!(f, "any"),
            EdgeFilter::NotPointer => write!(f, "non-pointer"),
            EdgeFilter::Equality => write!(f, "equality"),
            EdgeFilter::Inheritance => write!(f, "inheritance"),
            EdgeFilter::Instance => write!(f, "instance"),
            EdgeFilter::InstanceOff0 => write!(f, "instance-at-0"),
            EdgeFilter::Pointer => write!(f, "pointer"),
        }
    }
}

impl LayoutGraph {
    /// Successor links of `id` whose tag matches `filter`.
    pub fn links_matching(
        &self,
        id: NodeId,
        filter: EdgeFilter,
    ) -> impl Iterator<Item = Link> + '_ {
        self.node(id)
            .successors
            .iter()
            .copied()
            .filter(move |&(_, tag)| filter.matches(self.tag(tag)))
    }

    /// Successor neighbors of `id` through links matching `filter`.
    pub fn successors_matching(
        &self,
        id: NodeId,
        filter: EdgeFilter,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.links_matching(id, filter).map(|(nbr, _)| nbr)
    }

    /// Predecessor neighbors of `id` through links matching `filter`.
    pub fn predecessors_matching(
        &self,
        id: NodeId,
        filter: EdgeFilter,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .predecessors
            .iter()
            .filter(move |&&(_, tag)| filter.matches(self.tag(tag)))
            .map(|&(nbr, _)| nbr)
    }
}

/// The node holds a pointer: it has at least one pointer successor.
pub fn is_pointer_node(g: &LayoutGraph, id: NodeId) -> bool {
    g.successors_matching(id, EdgeFilter::Pointer).next().is_some()
}

/// Struct-like aggregate: all children known non-interfering and at least one
/// non-pointer child.
pub fn is_struct_node(g: &LayoutGraph, id: NodeId) -> bool {
    g.node(id).interfering == InterferingInfo::AllChildrenNonInterfering
        && g.successors_matching(id, EdgeFilter::NotPointer)
            .next()
            .is_some()
}

/// Union-like aggregate: all children known interfering.
pub fn is_union_node(g: &LayoutGraph, id: NodeId) -> bool {
    g.node(id).interfering == InterferingInfo::AllChildrenInterfering
}

/// No outgoing links matching `filter`.
pub fn is_leaf(g: &LayoutGraph, id: NodeId, filter: EdgeFilter) -> bool {
    g.successors_matching(id, filter).next().is_none()
}

/// No incoming links matching `filter`.
pub fn is_root(g: &LayoutGraph, id: NodeId, filter: EdgeFilter) -> bool {
    g.predecessors_matching(id, filter).next().is_none()
}

pub fn is_inheritance_leaf(g: &LayoutGraph, id: NodeId) -> bool {
    is_leaf(g, id, EdgeFilter::Inheritance)
}

pub fn is_instance_leaf(g: &LayoutGraph, id: NodeId) -> bool {
    is_leaf(g, id, EdgeFilter::Instance)
}

pub fn is_pointer_leaf(g: &LayoutGraph, id: NodeId) -> bool {
    is_leaf(g, id, EdgeFilter::Pointer)
}

pub fn is_inheritance_root(g: &LayoutGraph, id: NodeId) -> bool {
    is_root(g, id, EdgeFilter::Inheritance)
}

pub fn is_instance_root(g: &LayoutGraph, id: NodeId) -> bool {
    is_root(g, id, EdgeFilter::Instance)
}

pub fn is_pointer_root(g: &LayoutGraph, id: NodeId) -> bool {
    is_root(g, id, EdgeFilter::Pointer)
}

/// The node has an inheritance parent: some predecessor inherits through it.
pub fn has_inheritance_parent(g: &LayoutGraph, id: NodeId) -> bool {
    !is_root(g, id, EdgeFilter::Inheritance)
}
