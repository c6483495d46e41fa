//! The layout type graph: an arena of candidate memory-layout nodes joined by
//! typed links, with destructive mutation primitives.
//!
//! The graph is the sole owner of its nodes and tags. A frontend builder
//! populates it with [`LayoutGraph::create_node`] and the `add_*_link`
//! operations; simplification steps then call [`LayoutGraph::merge_nodes`],
//! [`LayoutGraph::remove_node`] and [`LayoutGraph::move_edge`] to collapse it,
//! interleaved with the checks in the verification crate. A parallel
//! union-find ([`EqClasses`]) records which original identifiers ended up in
//! which surviving node.
//!
//! Caller-contract violations (self links where forbidden, non-live node
//! arguments, rebasing a non-offsettable edge) indicate a bug in a calling
//! step and panic rather than being reported as recoverable errors.

pub mod filter;
pub mod node;
pub mod tag;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::eqclass::EqClasses;
use crate::error::GraphError;

use self::node::{InterferingInfo, LayoutNode, Link, NodeId};
use self::tag::{LinkTag, OffsetExpr, TagId, TagKind, TagTable};

/// The mutable layout type graph.
///
/// Nodes live in an arena indexed by their identifier; removing or merging a
/// node tombstones its slot, and identifiers are never reassigned. All links
/// are mirrored: inserting a successor entry always inserts the matching
/// predecessor entry, and every mutation maintains that symmetry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutGraph {
    /// Arena of nodes; `None` marks a removed or merged-away identifier.
    slots: Vec<Option<LayoutNode>>,
    /// Identifiers of live nodes, for enumeration.
    live: BTreeSet<NodeId>,
    /// Interned link tags.
    tags: TagTable,
    /// Equivalence classes over every identifier ever created.
    eq_classes: EqClasses,
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node with a fresh identifier and its own equivalence class.
    pub fn create_node(&mut self) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        let class = self.eq_classes.grow_by_one();
        debug_assert_eq!(class, id.raw());
        self.slots.push(Some(LayoutNode::new(id)));
        self.live.insert(id);
        id
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.live.len()
    }

    /// The identifier the next created node will receive.
    pub fn next_node_id(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Whether `id` names a live node.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|slot| slot.is_some())
    }

    /// Look up a live node.
    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.slots.get(id.index()).and_then(|slot| slot.as_ref())
    }

    /// Look up a live node.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn node(&self, id: NodeId) -> &LayoutNode {
        match self.get(id) {
            Some(node) => node,
            None => panic!("{id} is not live"),
        }
    }

    /// Mutable access to a live node's size and interference classification.
    ///
    /// Adjacency is only mutated through the graph's own operations, so this
    /// hands out the two scalar fields rather than the whole node.
    pub fn set_size(&mut self, id: NodeId, size: u64) {
        self.node_mut(id).size = size;
    }

    pub fn set_interfering(&mut self, id: NodeId, info: InterferingInfo) {
        self.node_mut(id).interfering = info;
    }

    fn node_mut(&mut self, id: NodeId) -> &mut LayoutNode {
        match self.slots.get_mut(id.index()).and_then(|s| s.as_mut()) {
            Some(node) => node,
            None => panic!("{id} is not live"),
        }
    }

    /// Iterate over all live nodes in identifier order.
    ///
    /// The iteration order is stable across read-only traversals and
    /// invalidated by any mutation.
    pub fn nodes(&self) -> impl Iterator<Item = &LayoutNode> {
        self.live.iter().map(|&id| self.node(id))
    }

    /// Identifiers of all live nodes, in order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.live.iter().copied()
    }

    /// Resolve an interned tag handle.
    pub fn tag(&self, id: TagId) -> &LinkTag {
        self.tags.resolve(id)
    }

    /// Successors of `id` with their tags resolved.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &LinkTag)> {
        self.node(id)
            .successors
            .iter()
            .map(|&(nbr, tag)| (nbr, self.tags.resolve(tag)))
    }

    /// Predecessors of `id` with their tags resolved.
    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &LinkTag)> {
        self.node(id)
            .predecessors
            .iter()
            .map(|&(nbr, tag)| (nbr, self.tags.resolve(tag)))
    }

    /// The equivalence classes over every identifier ever created.
    pub fn eq_classes(&self) -> &EqClasses {
        &self.eq_classes
    }

    /// Mutable access, e.g. to compress the classes once mutation is done.
    pub fn eq_classes_mut(&mut self) -> &mut EqClasses {
        &mut self.eq_classes
    }

    /// Insert a typed link. Links are idempotent: inserting an existing
    /// (neighbor, tag) pair reports `false` for the "new" flag.
    ///
    /// Returns `None` without touching the graph if `src == tgt`; self links
    /// are forbidden.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is not live.
    fn add_link(&mut self, src: NodeId, tgt: NodeId, tag: LinkTag) -> Option<(TagId, bool)> {
        if src == tgt {
            return None;
        }
        assert!(self.is_live(src), "link source {src} is not live");
        assert!(self.is_live(tgt), "link target {tgt} is not live");
        let tag_id = self.tags.intern(tag);
        let new_succ = self.node_mut(src).successors.insert((tgt, tag_id));
        let new_pred = self.node_mut(tgt).predecessors.insert((src, tag_id));
        debug_assert_eq!(new_succ, new_pred, "adjacency mirror out of sync");
        Some((tag_id, new_succ | new_pred))
    }

    /// Link two nodes as the same byte region. Inserted symmetrically, one
    /// link in each direction; both insertions must agree.
    pub fn add_equality_link(&mut self, src: NodeId, tgt: NodeId) -> Option<(TagId, bool)> {
        let forward = self.add_link(src, tgt, LinkTag::equality());
        let backward = self.add_link(tgt, src, LinkTag::equality());
        assert_eq!(forward, backward, "asymmetric equality insertion");
        forward
    }

    /// Link `src` as inheriting from `tgt`: `tgt`'s bytes are a zero-offset
    /// prefix of `src`'s bytes.
    pub fn add_inheritance_link(&mut self, src: NodeId, tgt: NodeId) -> Option<(TagId, bool)> {
        self.add_link(src, tgt, LinkTag::inheritance())
    }

    /// Link `src` as containing an instance of `tgt` at the given offset.
    pub fn add_instance_link(
        &mut self,
        src: NodeId,
        tgt: NodeId,
        offset: OffsetExpr,
    ) -> Option<(TagId, bool)> {
        self.add_link(src, tgt, LinkTag::instance(offset))
    }

    /// Link `src` as holding a pointer whose pointee layout is `tgt`.
    pub fn add_pointer_link(&mut self, src: NodeId, tgt: NodeId) -> Option<(TagId, bool)> {
        self.add_link(src, tgt, LinkTag::pointer())
    }

    /// Merge every node in `to_merge[1..]` into `to_merge[0]`.
    ///
    /// Every edge incident on a merged node is re-pointed at the survivor,
    /// the merged adjacency sets are unioned into the survivor's (minus any
    /// resulting self entries, which absorbs direct links between merged
    /// nodes), the equivalence classes are joined, the survivor's
    /// interference classification is reset to unknown, and its size becomes
    /// the maximum of the merged sizes.
    ///
    /// # Panics
    ///
    /// Panics if `to_merge` has fewer than two entries, contains the survivor
    /// twice, names a non-live node, or if a merged size would shrink: the
    /// survivor's size must be zero or no greater than each merged size.
    pub fn merge_nodes(&mut self, to_merge: &[NodeId]) {
        assert!(to_merge.len() > 1, "merge needs at least two nodes");
        let into = to_merge[0];
        assert!(self.is_live(into), "merge survivor {into} is not live");

        for &from in &to_merge[1..] {
            assert_ne!(from, into, "cannot merge {into} into itself");
            debug!(%from, %into, "merging");

            self.eq_classes.join(into.raw(), from.raw());

            let removed = self.slots[from.index()]
                .take()
                .unwrap_or_else(|| panic!("merged node {from} is not live"));
            self.live.remove(&from);

            // Re-point every mirror entry at the survivor. The neighbor may
            // be the survivor itself; the self entries that produces are
            // stripped below.
            for &(nbr, tag) in &removed.successors {
                let n = self.node_mut(nbr);
                n.predecessors.remove(&(from, tag));
                n.predecessors.insert((into, tag));
            }
            for &(nbr, tag) in &removed.predecessors {
                let n = self.node_mut(nbr);
                n.successors.remove(&(from, tag));
                n.successors.insert((into, tag));
            }

            let survivor = self.node_mut(into);
            survivor.successors.extend(removed.successors);
            survivor.predecessors.extend(removed.predecessors);
            survivor
                .successors
                .retain(|&(n, _)| n != into && n != from);
            survivor
                .predecessors
                .retain(|&(n, _)| n != into && n != from);

            // Whatever was known about sibling interference no longer holds.
            survivor.interfering = InterferingInfo::Unknown;

            assert!(
                survivor.size == 0 || survivor.size <= removed.size,
                "merge would shrink {into}: size {} vs merged {}",
                survivor.size,
                removed.size,
            );
            survivor.size = survivor.size.max(removed.size);
        }
    }

    /// Remove a node: erase the mirror of every incident edge, tombstone its
    /// identifier in the equivalence classes, and release its slot.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn remove_node(&mut self, id: NodeId) {
        assert!(self.is_live(id), "removed node {id} is not live");
        debug!(%id, "removing");

        self.eq_classes.remove(id.raw());

        let removed = self.slots[id.index()].take().expect("checked live above");
        self.live.remove(&id);

        for &(nbr, tag) in &removed.successors {
            self.node_mut(nbr).predecessors.remove(&(id, tag));
        }
        for &(nbr, tag) in &removed.predecessors {
            self.node_mut(nbr).successors.remove(&(id, tag));
        }
    }

    /// Relocate one successor edge of `old_src` to `new_src`, rebasing its
    /// offset by `offset_to_sum`.
    ///
    /// With `offset_to_sum == 0` this is a pure relink that keeps the tag.
    /// Otherwise the tag is rebased: an inheritance edge moved by a positive
    /// offset becomes an instance edge at that offset (inheritance only means
    /// "at offset zero"), and an instance edge has the offset added to its
    /// own. Rebasing by `offset_to_sum` such that `new_src` coincides with
    /// the edge's target silently drops the edge.
    ///
    /// # Panics
    ///
    /// Panics if either source is not live, `link` is not a successor of
    /// `old_src`, a rebased instance offset would become negative, or the
    /// edge is an equality or pointer edge (those can never be rebased).
    pub fn move_edge(&mut self, old_src: NodeId, new_src: NodeId, link: Link, offset_to_sum: i64) {
        let (tgt, tag_id) = link;
        assert!(self.is_live(old_src), "move source {old_src} is not live");
        assert!(self.is_live(new_src), "move destination {new_src} is not live");
        assert!(
            self.node(old_src).successors.contains(&link),
            "{old_src} has no successor edge to {tgt} with {tag_id}"
        );
        debug!(%old_src, %new_src, %tgt, offset_to_sum, "moving edge");

        if offset_to_sum == 0 {
            assert_ne!(new_src, tgt, "relinking an edge onto its own target");
            self.node_mut(old_src).successors.remove(&link);
            self.node_mut(tgt).predecessors.remove(&(old_src, tag_id));
            self.node_mut(new_src).successors.insert((tgt, tag_id));
            self.node_mut(tgt).predecessors.insert((new_src, tag_id));
            return;
        }

        let tag = self.tags.resolve(tag_id).clone();
        match tag.kind() {
            TagKind::Inheritance => {
                // Inheritance means "at offset zero": a positive offset turns
                // the relation into an embedded instance.
                if offset_to_sum > 0 {
                    self.add_instance_link(new_src, tgt, OffsetExpr::at(offset_to_sum));
                } else {
                    self.add_inheritance_link(new_src, tgt);
                }
            }
            TagKind::Instance => {
                let mut rebased = tag.offset_expr().clone();
                rebased.offset += offset_to_sum;
                assert!(
                    rebased.offset >= 0,
                    "rebased instance offset {} is negative",
                    rebased.offset
                );
                self.add_instance_link(new_src, tgt, rebased);
            }
            TagKind::Equality | TagKind::Pointer => {
                panic!("a {} edge can never be offset-rebased", tag.kind());
            }
        }

        // Drop the residual edge from the old source and its mirror.
        self.node_mut(old_src).successors.remove(&link);
        self.node_mut(tgt).predecessors.remove(&(old_src, tag_id));
    }

    /// Validate the stored representation of a graph loaded from untrusted
    /// input: arena/live-set agreement, in-range handles, mirrored adjacency,
    /// no self links, and a union-find entry per created identifier.
    pub fn check_integrity(&self) -> Result<(), GraphError> {
        if self.eq_classes.len() != self.slots.len() {
            return Err(GraphError::EqClassSize {
                expected: self.slots.len(),
                actual: self.eq_classes.len(),
            });
        }

        for (slot, entry) in self.slots.iter().enumerate() {
            let Some(node) = entry else {
                if self.live.contains(&NodeId(slot as u32)) {
                    return Err(GraphError::LiveSetMismatch(NodeId(slot as u32)));
                }
                continue;
            };
            if node.id.index() != slot {
                return Err(GraphError::IdMismatch { slot, id: node.id });
            }
            if !self.live.contains(&node.id) {
                return Err(GraphError::LiveSetMismatch(node.id));
            }

            for &(nbr, tag) in node.successors.iter().chain(&node.predecessors) {
                if nbr == node.id {
                    return Err(GraphError::SelfLink(node.id));
                }
                if self.tags.get(tag).is_none() {
                    return Err(GraphError::UnknownTag { node: node.id, tag });
                }
                if !self.is_live(nbr) {
                    return Err(GraphError::UnknownNeighbor {
                        node: node.id,
                        neighbor: nbr,
                    });
                }
            }
            for &(nbr, tag) in &node.successors {
                if !self.node(nbr).predecessors.contains(&(node.id, tag)) {
                    return Err(GraphError::UnmirroredLink {
                        from: node.id,
                        to: nbr,
                        tag,
                    });
                }
            }
            for &(nbr, tag) in &node.predecessors {
                if !self.node(nbr).successors.contains(&(node.id, tag)) {
                    return Err(GraphError::UnmirroredLink {
                        from: nbr,
                        to: node.id,
                        tag,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every successor entry must be mirrored as a predecessor entry on the
    /// other endpoint, and vice versa.
    fn assert_mirrored(g: &LayoutGraph) {
        for node in g.nodes() {
            for &(nbr, tag) in &node.successors {
                assert!(g.node(nbr).predecessors.contains(&(node.id, tag)));
                assert_ne!(nbr, node.id);
            }
            for &(nbr, tag) in &node.predecessors {
                assert!(g.node(nbr).successors.contains(&(node.id, tag)));
                assert_ne!(nbr, node.id);
            }
        }
    }

    #[test]
    fn create_assigns_monotonic_ids() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        let c = g.create_node();
        assert!(a < b && b < c);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.eq_classes().len(), 3);
    }

    #[test]
    fn links_are_mirrored_and_idempotent() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();

        let (tag, new) = g.add_instance_link(a, b, OffsetExpr::at(8)).unwrap();
        assert!(new);
        let (tag2, new2) = g.add_instance_link(a, b, OffsetExpr::at(8)).unwrap();
        assert!(!new2);
        assert_eq!(tag, tag2);

        assert_mirrored(&g);
        assert_eq!(g.node(a).successors.len(), 1);
        assert_eq!(g.node(b).predecessors.len(), 1);
        assert!(g.check_integrity().is_ok());
    }

    #[test]
    fn self_link_is_rejected() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        assert!(g.add_pointer_link(a, a).is_none());
        assert!(g.node(a).successors.is_empty());
    }

    #[test]
    fn same_tag_interned_once_across_endpoints() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        let c = g.create_node();
        let d = g.create_node();

        let (t1, _) = g.add_instance_link(a, b, OffsetExpr::at(4)).unwrap();
        let (t2, _) = g.add_instance_link(c, d, OffsetExpr::at(4)).unwrap();
        assert_eq!(t1, t2, "equal tags must share one stored instance");

        let (t3, _) = g.add_instance_link(a, c, OffsetExpr::at(12)).unwrap();
        assert_ne!(t1, t3);
    }

    #[test]
    fn equality_links_are_symmetric() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        g.add_equality_link(a, b).unwrap();

        assert_eq!(g.node(a).successors.len(), 1);
        assert_eq!(g.node(b).successors.len(), 1);
        assert_eq!(g.node(a).predecessors.len(), 1);
        assert_eq!(g.node(b).predecessors.len(), 1);
        assert_mirrored(&g);
    }

    #[test]
    fn merge_collapses_duplicates_and_keeps_max_size() {
        // A(4) and B(8) both contain C at offset 0; merging [A, B] must leave
        // one instance edge to C and the larger size.
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        let c = g.create_node();
        g.set_size(a, 4);
        g.set_size(b, 8);
        g.add_instance_link(a, c, OffsetExpr::at(0)).unwrap();
        g.add_instance_link(b, c, OffsetExpr::at(0)).unwrap();

        g.merge_nodes(&[a, b]);

        assert!(g.is_live(a));
        assert!(!g.is_live(b));
        assert_eq!(g.node(a).size, 8);
        assert_eq!(g.node(a).successors.len(), 1);
        assert_eq!(g.node(c).predecessors.len(), 1);
        assert!(g.node(c).predecessors.contains(&(
            a,
            g.node(a).successors.iter().next().unwrap().1
        )));
        assert!(g.eq_classes().same_class(a.raw(), b.raw()));
        assert_mirrored(&g);
        assert!(g.check_integrity().is_ok());
    }

    #[test]
    fn merge_strips_links_between_merged_nodes() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        let c = g.create_node();
        g.add_inheritance_link(b, a).unwrap();
        g.add_instance_link(b, c, OffsetExpr::at(16)).unwrap();

        g.merge_nodes(&[a, b]);

        // The direct B -> A edge must not survive as a self edge.
        let survivor = g.node(a);
        assert!(survivor.successors.iter().all(|&(n, _)| n != a));
        assert!(survivor.predecessors.iter().all(|&(n, _)| n != a));
        // B's edge to C now originates from A.
        assert_eq!(survivor.successors.len(), 1);
        assert!(g.node(c).predecessors.iter().any(|&(n, _)| n == a));
        assert_mirrored(&g);
    }

    #[test]
    fn merge_repoints_third_party_edges() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        let outsider = g.create_node();
        g.add_instance_link(outsider, b, OffsetExpr::at(24)).unwrap();

        g.merge_nodes(&[a, b]);

        assert!(g.node(outsider).successors.iter().any(|&(n, _)| n == a));
        assert!(g.node(outsider).successors.iter().all(|&(n, _)| n != b));
        assert_mirrored(&g);
    }

    #[test]
    fn merge_resets_interference() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        g.set_interfering(a, InterferingInfo::AllChildrenNonInterfering);
        g.merge_nodes(&[a, b]);
        assert_eq!(g.node(a).interfering, InterferingInfo::Unknown);
    }

    #[test]
    #[should_panic(expected = "merge would shrink")]
    fn merge_shrinking_size_panics() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        g.set_size(a, 16);
        g.set_size(b, 8);
        g.merge_nodes(&[a, b]);
    }

    #[test]
    #[should_panic(expected = "at least two nodes")]
    fn merge_of_single_node_panics() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        g.merge_nodes(&[a]);
    }

    #[test]
    fn remove_erases_mirrors_and_tombstones() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        let c = g.create_node();
        g.add_instance_link(a, b, OffsetExpr::at(0)).unwrap();
        g.add_pointer_link(c, a).unwrap();

        g.remove_node(a);

        assert!(!g.is_live(a));
        assert!(g.node(b).predecessors.is_empty());
        assert!(g.node(c).successors.is_empty());
        assert!(g.eq_classes().is_removed(a.raw()));
        assert_eq!(g.node_count(), 2);
        assert_mirrored(&g);

        // Removal must still be visible after compression.
        g.eq_classes_mut().compress();
        assert!(g.eq_classes().is_removed(a.raw()));
        assert_eq!(g.eq_classes().class_id(a.raw()), None);
    }

    #[test]
    #[should_panic(expected = "is not live")]
    fn removing_dead_node_panics() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        g.remove_node(a);
        g.remove_node(a);
    }

    #[test]
    fn move_edge_without_offset_keeps_tag() {
        let mut g = LayoutGraph::new();
        let old_src = g.create_node();
        let new_src = g.create_node();
        let tgt = g.create_node();
        let (tag, _) = g
            .add_instance_link(old_src, tgt, OffsetExpr::at(8))
            .unwrap();

        g.move_edge(old_src, new_src, (tgt, tag), 0);

        assert!(g.node(old_src).successors.is_empty());
        assert!(g.node(new_src).successors.contains(&(tgt, tag)));
        assert!(g.node(tgt).predecessors.contains(&(new_src, tag)));
        assert!(!g.node(tgt).predecessors.contains(&(old_src, tag)));
        assert_mirrored(&g);
    }

    #[test]
    fn move_edge_rebases_instance_offset() {
        let mut g = LayoutGraph::new();
        let old_src = g.create_node();
        let new_src = g.create_node();
        let tgt = g.create_node();
        let (tag, _) = g
            .add_instance_link(old_src, tgt, OffsetExpr::at(8))
            .unwrap();

        g.move_edge(old_src, new_src, (tgt, tag), 12);

        assert!(g.node(old_src).successors.is_empty());
        let (nbr, moved) = g.successors(new_src).next().unwrap();
        assert_eq!(nbr, tgt);
        assert_eq!(moved.offset_expr().offset, 20);
        assert_mirrored(&g);
    }

    #[test]
    fn move_edge_promotes_inheritance_to_instance() {
        let mut g = LayoutGraph::new();
        let old_src = g.create_node();
        let new_src = g.create_node();
        let tgt = g.create_node();
        let (tag, _) = g.add_inheritance_link(old_src, tgt).unwrap();

        g.move_edge(old_src, new_src, (tgt, tag), 4);

        let (_, moved) = g.successors(new_src).next().unwrap();
        assert_eq!(moved.kind(), TagKind::Instance);
        assert_eq!(moved.offset_expr().offset, 4);
        assert_mirrored(&g);
    }

    #[test]
    fn move_edge_keeps_inheritance_for_nonpositive_offset() {
        let mut g = LayoutGraph::new();
        let old_src = g.create_node();
        let new_src = g.create_node();
        let tgt = g.create_node();
        let (tag, _) = g.add_inheritance_link(old_src, tgt).unwrap();

        g.move_edge(old_src, new_src, (tgt, tag), -4);

        let (_, moved) = g.successors(new_src).next().unwrap();
        assert_eq!(moved.kind(), TagKind::Inheritance);
    }

    #[test]
    #[should_panic(expected = "negative")]
    fn move_edge_negative_result_panics() {
        let mut g = LayoutGraph::new();
        let old_src = g.create_node();
        let new_src = g.create_node();
        let tgt = g.create_node();
        let (tag, _) = g
            .add_instance_link(old_src, tgt, OffsetExpr::at(4))
            .unwrap();
        g.move_edge(old_src, new_src, (tgt, tag), -8);
    }

    #[test]
    #[should_panic(expected = "never be offset-rebased")]
    fn move_edge_on_pointer_panics() {
        let mut g = LayoutGraph::new();
        let old_src = g.create_node();
        let new_src = g.create_node();
        let tgt = g.create_node();
        let (tag, _) = g.add_pointer_link(old_src, tgt).unwrap();
        g.move_edge(old_src, new_src, (tgt, tag), 8);
    }

    #[test]
    fn move_edge_onto_target_drops_edge() {
        let mut g = LayoutGraph::new();
        let old_src = g.create_node();
        let tgt = g.create_node();
        let (tag, _) = g
            .add_instance_link(old_src, tgt, OffsetExpr::at(0))
            .unwrap();

        g.move_edge(old_src, tgt, (tgt, tag), 8);

        assert!(g.node(old_src).successors.is_empty());
        assert!(g.node(tgt).successors.is_empty());
        assert!(g.node(tgt).predecessors.is_empty());
        assert_mirrored(&g);
    }

    #[test]
    fn serde_round_trip_preserves_interning() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        let c = g.create_node();
        g.set_size(b, 8);
        let (tag, _) = g.add_instance_link(a, b, OffsetExpr::at(8)).unwrap();
        g.add_pointer_link(b, c).unwrap();
        g.remove_node(c);

        let json = serde_json::to_string(&g).unwrap();
        let mut restored: LayoutGraph = serde_json::from_str(&json).unwrap();
        assert!(restored.check_integrity().is_ok());
        assert_eq!(restored.node_count(), 2);
        assert!(restored.eq_classes().is_removed(c.raw()));

        // The rebuilt intern table must keep handing out the same handle.
        let (tag2, new) = restored.add_instance_link(a, b, OffsetExpr::at(8)).unwrap();
        assert_eq!(tag, tag2);
        assert!(!new);
    }
}
