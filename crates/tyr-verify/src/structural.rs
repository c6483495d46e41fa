//! The verification battery: whole-graph consistency checks.
//!
//! Each check is a read-only predicate intended to run between
//! simplification steps, catching a broken invariant right after the
//! mutation that introduced it. A failure means a bug in mutation code, not
//! a data problem; in strict mode a failing check panics so the offending
//! step is localized immediately.

use std::fmt;

use tracing::warn;

use tyr_core::{EdgeFilter, InterferingInfo, LayoutGraph, TagKind};

use crate::scc::has_cycle;

/// Names of the individual checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Consistency,
    Dag,
    InheritanceDag,
    InstanceDag,
    PointerDag,
    InstanceOff0Dag,
    InheritanceTree,
    NoEquality,
    Leafs,
    Unions,
    Conflicts,
}

impl Check {
    /// Every check, in the order [`Verifier::report`] runs them.
    pub fn all() -> &'static [Check] {
        &[
            Check::Consistency,
            Check::InheritanceDag,
            Check::InstanceDag,
            Check::PointerDag,
            Check::InstanceOff0Dag,
            Check::Dag,
            Check::InheritanceTree,
            Check::NoEquality,
            Check::Leafs,
            Check::Unions,
            Check::Conflicts,
        ]
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Check::Consistency => "consistency",
            Check::Dag => "dag",
            Check::InheritanceDag => "inheritance-dag",
            Check::InstanceDag => "instance-dag",
            Check::PointerDag => "pointer-dag",
            Check::InstanceOff0Dag => "instance-off0-dag",
            Check::InheritanceTree => "inheritance-tree",
            Check::NoEquality => "no-equality",
            Check::Leafs => "leafs",
            Check::Unions => "unions",
            Check::Conflicts => "conflicts",
        };
        write!(f, "{name}")
    }
}

/// A failed check, with context for whoever broke it.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub check: Check,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.check, self.message)
    }
}

/// Runs the verification battery.
///
/// In strict mode any failing check panics instead of returning `false`,
/// turning a silent corruption into an abort at the mutation that caused it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier {
    strict: bool,
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }

    fn fail(&self, check: Check, message: &str) -> bool {
        if self.strict {
            panic!("{check} check failed: {message}");
        }
        warn!(%check, message, "verification failed");
        false
    }

    /// Adjacency is mirrored, neighbors are live, there are no self edges,
    /// and no node is both a pointer and an aggregate (a node with a pointer
    /// successor must have no inheritance or instance successors).
    pub fn consistency(&self, g: &LayoutGraph) -> bool {
        for node in g.nodes() {
            for &(nbr, tag) in &node.predecessors {
                if !g.is_live(nbr) {
                    return self.fail(
                        Check::Consistency,
                        &format!("{} has dead predecessor {nbr}", node.id),
                    );
                }
                if !g.node(nbr).successors.contains(&(node.id, tag)) {
                    return self.fail(
                        Check::Consistency,
                        &format!("predecessor {nbr} of {} lacks the mirror link", node.id),
                    );
                }
            }
            for &(nbr, tag) in &node.successors {
                if !g.is_live(nbr) {
                    return self.fail(
                        Check::Consistency,
                        &format!("{} has dead successor {nbr}", node.id),
                    );
                }
                if !g.node(nbr).predecessors.contains(&(node.id, tag)) {
                    return self.fail(
                        Check::Consistency,
                        &format!("successor {nbr} of {} lacks the mirror link", node.id),
                    );
                }
            }

            if node.successors.iter().any(|&(nbr, _)| nbr == node.id)
                || node.predecessors.iter().any(|&(nbr, _)| nbr == node.id)
            {
                return self.fail(Check::Consistency, &format!("{} has a self edge", node.id));
            }

            let mut is_pointer = false;
            let mut aggregate_children = 0usize;
            for (_, tag) in g.successors(node.id) {
                match tag.kind() {
                    TagKind::Pointer => is_pointer = true,
                    TagKind::Inheritance | TagKind::Instance => aggregate_children += 1,
                    TagKind::Equality => {}
                }
                if is_pointer && aggregate_children > 0 {
                    return self.fail(
                        Check::Consistency,
                        &format!("{} is both a pointer and an aggregate", node.id),
                    );
                }
            }
        }
        true
    }

    fn acyclic(&self, g: &LayoutGraph, filter: EdgeFilter, check: Check) -> bool {
        if !self.consistency(g) {
            return false;
        }
        if has_cycle(g, filter) {
            return self.fail(check, &format!("cycle through {filter} edges"));
        }
        true
    }

    /// The subgraph of inheritance edges is a DAG.
    pub fn inheritance_dag(&self, g: &LayoutGraph) -> bool {
        self.acyclic(g, EdgeFilter::Inheritance, Check::InheritanceDag)
    }

    /// The subgraph of instance edges is a DAG.
    pub fn instance_dag(&self, g: &LayoutGraph) -> bool {
        self.acyclic(g, EdgeFilter::Instance, Check::InstanceDag)
    }

    /// The subgraph of pointer edges is a DAG.
    pub fn pointer_dag(&self, g: &LayoutGraph) -> bool {
        self.acyclic(g, EdgeFilter::Pointer, Check::PointerDag)
    }

    /// The pure nesting sub-relation (instance at offset zero, no array
    /// dimensions) is a DAG.
    pub fn instance_off0_dag(&self, g: &LayoutGraph) -> bool {
        self.acyclic(g, EdgeFilter::InstanceOff0, Check::InstanceOff0Dag)
    }

    /// The whole graph minus pointer edges is a DAG. Pointer edges are
    /// exempt because pointee cycles (recursive types) are legitimate.
    pub fn dag(&self, g: &LayoutGraph) -> bool {
        if !self.inheritance_dag(g) || !self.instance_dag(g) {
            return false;
        }
        self.acyclic(g, EdgeFilter::NotPointer, Check::Dag)
    }

    /// Multiple inheritance is forbidden: at most one outgoing inheritance
    /// edge per node.
    pub fn inheritance_tree(&self, g: &LayoutGraph) -> bool {
        for id in g.node_ids() {
            if g.successors_matching(id, EdgeFilter::Inheritance).count() > 1 {
                return self.fail(
                    Check::InheritanceTree,
                    &format!("{id} inherits from more than one node"),
                );
            }
        }
        true
    }

    /// No equality edges remain. Meaningful once every equality class has
    /// been merged away.
    pub fn no_equality(&self, g: &LayoutGraph) -> bool {
        if !self.consistency(g) {
            return false;
        }
        for id in g.node_ids() {
            if g.successors_matching(id, EdgeFilter::Equality).next().is_some() {
                return self.fail(Check::NoEquality, &format!("{id} has an equality edge"));
            }
        }
        true
    }

    /// A node with no outgoing edges is a finished layout and must have a
    /// known, nonzero size.
    pub fn leafs(&self, g: &LayoutGraph) -> bool {
        for node in g.nodes() {
            if node.is_sink() && node.size == 0 {
                return self.fail(Check::Leafs, &format!("leaf {} has size 0", node.id));
            }
        }
        true
    }

    /// A union of one member is meaningless: interfering nodes need more
    /// than one successor.
    pub fn unions(&self, g: &LayoutGraph) -> bool {
        for node in g.nodes() {
            if node.interfering == InterferingInfo::AllChildrenInterfering
                && node.successors.len() <= 1
            {
                return self.fail(
                    Check::Unions,
                    &format!("union {} has {} member(s)", node.id, node.successors.len()),
                );
            }
        }
        true
    }

    /// No node relates to the same target both by inheritance and by an
    /// instance at offset zero; those are two contradictory claims about the
    /// same position.
    pub fn conflicts(&self, g: &LayoutGraph) -> bool {
        for id in g.node_ids() {
            for target in g.successors_matching(id, EdgeFilter::Inheritance) {
                let nested_at_zero = g
                    .successors_matching(id, EdgeFilter::InstanceOff0)
                    .any(|other| other == target);
                if nested_at_zero {
                    return self.fail(
                        Check::Conflicts,
                        &format!("{id} both inherits from and nests {target} at offset 0"),
                    );
                }
            }
        }
        true
    }

    fn run(&self, check: Check, g: &LayoutGraph) -> bool {
        match check {
            Check::Consistency => self.consistency(g),
            Check::Dag => self.dag(g),
            Check::InheritanceDag => self.inheritance_dag(g),
            Check::InstanceDag => self.instance_dag(g),
            Check::PointerDag => self.pointer_dag(g),
            Check::InstanceOff0Dag => self.instance_off0_dag(g),
            Check::InheritanceTree => self.inheritance_tree(g),
            Check::NoEquality => self.no_equality(g),
            Check::Leafs => self.leafs(g),
            Check::Unions => self.unions(g),
            Check::Conflicts => self.conflicts(g),
        }
    }

    /// Run the whole battery and collect a diagnostic per failing check.
    ///
    /// In strict mode this panics at the first failure instead.
    pub fn report(&self, g: &LayoutGraph) -> Vec<Diagnostic> {
        Check::all()
            .iter()
            .filter(|&&check| !self.run(check, g))
            .map(|&check| Diagnostic {
                check,
                message: format!("{check} check failed"),
            })
            .collect()
    }
}
