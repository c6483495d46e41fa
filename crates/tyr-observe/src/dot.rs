//! Graphviz export of a layout type graph.
//!
//! Nodes are rectangles labeled with id, size, and the interference letter;
//! edges are colored by kind. An optional annotation callback appends extra
//! per-node text, so callers can decorate nodes with whatever their pipeline
//! tracks without this crate knowing about it.

use std::io::Write;

use tyr_core::{InterferingInfo, LayoutGraph, LayoutNode, TagKind};

use crate::error::Result;

/// Per-node annotation callback for [`write_dot`].
pub type NodeAnnotator<'a> = &'a dyn Fn(&LayoutGraph, &LayoutNode) -> String;

fn interference_letter(info: InterferingInfo) -> char {
    match info {
        InterferingInfo::Unknown => 'U',
        InterferingInfo::AllChildrenInterfering => 'A',
        InterferingInfo::AllChildrenNonInterfering => 'N',
    }
}

/// Write the whole graph in dot format.
///
/// `annotate`, if given, is invoked once per node and its output appended to
/// the node label. Labels use graphviz's `\l` left-justified line breaks.
pub fn write_dot<W: Write>(
    g: &LayoutGraph,
    out: &mut W,
    annotate: Option<NodeAnnotator<'_>>,
) -> Result<()> {
    writeln!(out, "digraph LayoutTypeGraph {{")?;
    writeln!(out, "  // List of nodes")?;

    for node in g.nodes() {
        write!(
            out,
            "  node_{} [shape=rect,label=\"NODE {} Size: {} Interfering: {}",
            node.id.raw(),
            node.id,
            node.size,
            interference_letter(node.interfering),
        )?;
        if let Some(annotate) = annotate {
            write!(out, "\\l{}", annotate(g, node))?;
        }
        writeln!(out, "\"];")?;
    }

    writeln!(out, "  // List of edges")?;

    for node in g.nodes() {
        for (target, tag) in g.successors(node.id) {
            let (label, color, style) = match tag.kind() {
                TagKind::Equality => ("Equal".to_string(), "green", ""),
                TagKind::Inheritance => ("Inherits from".to_string(), "orange", ""),
                TagKind::Instance => (
                    format!("Has instance of: {}", tag.offset_expr()),
                    "blue",
                    "",
                ),
                TagKind::Pointer => ("Points to".to_string(), "purple", ",style=dashed"),
            };
            writeln!(
                out,
                "  node_{} -> node_{} [label=\"{label}\",color={color}{style}];",
                node.id.raw(),
                target.raw(),
            )?;
        }
    }

    writeln!(out, "}}")?;
    Ok(())
}

/// Ready-made annotator printing a node's equivalence class and whether its
/// identifier has been tombstoned.
pub fn eq_class_annotator(g: &LayoutGraph, node: &LayoutNode) -> String {
    let eq = g.eq_classes();
    let members = eq
        .members(node.id.raw())
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if eq.is_removed(node.id.raw()) {
        format!("Removed\\lEq class: [{members}]")
    } else {
        format!("Eq class: [{members}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyr_core::OffsetExpr;

    fn sample_graph() -> LayoutGraph {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        let c = g.create_node();
        g.set_size(b, 8);
        g.add_instance_link(a, b, OffsetExpr::at(16)).unwrap();
        g.add_pointer_link(b, c).unwrap();
        g.add_inheritance_link(c, a).unwrap();
        g
    }

    fn render(g: &LayoutGraph, annotate: Option<NodeAnnotator<'_>>) -> String {
        let mut buf = Vec::new();
        write_dot(g, &mut buf, annotate).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn edges_are_styled_by_kind() {
        let out = render(&sample_graph(), None);
        assert!(out.contains("digraph LayoutTypeGraph"));
        assert!(out.contains("Has instance of: Off: 16"));
        assert!(out.contains("color=blue"));
        assert!(out.contains("color=purple,style=dashed"));
        assert!(out.contains("color=orange"));
    }

    #[test]
    fn node_labels_carry_size_and_interference() {
        let out = render(&sample_graph(), None);
        assert!(out.contains("Size: 8 Interfering: U"));
    }

    #[test]
    fn annotator_output_is_appended() {
        let g = sample_graph();
        let out = render(&g, Some(&eq_class_annotator));
        assert!(out.contains("Eq class: [0]"));
    }
}
