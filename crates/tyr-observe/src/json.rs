//! Flat JSON dump of a layout type graph for external tooling.
//!
//! Unlike the graph's own serde representation (which round-trips the full
//! arena), this is a plain node list and edge list, convenient to load into
//! ad-hoc analysis scripts.

use serde::Serialize;

use tyr_core::{InterferingInfo, LayoutGraph, TagKind};

use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct NodeRecord {
    pub id: u32,
    pub size: u64,
    pub interfering: InterferingInfo,
    pub eq_class: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct EdgeRecord {
    pub source: u32,
    pub target: u32,
    pub kind: TagKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strides: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trip_counts: Vec<Option<u64>>,
}

#[derive(Debug, Serialize)]
pub struct GraphDump {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl GraphDump {
    pub fn from_graph(g: &LayoutGraph) -> Self {
        let nodes = g
            .nodes()
            .map(|node| NodeRecord {
                id: node.id.raw(),
                size: node.size,
                interfering: node.interfering,
                eq_class: g.eq_classes().members(node.id.raw()),
            })
            .collect();

        let mut edges = Vec::new();
        for node in g.nodes() {
            for (target, tag) in g.successors(node.id) {
                let (offset, strides, trip_counts) = if tag.kind() == TagKind::Instance {
                    let oe = tag.offset_expr();
                    (
                        Some(oe.offset),
                        oe.strides.to_vec(),
                        oe.trip_counts.to_vec(),
                    )
                } else {
                    (None, Vec::new(), Vec::new())
                };
                edges.push(EdgeRecord {
                    source: node.id.raw(),
                    target: target.raw(),
                    kind: tag.kind(),
                    offset,
                    strides,
                    trip_counts,
                });
            }
        }

        Self { nodes, edges }
    }
}

/// Serialize the dump as pretty-printed JSON.
pub fn dump_json(g: &LayoutGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&GraphDump::from_graph(g))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyr_core::OffsetExpr;

    #[test]
    fn dump_lists_nodes_and_edges() {
        let mut g = LayoutGraph::new();
        let a = g.create_node();
        let b = g.create_node();
        g.add_instance_link(a, b, OffsetExpr::at(8).with_dimension(4, None))
            .unwrap();

        let dump = GraphDump::from_graph(&g);
        assert_eq!(dump.nodes.len(), 2);
        assert_eq!(dump.edges.len(), 1);
        assert_eq!(dump.edges[0].offset, Some(8));
        assert_eq!(dump.edges[0].strides, vec![4]);

        let json = dump_json(&g).unwrap();
        assert!(json.contains("\"kind\": \"Instance\""));
    }
}
