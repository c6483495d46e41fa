//! Strongly connected components over an edge-filtered view of the graph.
//!
//! A kind-restricted subgraph is a DAG if and only if every strongly
//! connected component has size 1. Self loops cannot exist in a layout
//! graph, so any component larger than one node is a cycle.

use tyr_core::{EdgeFilter, LayoutGraph, NodeId};

/// Tarjan's algorithm, iterative to stay safe on deep graphs.
///
/// Returns the components of the subgraph restricted to links matching
/// `filter`, in reverse topological order of discovery.
pub fn sccs(g: &LayoutGraph, filter: EdgeFilter) -> Vec<Vec<NodeId>> {
    let cap = g.next_node_id() as usize;
    let mut index: Vec<Option<u32>> = vec![None; cap];
    let mut lowlink: Vec<u32> = vec![0; cap];
    let mut on_stack: Vec<bool> = vec![false; cap];
    let mut stack: Vec<NodeId> = Vec::new();
    let mut next_index = 0u32;
    let mut components = Vec::new();

    // One frame per node on the DFS path: (node, children, next child).
    let mut frames: Vec<(NodeId, Vec<NodeId>, usize)> = Vec::new();

    for root in g.node_ids() {
        if index[root.index()].is_some() {
            continue;
        }

        let mut visit = |v: NodeId,
                         next_index: &mut u32,
                         index: &mut Vec<Option<u32>>,
                         lowlink: &mut Vec<u32>,
                         on_stack: &mut Vec<bool>,
                         stack: &mut Vec<NodeId>| {
            index[v.index()] = Some(*next_index);
            lowlink[v.index()] = *next_index;
            *next_index += 1;
            on_stack[v.index()] = true;
            stack.push(v);
            g.successors_matching(v, filter).collect::<Vec<_>>()
        };

        let children = visit(
            root,
            &mut next_index,
            &mut index,
            &mut lowlink,
            &mut on_stack,
            &mut stack,
        );
        frames.push((root, children, 0));

        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            if frame.2 < frame.1.len() {
                let w = frame.1[frame.2];
                frame.2 += 1;
                match index[w.index()] {
                    None => {
                        let children = visit(
                            w,
                            &mut next_index,
                            &mut index,
                            &mut lowlink,
                            &mut on_stack,
                            &mut stack,
                        );
                        frames.push((w, children, 0));
                    }
                    Some(w_index) if on_stack[w.index()] => {
                        lowlink[v.index()] = lowlink[v.index()].min(w_index);
                    }
                    Some(_) => {}
                }
            } else {
                frames.pop();
                if lowlink[v.index()] == index[v.index()].expect("visited") {
                    let mut component = Vec::new();
                    loop {
                        let w = stack.pop().expect("component member on stack");
                        on_stack[w.index()] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    components.push(component);
                }
                if let Some(parent) = frames.last() {
                    let p = parent.0.index();
                    lowlink[p] = lowlink[p].min(lowlink[v.index()]);
                }
            }
        }
    }

    components
}

/// True if the `filter`-restricted subgraph contains a cycle.
pub fn has_cycle(g: &LayoutGraph, filter: EdgeFilter) -> bool {
    sccs(g, filter).iter().any(|component| component.len() > 1)
}
