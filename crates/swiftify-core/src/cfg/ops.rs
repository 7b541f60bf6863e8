//! CFG operations performed after construction (§4.3): back-edge
//! detection, dead-code pruning, and subgraph expansion.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::NodeIndex;

use crate::cfg::graph::{Cfg, CfgEdge, CfgNode};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Classifies every edge as a back edge or not via DFS (an edge is a
/// back edge iff it targets a node still on the current DFS recursion
/// stack), independent of whatever the builder tagged at construction
/// time (§10.6 "recomputable").
pub fn mark_back_edges(cfg: &mut Cfg) {
    let mut color: HashMap<NodeIndex, Color> =
        cfg.node_indices().map(|n| (n, Color::White)).collect();
    let mut back_edges: Vec<(NodeIndex, NodeIndex)> = Vec::new();

    let all_nodes: Vec<NodeIndex> = cfg.node_indices().collect();
    for start in all_nodes {
        if color[&start] != Color::White {
            continue;
        }
        let mut stack: Vec<(NodeIndex, std::vec::IntoIter<NodeIndex>)> = Vec::new();
        color.insert(start, Color::Gray);
        stack.push((start, cfg.successors(start).collect::<Vec<_>>().into_iter()));

        while let Some((node, iter)) = stack.last_mut() {
            if let Some(next) = iter.next() {
                match color[&next] {
                    Color::White => {
                        color.insert(next, Color::Gray);
                        let succs: Vec<NodeIndex> = cfg.successors(next).collect();
                        stack.push((next, succs.into_iter()));
                    }
                    Color::Gray => back_edges.push((*node, next)),
                    Color::Black => {}
                }
            } else {
                color.insert(*node, Color::Black);
                stack.pop();
            }
        }
    }

    for (from, to) in back_edges {
        if let Some(edge_idx) = cfg.graph.find_edge(from, to) {
            if let Some(weight) = cfg.graph.edge_weight_mut(edge_idx) {
                weight.back_edge = true;
            }
        }
    }
}

/// Removes every node unreachable from `entry` (§4.4 item 6, "CFG-based
/// dead-code elimination"). `entry` and `exit` are always kept, even if
/// `exit` turns out unreachable (e.g. a body that loops forever with no
/// `break`) — they're structural anchors, not statement nodes.
pub fn prune(mut cfg: Cfg) -> Cfg {
    let mut reachable: HashSet<NodeIndex> = HashSet::new();
    let mut stack = vec![cfg.entry()];
    reachable.insert(cfg.entry());
    while let Some(node) = stack.pop() {
        for succ in cfg.successors(node).collect::<Vec<_>>() {
            if reachable.insert(succ) {
                stack.push(succ);
            }
        }
    }
    reachable.insert(cfg.exit());

    let dead: Vec<NodeIndex> = cfg.node_indices().filter(|n| !reachable.contains(n)).collect();
    for node in dead {
        cfg.graph.remove_node(node);
    }
    cfg
}

/// Replaces every [`CfgNode::Subgraph`] with its inner graph's nodes and
/// edges (§4.3 "expand subgraphs"). The inner graph's own `entry`/`exit`
/// are bookkeeping for the inner build, not statements of their own, so
/// they're elided rather than spliced in: for every predecessor of the
/// subgraph node and every successor of the inner entry, a direct edge
/// is added between them (inheriting the inner edge's `back_edge` flag
/// and label), and symmetrically for the subgraph's successors against
/// the inner exit's predecessors. An inner graph that is itself just
/// `entry -> exit` (no statements at all) degenerates to wiring the
/// subgraph's predecessors straight to its successors. Runs to a fixed
/// point since an inner graph may itself contain further `Subgraph`
/// nodes (nested local functions).
pub fn expand_subgraphs(mut cfg: Cfg) -> Cfg {
    loop {
        let node = cfg.node_indices().find(|&n| matches!(cfg.node(n), Some(CfgNode::Subgraph(_))));
        let Some(node) = node else { break };

        let preds: Vec<(NodeIndex, CfgEdge)> = cfg.in_edges(node).map(|(n, e)| (n, e.clone())).collect();
        let succs: Vec<(NodeIndex, CfgEdge)> = cfg.out_edges(node).map(|(n, e)| (n, e.clone())).collect();

        let inner = match cfg.graph.remove_node(node) {
            Some(CfgNode::Subgraph(inner)) => *inner,
            _ => unreachable!("node was matched as Subgraph just above"),
        };

        let mut mapping: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        for inner_idx in inner.node_indices() {
            if inner_idx == inner.entry() || inner_idx == inner.exit() {
                continue;
            }
            let weight = inner.node(inner_idx).expect("valid inner node index").clone();
            mapping.insert(inner_idx, cfg.add_node(weight));
        }
        for inner_idx in inner.node_indices() {
            if inner_idx == inner.entry() || inner_idx == inner.exit() {
                continue;
            }
            for (target, edge) in inner.out_edges(inner_idx) {
                if target == inner.exit() {
                    continue; // rewired against the outer successors below
                }
                cfg.add_edge(mapping[&inner_idx], mapping[&target], edge.clone());
            }
        }

        for (pred, _) in &preds {
            for (target, inner_edge) in inner.out_edges(inner.entry()) {
                if target == inner.exit() {
                    // Empty inner body: entry flows straight to exit, so
                    // this predecessor connects straight to every successor.
                    for (succ, succ_edge) in &succs {
                        cfg.add_edge(*pred, *succ, succ_edge.clone());
                    }
                } else {
                    cfg.add_edge(*pred, mapping[&target], inner_edge.clone());
                }
            }
        }
        for (source, inner_edge) in inner.in_edges(inner.exit()) {
            if source == inner.entry() {
                continue; // handled by the empty-inner-body branch above
            }
            for (succ, _) in &succs {
                cfg.add_edge(mapping[&source], *succ, inner_edge.clone());
            }
        }
    }
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prune_drops_unreachable_orphan() {
        let mut cfg = Cfg::empty();
        let live = cfg.add_node(CfgNode::Statement(vec![0]));
        let orphan = cfg.add_node(CfgNode::Statement(vec![1]));
        cfg.add_edge(cfg.entry(), live, CfgEdge::plain());
        cfg.add_edge(live, cfg.exit(), CfgEdge::plain());
        let _ = orphan;

        let before = cfg.node_count();
        let pruned = prune(cfg);
        assert_eq!(pruned.node_count(), before - 1);
    }

    #[test]
    fn mark_back_edges_flags_a_self_loop() {
        let mut cfg = Cfg::empty();
        let header = cfg.add_node(CfgNode::Statement(vec![0]));
        cfg.add_edge(cfg.entry(), header, CfgEdge::plain());
        cfg.add_edge(header, header, CfgEdge::plain());
        cfg.add_edge(header, cfg.exit(), CfgEdge::plain());

        mark_back_edges(&mut cfg);
        let self_loop = cfg.out_edges(header).find(|(t, _)| *t == header).unwrap().1;
        assert!(self_loop.back_edge);
    }

    #[test]
    fn expand_subgraphs_splices_inner_nodes_and_removes_wrapper() {
        let mut inner = Cfg::empty();
        let inner_mid = inner.add_node(CfgNode::Statement(vec![99]));
        inner.add_edge(inner.entry(), inner_mid, CfgEdge::plain());
        inner.add_edge(inner_mid, inner.exit(), CfgEdge::plain());

        let mut outer = Cfg::empty();
        let before = outer.add_node(CfgNode::Statement(vec![0]));
        let wrapper = outer.add_node(CfgNode::Subgraph(Box::new(inner)));
        let after = outer.add_node(CfgNode::Statement(vec![1]));
        outer.add_edge(outer.entry(), before, CfgEdge::plain());
        outer.add_edge(before, wrapper, CfgEdge::plain());
        outer.add_edge(wrapper, after, CfgEdge::plain());
        outer.add_edge(after, outer.exit(), CfgEdge::plain());

        let expanded = expand_subgraphs(outer);
        assert!(!expanded.node_indices().any(|n| matches!(expanded.node(n), Some(CfgNode::Subgraph(_)))));
        // before -> inner_mid -> after is now one path; inner's own
        // entry/exit are elided, not spliced in as extra nodes.
        assert_eq!(expanded.node_count(), 5);
    }

    #[test]
    fn expand_subgraphs_wires_predecessors_straight_to_successors_for_an_empty_inner_body() {
        let inner = Cfg::empty();

        let mut outer = Cfg::empty();
        let before = outer.add_node(CfgNode::Statement(vec![0]));
        let wrapper = outer.add_node(CfgNode::Subgraph(Box::new(inner)));
        let after = outer.add_node(CfgNode::Statement(vec![1]));
        outer.add_edge(outer.entry(), before, CfgEdge::plain());
        outer.add_edge(before, wrapper, CfgEdge::plain());
        outer.add_edge(wrapper, after, CfgEdge::plain());
        outer.add_edge(after, outer.exit(), CfgEdge::plain());

        let expanded = expand_subgraphs(outer);
        assert_eq!(expanded.node_count(), 4);
        assert!(expanded.out_edges(before).any(|(t, _)| t == after));
    }
}
