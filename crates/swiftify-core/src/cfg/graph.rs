//! The control-flow graph data structure itself (§3.3).
//!
//! Represented with `petgraph::stable_graph::StableDiGraph`, so that node
//! removal during `prune`/`expand_subgraphs` (§4.3) does not invalidate
//! other nodes' indices (§10.6).

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// Identifies one statement occurrence within a method/accessor body's
/// nested `Vec<Statement>` tree by the index path needed to reach it —
/// this is the CFG's notion of "reference identity" to a Swift AST node
/// (§3.3) since the AST itself is plain owned data, not an arena.
pub type StmtLoc = Vec<u32>;

#[derive(Debug, Clone)]
pub enum CfgNode {
    Entry,
    Exit,
    /// A statement this path resolves to, including control-flow
    /// "header" statements (`if`/`switch`/loop) which get one node for
    /// their own condition/discriminant evaluation.
    Statement(StmtLoc),
    /// A control-flow join point synthesised by the builder (if-merge,
    /// switch-merge, loop join); carries no direct AST counterpart.
    Merge,
    /// Marks the scope boundary one or more local variables leave
    /// (§3.3 "End-of-scope marker nodes").
    EndOfScope(Vec<String>),
    /// An embedded, complete inner CFG (§3.3, §4.3 "expand-subgraphs").
    Subgraph(Box<Cfg>),
}

#[derive(Debug, Clone, Default)]
pub struct CfgEdge {
    pub back_edge: bool,
    pub label: Option<String>,
}

impl CfgEdge {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self { back_edge: false, label: Some(label.into()) }
    }

    pub fn back(label: impl Into<String>) -> Self {
        Self { back_edge: true, label: Some(label.into()) }
    }
}

/// A directed graph with exactly one `entry` and one `exit` node
/// (§3.3, §8 "CFG well-formedness").
#[derive(Debug, Clone)]
pub struct Cfg {
    pub(crate) graph: StableDiGraph<CfgNode, CfgEdge>,
    pub(crate) entry: NodeIndex,
    pub(crate) exit: NodeIndex,
}

impl Cfg {
    /// An empty two-node graph (`entry` directly wired to `exit`), the
    /// starting point every builder begins from.
    pub fn empty() -> Self {
        let mut graph = StableDiGraph::new();
        let entry = graph.add_node(CfgNode::Entry);
        let exit = graph.add_node(CfgNode::Exit);
        Self { graph, entry, exit }
    }

    pub fn entry(&self) -> NodeIndex {
        self.entry
    }

    pub fn exit(&self) -> NodeIndex {
        self.exit
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&CfgNode> {
        self.graph.node_weight(idx)
    }

    pub fn add_node(&mut self, node: CfgNode) -> NodeIndex {
        self.graph.add_node(node)
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: CfgEdge) {
        debug_assert!(
            self.graph.node_weight(from).is_some() && self.graph.node_weight(to).is_some(),
            "adding an edge across graphs is a structural violation (§7 category 3)"
        );
        self.graph.add_edge(from, to, edge);
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn successors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Outgoing)
    }

    pub fn predecessors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Incoming)
    }

    pub fn out_edges(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, &CfgEdge)> + '_ {
        self.graph.edges_directed(idx, Direction::Outgoing).map(|e| (e.target(), e.weight()))
    }

    pub fn in_edges(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, &CfgEdge)> + '_ {
        self.graph.edges_directed(idx, Direction::Incoming).map(|e| (e.source(), e.weight()))
    }

    /// Well-formedness check (§8): exit has no outgoing edges, entry has
    /// no incoming edges, and both are present in the graph.
    pub fn is_well_formed(&self) -> bool {
        self.graph.node_weight(self.entry).is_some()
            && self.graph.node_weight(self.exit).is_some()
            && self.graph.edges_directed(self.exit, Direction::Outgoing).next().is_none()
            && self.graph.edges_directed(self.entry, Direction::Incoming).next().is_none()
    }

    /// Shallow copy: a fresh `Cfg` value sharing no mutable state with
    /// `self` (petgraph's `StableDiGraph` is itself plain owned data, so
    /// a `Clone` already duplicates storage; "shallow" here means the
    /// embedded `Subgraph` boxes are cloned by value too, which is cheap
    /// relative to re-running the builder). Use this for read-only
    /// iteration where mutation of the copy must not observably affect
    /// the original.
    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }

    /// Deep copy: structurally duplicates every edge while preserving
    /// the identity (index) of `entry`/`exit` relative to the copy,
    /// i.e. `cfg.deep_copy().entry() == cfg.entry()` (§3.3 "Copy
    /// semantics", §8 round-trip "`cfg.copy().deepCopy()` is
    /// structurally equal to `cfg`").
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }
}

impl PartialEq for Cfg {
    fn eq(&self, other: &Self) -> bool {
        if self.entry != other.entry || self.exit != other.exit {
            return false;
        }
        if self.graph.node_count() != other.graph.node_count()
            || self.graph.edge_count() != other.graph.edge_count()
        {
            return false;
        }
        let mut self_nodes: Vec<_> = self.graph.node_indices().collect();
        let mut other_nodes: Vec<_> = other.graph.node_indices().collect();
        self_nodes.sort();
        other_nodes.sort();
        if self_nodes != other_nodes {
            return false;
        }
        for idx in self_nodes {
            let mut a: Vec<_> =
                self.graph.neighbors_directed(idx, Direction::Outgoing).collect();
            let mut b: Vec<_> =
                other.graph.neighbors_directed(idx, Direction::Outgoing).collect();
            a.sort();
            b.sort();
            if a != b {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_is_well_formed() {
        let cfg = Cfg::empty();
        assert!(cfg.is_well_formed());
        assert_eq!(cfg.node_count(), 2);
    }

    #[test]
    fn deep_copy_is_structurally_equal() {
        let mut cfg = Cfg::empty();
        let mid = cfg.add_node(CfgNode::Statement(vec![0]));
        cfg.add_edge(cfg.entry(), mid, CfgEdge::plain());
        cfg.add_edge(mid, cfg.exit(), CfgEdge::plain());

        let copy = cfg.shallow_copy().deep_copy();
        assert_eq!(cfg, copy);
    }
}
