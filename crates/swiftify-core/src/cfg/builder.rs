//! The CFG builder (§4.3): lowers a Swift `CompoundStatement` (here, a
//! plain `&[Statement]` body) into a [`Cfg`].
//!
//! Every non-entry/exit node corresponds to a Swift AST node by
//! reference identity (§3.3): the builder never manufactures a plain
//! join point for "where the `then` and `else` branches come back
//! together" the way a textbook CFG construction would. Instead it
//! builds statements in continuation-passing style — the node a
//! statement flows into when it completes (its `Cont`) is threaded in
//! from the caller, and a lookahead (`reserve_entry`) eagerly creates
//! the *next* statement's own node before the current (possibly
//! branching) statement is built, so every branch of an `if`/`switch`
//! and every loop's exit wires directly into the real next statement
//! instead of a synthetic intermediate.
//!
//! Jumps (`return`/`throw`/`break`/`continue`/`fallthrough`) are wired
//! directly to their targets as they're encountered, threaded through a
//! [`BuildCtx`] reader and a builder-local `defer_stack` so that every
//! exit from a scope with a pending `defer` first flows through the
//! deferred body (§4.3 "defer", §9 "Control-flow over deferred
//! actions").

use petgraph::stable_graph::NodeIndex;

use crate::ast::stmt::{Statement, StatementKind};
use crate::cfg::graph::{Cfg, CfgEdge, CfgNode, StmtLoc};

#[derive(Clone)]
struct BuildCtx {
    exit: NodeIndex,
    /// Target plus the `defer_stack` depth active when the construct
    /// that installed this target was entered — jumps route through
    /// every defer registered at or after that depth, and no further
    /// (outer defers haven't logically exited yet).
    break_target: Option<(NodeIndex, usize)>,
    continue_target: Option<(NodeIndex, usize)>,
    catch_target: Option<(NodeIndex, usize)>,
    fallthrough_target: Option<(NodeIndex, usize)>,
}

/// How a statement is entered: either it needs a fresh node wired in
/// from a live predecessor, or an ancestor already reserved (and will
/// wire in) the node this statement is meant to occupy.
#[derive(Clone, Copy)]
enum Entry {
    /// Create this statement's own node now and wire `pred -> node`,
    /// labeling the edge if given (used for `if`'s `then`/`else` and
    /// `switch`'s `case` divergence edges).
    Fresh(NodeIndex, Option<&'static str>),
    /// The node this statement occupies already exists (reserved ahead
    /// of time by `reserve_entry`); nothing more to wire in here.
    Reserved(NodeIndex),
}

/// Where a statement's own natural (non-jump) completion flows to, and
/// with what edge. Threading the edge alongside the node (rather than
/// always using a plain edge) lets a loop's body report its fallthrough
/// as the loop's own back edge without the builder needing to know,
/// statement by statement, that it's currently inside a loop.
#[derive(Clone)]
struct Cont {
    node: NodeIndex,
    edge: CfgEdge,
}

impl Cont {
    fn plain(node: NodeIndex) -> Self {
        Self { node, edge: CfgEdge::plain() }
    }
}

struct Builder {
    cfg: Cfg,
    defer_stack: Vec<(NodeIndex, NodeIndex)>,
}

fn child_loc(base: &[u32], idx: u32) -> StmtLoc {
    let mut v = base.to_vec();
    v.push(idx);
    v
}

impl Builder {
    fn add_stmt_node(&mut self, loc: StmtLoc) -> NodeIndex {
        self.cfg.add_node(CfgNode::Statement(loc))
    }

    /// Resolves `entry` to a concrete node, creating and wiring it in
    /// if it isn't already reserved.
    fn materialize(&mut self, loc: StmtLoc, entry: Entry) -> NodeIndex {
        match entry {
            Entry::Fresh(pred, label) => {
                let node = self.add_stmt_node(loc);
                let edge = label.map(CfgEdge::labeled).unwrap_or_default();
                self.cfg.add_edge(pred, node, edge);
                node
            }
            Entry::Reserved(node) => node,
        }
    }

    /// Finds (creating it if needed) the node that represents the first
    /// real statement reached when `stmt` is entered. `Compound`/`Do`
    /// contribute no node of their own (§3.3), so the search walks into
    /// their first body statement; an empty nested compound has nothing
    /// to reserve.
    fn reserve_entry(&mut self, stmt: &Statement, loc: &[u32]) -> Option<NodeIndex> {
        match &stmt.kind {
            StatementKind::Compound(stmts) => {
                let first = stmts.first()?;
                self.reserve_entry(first, &child_loc(loc, 0))
            }
            StatementKind::Do { body, .. } => self.reserve_entry(body, &child_loc(loc, 0)),
            _ => Some(self.add_stmt_node(loc.to_vec())),
        }
    }

    fn reserve_block_entry(&mut self, stmts: &[Statement], base_loc: &[u32]) -> Option<NodeIndex> {
        let first = stmts.first()?;
        self.reserve_entry(first, &child_loc(base_loc, 0))
    }

    /// Wires `origin` through every pending defer at or after `floor`
    /// (innermost first), finally to `target`.
    fn route_jump(&mut self, origin: NodeIndex, target: NodeIndex, floor: usize, label: &str) {
        let current = self.flush_block_defers(origin, floor);
        self.cfg.add_edge(current, target, CfgEdge::labeled(label));
    }

    /// Routes the natural (non-jump) fallthrough out of a block through
    /// any defers registered at or after `floor`, returning the new
    /// "current" node for the caller to keep sequencing from.
    fn flush_block_defers(&mut self, from: NodeIndex, floor: usize) -> NodeIndex {
        let mut current = from;
        for &(defer_entry, defer_tail) in self.defer_stack[floor..].to_vec().iter().rev() {
            self.cfg.add_edge(current, defer_entry, CfgEdge::plain());
            current = defer_tail;
        }
        current
    }

    fn build_body_stmt(
        &mut self,
        body: &Statement,
        loc: StmtLoc,
        entry: Entry,
        cont: &Cont,
        ctx: &BuildCtx,
    ) {
        match &body.kind {
            StatementKind::Compound(stmts) => self.build_block(stmts, &loc, entry, cont, ctx),
            _ => self.build_statement(body, loc, entry, cont, ctx),
        }
    }

    fn build_block(
        &mut self,
        stmts: &[Statement],
        base_loc: &[u32],
        entry: Entry,
        cont: &Cont,
        ctx: &BuildCtx,
    ) {
        if stmts.is_empty() {
            match entry {
                Entry::Fresh(pred, label) => {
                    let edge = label.map(CfgEdge::labeled).unwrap_or_default();
                    self.cfg.add_edge(pred, cont.node, edge);
                }
                Entry::Reserved(node) => {
                    self.cfg.add_edge(node, cont.node, cont.edge.clone());
                }
            }
            return;
        }

        let defer_base = self.defer_stack.len();
        let mut declared_vars: Vec<String> = Vec::new();
        let mut current_entry = entry;

        for i in 0..stmts.len() {
            let stmt = &stmts[i];
            let loc = child_loc(base_loc, i as u32);
            if let StatementKind::VariableDeclaration(decls) = &stmt.kind {
                declared_vars.extend(decls.iter().map(|d| d.name.clone()));
            }

            if i + 1 < stmts.len() {
                let next_loc = child_loc(base_loc, (i + 1) as u32);
                let next_node = self
                    .reserve_entry(&stmts[i + 1], &next_loc)
                    .unwrap_or_else(|| self.cfg.add_node(CfgNode::Merge));
                self.build_statement(stmt, loc, current_entry, &Cont::plain(next_node), ctx);
                current_entry = Entry::Reserved(next_node);
                continue;
            }

            let needs_flush = !declared_vars.is_empty()
                || self.defer_stack.len() > defer_base
                || matches!(stmt.kind, StatementKind::Defer(_));
            if !needs_flush {
                self.build_statement(stmt, loc, current_entry, cont, ctx);
                continue;
            }

            let tail = self.cfg.add_node(CfgNode::Merge);
            self.build_statement(stmt, loc, current_entry, &Cont::plain(tail), ctx);
            let mut flushed = self.flush_block_defers(tail, defer_base);
            self.defer_stack.truncate(defer_base);
            if !declared_vars.is_empty() {
                let eos = self.cfg.add_node(CfgNode::EndOfScope(declared_vars.clone()));
                self.cfg.add_edge(flushed, eos, CfgEdge::plain());
                flushed = eos;
            }
            self.cfg.add_edge(flushed, cont.node, cont.edge.clone());
        }
    }

    fn build_statement(
        &mut self,
        stmt: &Statement,
        loc: StmtLoc,
        entry: Entry,
        cont: &Cont,
        ctx: &BuildCtx,
    ) {
        match &stmt.kind {
            StatementKind::Expression(_)
            | StatementKind::VariableDeclaration(_)
            | StatementKind::Unknown { .. } => {
                let node = self.materialize(loc, entry);
                self.cfg.add_edge(node, cont.node, cont.edge.clone());
            }

            StatementKind::Compound(stmts) => self.build_block(stmts, &loc, entry, cont, ctx),

            StatementKind::If { then_branch, else_branch, .. } => {
                let header = self.materialize(loc.clone(), entry);

                self.build_body_stmt(
                    then_branch,
                    child_loc(&loc, 0),
                    Entry::Fresh(header, Some("then")),
                    cont,
                    ctx,
                );
                match else_branch {
                    Some(e) => self.build_body_stmt(
                        e,
                        child_loc(&loc, 1),
                        Entry::Fresh(header, Some("else")),
                        cont,
                        ctx,
                    ),
                    None => self.cfg.add_edge(header, cont.node, CfgEdge::labeled("else")),
                }
            }

            StatementKind::Switch { cases, .. } => {
                let header = self.materialize(loc.clone(), entry);

                let floor = self.defer_stack.len();
                let case_entries: Vec<NodeIndex> = cases
                    .iter()
                    .enumerate()
                    .map(|(i, case)| {
                        self.reserve_block_entry(&case.body, &child_loc(&loc, i as u32))
                            .unwrap_or_else(|| self.cfg.add_node(CfgNode::Merge))
                    })
                    .collect();
                for &case_entry in &case_entries {
                    self.cfg.add_edge(header, case_entry, CfgEdge::labeled("case"));
                }

                let mut case_ctx = ctx.clone();
                case_ctx.break_target = Some((cont.node, floor));

                for (i, case) in cases.iter().enumerate() {
                    let mut this_ctx = case_ctx.clone();
                    this_ctx.fallthrough_target =
                        case_entries.get(i + 1).map(|&next| (next, floor));
                    let case_loc = child_loc(&loc, i as u32);
                    self.build_block(
                        &case.body,
                        &case_loc,
                        Entry::Reserved(case_entries[i]),
                        cont,
                        &this_ctx,
                    );
                }
            }

            StatementKind::While { body, .. } => {
                let header = self.materialize(loc.clone(), entry);
                self.cfg.add_edge(header, cont.node, cont.edge.clone());

                let floor = self.defer_stack.len();
                let mut body_ctx = ctx.clone();
                body_ctx.break_target = Some((cont.node, floor));
                body_ctx.continue_target = Some((header, floor));

                let loop_cont = Cont { node: header, edge: CfgEdge::back("loop") };
                self.build_body_stmt(
                    body,
                    child_loc(&loc, 0),
                    Entry::Fresh(header, None),
                    &loop_cont,
                    &body_ctx,
                );
            }

            StatementKind::RepeatWhile { body, .. } => {
                // `repeat { body } while (cond)` runs the body before its
                // first condition check, so the body's own entry (not
                // `cond_node`, which sits at this statement's `loc`) is
                // what entry/back-edge both target — a genuine join with
                // no single AST counterpart of its own.
                let loop_anchor = self.cfg.add_node(CfgNode::Merge);
                match entry {
                    Entry::Fresh(pred, label) => {
                        let edge = label.map(CfgEdge::labeled).unwrap_or_default();
                        self.cfg.add_edge(pred, loop_anchor, edge);
                    }
                    Entry::Reserved(node) => {
                        self.cfg.add_edge(node, loop_anchor, CfgEdge::plain());
                    }
                }
                let cond_node = self.add_stmt_node(loc.clone());

                let floor = self.defer_stack.len();
                let mut body_ctx = ctx.clone();
                body_ctx.break_target = Some((cont.node, floor));
                body_ctx.continue_target = Some((cond_node, floor));

                self.build_body_stmt(
                    body,
                    child_loc(&loc, 0),
                    Entry::Fresh(loop_anchor, None),
                    &Cont::plain(cond_node),
                    &body_ctx,
                );

                self.cfg.add_edge(cond_node, loop_anchor, CfgEdge::back("loop"));
                self.cfg.add_edge(cond_node, cont.node, cont.edge.clone());
            }

            StatementKind::ForIn { body, .. } => {
                let header = self.materialize(loc.clone(), entry);
                self.cfg.add_edge(header, cont.node, cont.edge.clone());

                let floor = self.defer_stack.len();
                let mut body_ctx = ctx.clone();
                body_ctx.break_target = Some((cont.node, floor));
                body_ctx.continue_target = Some((header, floor));

                let loop_cont = Cont { node: header, edge: CfgEdge::back("loop") };
                self.build_body_stmt(
                    body,
                    child_loc(&loc, 0),
                    Entry::Fresh(header, None),
                    &loop_cont,
                    &body_ctx,
                );
            }

            StatementKind::Do { body, catches } => {
                let floor = self.defer_stack.len();
                let mut do_ctx = ctx.clone();
                let catch_entry = if catches.is_empty() {
                    None
                } else {
                    Some(self.cfg.add_node(CfgNode::Merge))
                };
                if let Some(entry_node) = catch_entry {
                    do_ctx.catch_target = Some((entry_node, floor));
                }

                self.build_body_stmt(body, child_loc(&loc, 0), entry, cont, &do_ctx);

                if let Some(catch_entry) = catch_entry {
                    self.build_block(
                        catches,
                        &child_loc(&loc, 1),
                        Entry::Fresh(catch_entry, None),
                        cont,
                        ctx,
                    );
                }
            }

            StatementKind::Defer(body) => {
                let node = self.materialize(loc.clone(), entry);
                self.cfg.add_edge(node, cont.node, cont.edge.clone());

                let defer_entry = self.cfg.add_node(CfgNode::Merge);
                let defer_tail = self.cfg.add_node(CfgNode::Merge);
                let neutral_ctx = BuildCtx {
                    exit: ctx.exit,
                    break_target: None,
                    continue_target: None,
                    catch_target: None,
                    fallthrough_target: None,
                };
                self.build_body_stmt(
                    body,
                    child_loc(&loc, 0),
                    Entry::Fresh(defer_entry, None),
                    &Cont::plain(defer_tail),
                    &neutral_ctx,
                );
                self.defer_stack.push((defer_entry, defer_tail));
            }

            StatementKind::Throw(_) => {
                let node = self.materialize(loc, entry);
                let (target, floor) = ctx.catch_target.unwrap_or((ctx.exit, 0));
                self.route_jump(node, target, floor, "throw");
            }

            StatementKind::Return(_) => {
                let node = self.materialize(loc, entry);
                self.route_jump(node, ctx.exit, 0, "return");
            }

            StatementKind::Break { .. } => {
                let node = self.materialize(loc, entry);
                let (target, floor) = ctx.break_target.unwrap_or((ctx.exit, 0));
                self.route_jump(node, target, floor, "break");
            }

            StatementKind::Continue { .. } => {
                let node = self.materialize(loc, entry);
                let (target, floor) = ctx.continue_target.unwrap_or((ctx.exit, 0));
                self.route_jump(node, target, floor, "continue");
            }

            StatementKind::Fallthrough => {
                let node = self.materialize(loc, entry);
                match ctx.fallthrough_target {
                    Some((target, floor)) => self.route_jump(node, target, floor, "fallthrough"),
                    // `fallthrough` outside a switch case shouldn't occur
                    // in lowered input; degrade to a pass-through rather
                    // than panicking (§7: nothing in the core throws).
                    None => self.cfg.add_edge(node, cont.node, cont.edge.clone()),
                }
            }

            StatementKind::LocalFunction { body, .. } => {
                let node = self.materialize(loc, entry);
                let inner = Cfg::build(body);
                let subgraph = self.cfg.add_node(CfgNode::Subgraph(Box::new(inner)));
                self.cfg.add_edge(node, subgraph, CfgEdge::plain());
                self.cfg.add_edge(subgraph, cont.node, cont.edge.clone());
            }
        }
    }
}

impl Cfg {
    /// Builds a CFG for `body` (§4.3 contract): entry dominates every
    /// reachable node, and every non-exit path reaches either `exit` or
    /// a terminal statement.
    pub fn build(body: &[Statement]) -> Cfg {
        let cfg = Cfg::empty();
        let entry = cfg.entry();
        let exit = cfg.exit();
        let mut builder = Builder { cfg, defer_stack: Vec::new() };
        let ctx = BuildCtx {
            exit,
            break_target: None,
            continue_target: None,
            catch_target: None,
            fallthrough_target: None,
        };
        builder.build_block(body, &[], Entry::Fresh(entry, None), &Cont::plain(exit), &ctx);
        builder.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expr::{Constant, Expression, ExpressionKind};
    use crate::ast::stmt::StatementKind;
    use crate::cfg::ops;
    use crate::span::{SourceId, Span};

    fn span() -> Span {
        Span::new(SourceId::new(0), 0, 1)
    }

    fn expr_stmt() -> Statement {
        Statement::new(
            StatementKind::Expression(Expression::new(
                ExpressionKind::Constant(Constant::Int(0)),
                span(),
            )),
            span(),
        )
    }

    fn bool_expr() -> Expression {
        Expression::new(ExpressionKind::Constant(Constant::Bool(true)), span())
    }

    fn compound(stmts: Vec<Statement>) -> Statement {
        Statement::new(StatementKind::Compound(stmts), span())
    }

    #[test]
    fn if_else_then_sequence_has_no_back_edges_and_is_well_formed() {
        // if (c) { A } else { B }; C
        let if_stmt = Statement::new(
            StatementKind::If {
                cond: bool_expr(),
                then_branch: Box::new(compound(vec![expr_stmt()])),
                else_branch: Some(Box::new(compound(vec![expr_stmt()]))),
            },
            span(),
        );
        let body = vec![if_stmt, expr_stmt()];
        let cfg = Cfg::build(&body);
        assert!(cfg.is_well_formed());

        let mut marked = cfg.clone();
        ops::mark_back_edges(&mut marked);
        let has_back_edge = marked
            .node_indices()
            .flat_map(|n| marked.out_edges(n).map(|(_, e)| e.back_edge).collect::<Vec<_>>())
            .any(|b| b);
        assert!(!has_back_edge);

        let pruned = ops::prune(cfg.clone());
        assert!(pruned.is_well_formed());
        // Every node in the unpruned graph is reachable, so pruning
        // doesn't shrink it.
        assert_eq!(pruned.node_count(), cfg.node_count());
    }

    #[test]
    fn if_else_then_sequence_joins_directly_on_the_next_statement() {
        // if (c) { A } else { B }; C -- exactly entry, c, A, B, C, exit,
        // with both branches wired straight into C's own node (no
        // synthetic merge).
        let if_stmt = Statement::new(
            StatementKind::If {
                cond: bool_expr(),
                then_branch: Box::new(compound(vec![expr_stmt()])),
                else_branch: Some(Box::new(compound(vec![expr_stmt()]))),
            },
            span(),
        );
        let body = vec![if_stmt, expr_stmt()];
        let cfg = Cfg::build(&body);

        assert_eq!(cfg.node_count(), 6);
        assert!(!cfg.node_indices().any(|n| matches!(cfg.node(n), Some(CfgNode::Merge))));

        let c = cfg
            .node_indices()
            .find(|&n| matches!(cfg.node(n), Some(CfgNode::Statement(loc)) if loc.as_slice() == [1u32]))
            .unwrap();
        assert_eq!(cfg.predecessors(c).count(), 2);
    }

    #[test]
    fn while_loop_creates_a_back_edge() {
        let while_stmt = Statement::new(
            StatementKind::While { cond: bool_expr(), body: Box::new(compound(vec![expr_stmt()])) },
            span(),
        );
        let cfg = Cfg::build(&[while_stmt]);
        assert!(cfg.is_well_formed());
        let mut marked = cfg.clone();
        ops::mark_back_edges(&mut marked);
        let back_edges: Vec<_> = marked
            .node_indices()
            .flat_map(|n| marked.out_edges(n).filter(|(_, e)| e.back_edge).collect::<Vec<_>>())
            .collect();
        assert_eq!(back_edges.len(), 1);
    }

    #[test]
    fn code_after_return_is_unreachable() {
        let ret = Statement::new(StatementKind::Return(None), span());
        let body = vec![ret, expr_stmt()];
        let cfg = Cfg::build(&body);
        let pruned = ops::prune(cfg.clone());
        // The statement after `return` never got a live predecessor, so
        // pruning drops it.
        assert!(pruned.node_count() < cfg.node_count());
    }

    #[test]
    fn synchronized_lowering_defer_runs_on_normal_exit() {
        // do { let _lockTarget = e; objc_sync_enter(_lockTarget); defer { objc_sync_exit(_lockTarget) }; x = 1 }
        let defer_stmt = Statement::new(
            StatementKind::Defer(Box::new(compound(vec![expr_stmt()]))),
            span(),
        );
        let body = vec![expr_stmt(), expr_stmt(), defer_stmt, expr_stmt()];
        let cfg = Cfg::build(&body);
        assert!(cfg.is_well_formed());
        // The defer's inner statement node must be reachable from entry.
        let pruned = ops::prune(cfg);
        assert!(pruned.node_indices().count() >= 5);
    }
}
