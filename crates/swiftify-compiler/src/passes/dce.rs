//! Pass 6 (§4.4): CFG-based dead statement elimination.
//!
//! Builds a [`Cfg`] for every method/accessor/global-function body,
//! prunes it (§4.3), and maps the surviving `CfgNode::Statement` node
//! locations back onto the original `Vec<Statement>` tree to drop
//! anything that never got wired to a live predecessor — code after an
//! unconditional `return`/`throw`/`break`/`continue`, or a branch whose
//! header was itself unreachable.
//!
//! The location scheme mirrors the CFG builder's own
//! (`crate::cfg::builder::child_loc`) exactly: a `Compound` or `Do`
//! statement gets no node of its own (the builder recurses straight
//! into its children using the *same* location as a base), every other
//! statement kind gets one node at its own location.

use std::collections::HashSet;

use swiftify_core::ast::stmt::{Statement, StatementKind, SwitchCase};
use swiftify_core::cfg::{ops, Cfg, CfgNode};
use swiftify_core::intention::graph::IntentionKind;
use swiftify_core::intention::IntentionGraph;
use swiftify_core::span::Span;

use super::{IntentionPass, PassContext};

pub struct ControlFlowDce;

fn child_loc(base: &[u32], idx: u32) -> Vec<u32> {
    let mut v = base.to_vec();
    v.push(idx);
    v
}

fn reachable_locs(cfg: &Cfg) -> HashSet<Vec<u32>> {
    cfg.node_indices()
        .filter_map(|n| match cfg.node(n) {
            Some(CfgNode::Statement(loc)) => Some(loc.clone()),
            _ => None,
        })
        .collect()
}

fn has_own_node(kind: &StatementKind) -> bool {
    !matches!(kind, StatementKind::Compound(_) | StatementKind::Do { .. })
}

fn empty_compound(span: Span) -> Statement {
    Statement::new(StatementKind::Compound(vec![]), span)
}

fn filter_block(stmts: Vec<Statement>, base: &[u32], reachable: &HashSet<Vec<u32>>) -> Vec<Statement> {
    stmts
        .into_iter()
        .enumerate()
        .filter_map(|(i, stmt)| {
            let loc = child_loc(base, i as u32);
            filter_stmt(stmt, &loc, reachable)
        })
        .collect()
}

/// Filters a single statement occupying the CFG location `loc`, dropping
/// it (and returning `None`) if it never got a live predecessor.
/// `Compound`/`Do` bypass that check (they have no node of their own)
/// and always recurse into their children using `loc` as their base.
fn filter_stmt(stmt: Statement, loc: &[u32], reachable: &HashSet<Vec<u32>>) -> Option<Statement> {
    if has_own_node(&stmt.kind) && !reachable.contains(loc) {
        return None;
    }

    let span = stmt.span;
    let kind = match stmt.kind {
        StatementKind::Compound(inner) => StatementKind::Compound(filter_block(inner, loc, reachable)),

        StatementKind::Do { body, catches } => {
            let body = filter_stmt(*body, &child_loc(loc, 0), reachable)
                .unwrap_or_else(|| empty_compound(span));
            let catches = filter_block(catches, &child_loc(loc, 1), reachable);
            StatementKind::Do { body: Box::new(body), catches }
        }

        StatementKind::If { cond, then_branch, else_branch } => {
            let then_branch = filter_stmt(*then_branch, &child_loc(loc, 0), reachable)
                .unwrap_or_else(|| empty_compound(span));
            let else_branch = else_branch
                .and_then(|e| filter_stmt(*e, &child_loc(loc, 1), reachable))
                .map(Box::new);
            StatementKind::If { cond, then_branch: Box::new(then_branch), else_branch }
        }

        StatementKind::Switch { subject, cases } => {
            let cases = cases
                .into_iter()
                .enumerate()
                .map(|(i, case)| SwitchCase {
                    patterns: case.patterns,
                    body: filter_block(case.body, &child_loc(loc, i as u32), reachable),
                    falls_through: case.falls_through,
                })
                .collect();
            StatementKind::Switch { subject, cases }
        }

        StatementKind::While { cond, body } => {
            let body = filter_stmt(*body, &child_loc(loc, 0), reachable)
                .unwrap_or_else(|| empty_compound(span));
            StatementKind::While { cond, body: Box::new(body) }
        }

        StatementKind::RepeatWhile { body, cond } => {
            let body = filter_stmt(*body, &child_loc(loc, 0), reachable)
                .unwrap_or_else(|| empty_compound(span));
            StatementKind::RepeatWhile { body: Box::new(body), cond }
        }

        StatementKind::ForIn { variable, sequence, body } => {
            let body = filter_stmt(*body, &child_loc(loc, 0), reachable)
                .unwrap_or_else(|| empty_compound(span));
            StatementKind::ForIn { variable, sequence, body: Box::new(body) }
        }

        StatementKind::Defer(body) => {
            let body = filter_stmt(*body, &child_loc(loc, 0), reachable)
                .unwrap_or_else(|| empty_compound(span));
            StatementKind::Defer(Box::new(body))
        }

        StatementKind::LocalFunction { name, params, body } => {
            let inner_reachable = reachable_locs(&ops::prune(Cfg::build(&body)));
            let body = filter_block(body, &[], &inner_reachable);
            StatementKind::LocalFunction { name, params, body }
        }

        other => other,
    };

    Some(Statement { kind, span, label: stmt.label, leading_comments: stmt.leading_comments, trailing_comments: stmt.trailing_comments })
}

fn body_locations(graph: &IntentionGraph) -> Vec<swiftify_core::intention::IntentionId> {
    let mut out = Vec::new();
    for &root in graph.roots() {
        let IntentionKind::File { types, globals, .. } = &graph.get(root).kind else { continue };
        for &ty in types {
            let IntentionKind::Type { methods, properties, .. } = &graph.get(ty).kind else {
                continue;
            };
            for &method in methods {
                if let IntentionKind::Method { body: Some(body), .. } = &graph.get(method).kind {
                    out.push(*body);
                }
            }
            for &prop in properties {
                if let IntentionKind::Property {
                    storage: swiftify_core::intention::graph::ValueStorage::Accessors { getter, setter },
                    ..
                } = &graph.get(prop).kind
                {
                    out.extend([*getter, *setter].into_iter().flatten());
                }
            }
        }
        for &global in globals {
            if let IntentionKind::GlobalFunction { body: Some(body), .. } = &graph.get(global).kind {
                out.push(*body);
            }
        }
    }
    out
}

impl IntentionPass for ControlFlowDce {
    fn name(&self) -> &'static str {
        "control_flow_dce"
    }

    fn run(&self, graph: &mut IntentionGraph, _ctx: &mut PassContext<'_>) -> bool {
        let mut changed = false;

        for body_id in body_locations(graph) {
            if !graph.is_live(body_id) {
                continue;
            }
            let IntentionKind::Body { statements } = &graph.get(body_id).kind else { continue };
            let cfg = Cfg::build(statements);
            let pruned = ops::prune(cfg);
            let reachable = reachable_locs(&pruned);

            let original = statements.clone();
            let filtered = filter_block(original.clone(), &[], &reachable);
            if filtered != original {
                changed = true;
                if let IntentionKind::Body { statements } = &mut graph.get_mut(body_id).kind {
                    *statements = filtered;
                }
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use swiftify_core::ast::expr::{Constant, Expression, ExpressionKind};
    use swiftify_core::ast::ty::SwiftType;
    use swiftify_core::intention::graph::{Access, MethodSignature, TypeKind};
    use swiftify_core::span::SourceId;
    use swiftify_core::{Diagnostics, Interner};

    fn span() -> Span {
        Span::new(SourceId::new(0), 0, 1)
    }

    fn expr_stmt() -> Statement {
        Statement::new(
            StatementKind::Expression(Expression::new(ExpressionKind::Constant(Constant::Int(0)), span())),
            span(),
        )
    }

    #[test]
    fn statement_after_unconditional_return_is_dropped() {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let file = graph.add_file(PathBuf::from("Foo.h"), true, None);
        let type_name = interner.intern("Foo");
        let ty = graph.add_type_to_file(
            file, type_name, TypeKind::Class, None, Access::Internal, false, None, None,
        );
        let selector = interner.intern("doThing");
        let method = graph.add_method(
            ty,
            MethodSignature {
                is_static: false,
                selector,
                params: vec![],
                param_types: vec![],
                return_type: SwiftType::Void,
            },
            Access::Internal,
            false,
            None,
            None,
        );
        graph.set_method_body(
            method,
            vec![Statement::new(StatementKind::Return(None), span()), expr_stmt()],
        );

        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        assert!(ControlFlowDce.run(&mut graph, &mut ctx));

        let body_id = match &graph.get(method).kind {
            IntentionKind::Method { body, .. } => body.unwrap(),
            _ => unreachable!(),
        };
        let IntentionKind::Body { statements } = &graph.get(body_id).kind else { unreachable!() };
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn reachable_body_is_left_untouched() {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let file = graph.add_file(PathBuf::from("Foo.h"), true, None);
        let type_name = interner.intern("Foo");
        let ty = graph.add_type_to_file(
            file, type_name, TypeKind::Class, None, Access::Internal, false, None, None,
        );
        let selector = interner.intern("doThing");
        let method = graph.add_method(
            ty,
            MethodSignature {
                is_static: false,
                selector,
                params: vec![],
                param_types: vec![],
                return_type: SwiftType::Void,
            },
            Access::Internal,
            false,
            None,
            None,
        );
        graph.set_method_body(method, vec![expr_stmt(), expr_stmt()]);

        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        assert!(!ControlFlowDce.run(&mut graph, &mut ctx));
    }
}
