//! Pass 4 (§4.4): resolve bare identifiers against the scopes visible at
//! each use site — locals, parameters, the enclosing type's instance
//! properties, and (loosely) globals — and flag anything left over.
//!
//! The AST has no slot to record *where* an identifier resolved to
//! (unlike `Expression::resolved_type`, which pass 5 fills in), so this
//! pass never mutates the graph; it only reports
//! [`swiftify_core::DiagnosticKind::UnresolvedIdentifier`] for names that
//! resolve in no scope. `run` therefore always returns `false` — it
//! never contributes to the scheduler's fixed point, only to the
//! diagnostics sink.

use std::collections::HashSet;

use swiftify_core::ast::expr::{Expression, ExpressionKind};
use swiftify_core::ast::stmt::{Statement, StatementKind};
use swiftify_core::intention::graph::IntentionKind;
use swiftify_core::intention::IntentionGraph;
use swiftify_core::DiagnosticKind;

use super::{IntentionPass, PassContext};

pub struct ResolveIdentifiers;

/// A stack of name sets; innermost scope is last. `self`/`super` resolve
/// unconditionally and never get reported.
struct Scope {
    frames: Vec<HashSet<String>>,
}

impl Scope {
    fn new(outer: HashSet<String>) -> Self {
        Self { frames: vec![outer] }
    }

    fn push(&mut self) {
        self.frames.push(HashSet::new());
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn declare(&mut self, name: &str) {
        self.frames.last_mut().expect("scope stack is never empty").insert(name.to_string());
    }

    fn contains(&self, name: &str) -> bool {
        name == "self" || name == "super" || self.frames.iter().any(|frame| frame.contains(name))
    }
}

fn walk_stmt(stmt: &Statement, scope: &mut Scope, diagnostics: &mut swiftify_core::Diagnostics) {
    match &stmt.kind {
        StatementKind::VariableDeclaration(decls) => {
            for decl in decls {
                if let Some(init) = &decl.initializer {
                    walk_expr(init, scope, diagnostics);
                }
                scope.declare(&decl.name);
            }
        }
        StatementKind::If { cond, then_branch, else_branch } => {
            walk_expr(cond, scope, diagnostics);
            walk_stmt(then_branch, scope, diagnostics);
            if let Some(e) = else_branch {
                walk_stmt(e, scope, diagnostics);
            }
        }
        StatementKind::Switch { subject, cases } => {
            walk_expr(subject, scope, diagnostics);
            for case in cases {
                scope.push();
                for stmt in &case.body {
                    walk_stmt(stmt, scope, diagnostics);
                }
                scope.pop();
            }
        }
        StatementKind::While { cond, body } => {
            walk_expr(cond, scope, diagnostics);
            walk_stmt(body, scope, diagnostics);
        }
        StatementKind::RepeatWhile { body, cond } => {
            walk_stmt(body, scope, diagnostics);
            walk_expr(cond, scope, diagnostics);
        }
        StatementKind::ForIn { variable, sequence, body } => {
            walk_expr(sequence, scope, diagnostics);
            scope.push();
            scope.declare(variable);
            walk_stmt(body, scope, diagnostics);
            scope.pop();
        }
        StatementKind::Do { body, catches } => {
            walk_stmt(body, scope, diagnostics);
            for c in catches {
                walk_stmt(c, scope, diagnostics);
            }
        }
        StatementKind::Defer(body) => walk_stmt(body, scope, diagnostics),
        StatementKind::Compound(stmts) => {
            scope.push();
            for s in stmts {
                walk_stmt(s, scope, diagnostics);
            }
            scope.pop();
        }
        StatementKind::LocalFunction { name, params, body } => {
            scope.declare(name);
            scope.push();
            for p in params {
                scope.declare(p);
            }
            for s in body {
                walk_stmt(s, scope, diagnostics);
            }
            scope.pop();
        }
        StatementKind::Expression(e) => walk_expr(e, scope, diagnostics),
        StatementKind::Throw(e) => walk_expr(e, scope, diagnostics),
        StatementKind::Return(Some(e)) => walk_expr(e, scope, diagnostics),
        StatementKind::Return(None)
        | StatementKind::Break { .. }
        | StatementKind::Continue { .. }
        | StatementKind::Fallthrough
        | StatementKind::Unknown { .. } => {}
    }
}

fn walk_expr(expr: &Expression, scope: &mut Scope, diagnostics: &mut swiftify_core::Diagnostics) {
    match &expr.kind {
        ExpressionKind::Identifier(name) => {
            if !scope.contains(name) {
                diagnostics.report(
                    DiagnosticKind::UnresolvedIdentifier { name: name.clone() },
                    expr.span,
                );
            }
        }
        ExpressionKind::Binary { lhs, rhs, .. } => {
            walk_expr(lhs, scope, diagnostics);
            walk_expr(rhs, scope, diagnostics);
        }
        ExpressionKind::Assignment { target, value, .. } => {
            walk_expr(target, scope, diagnostics);
            walk_expr(value, scope, diagnostics);
        }
        ExpressionKind::PostfixCall { callee, arguments } => {
            walk_expr(callee, scope, diagnostics);
            for arg in arguments {
                walk_expr(&arg.value, scope, diagnostics);
            }
        }
        ExpressionKind::PostfixSubscript { target, index } => {
            walk_expr(target, scope, diagnostics);
            walk_expr(index, scope, diagnostics);
        }
        // The member name itself (`.foo`) isn't a free identifier lookup;
        // only the target is.
        ExpressionKind::PostfixMember { target, .. } => walk_expr(target, scope, diagnostics),
        ExpressionKind::Unary { operand, .. } => walk_expr(operand, scope, diagnostics),
        ExpressionKind::Cast { operand, .. } => walk_expr(operand, scope, diagnostics),
        ExpressionKind::Ternary { cond, then_branch, else_branch } => {
            walk_expr(cond, scope, diagnostics);
            walk_expr(then_branch, scope, diagnostics);
            walk_expr(else_branch, scope, diagnostics);
        }
        ExpressionKind::Parens(inner) => walk_expr(inner, scope, diagnostics),
        ExpressionKind::BlockLiteral { params, body } => {
            scope.push();
            for p in params {
                scope.declare(p);
            }
            for s in body {
                walk_stmt(s, scope, diagnostics);
            }
            scope.pop();
        }
        ExpressionKind::Constant(_) | ExpressionKind::Unknown { .. } => {}
    }
}

impl IntentionPass for ResolveIdentifiers {
    fn name(&self) -> &'static str {
        "resolve_identifiers"
    }

    fn run(&self, graph: &mut IntentionGraph, ctx: &mut PassContext<'_>) -> bool {
        for &root in graph.roots() {
            let IntentionKind::File { types, globals, .. } = &graph.get(root).kind else { continue };
            let types = types.clone();
            let globals = globals.clone();

            for ty in types {
                if !graph.is_live(ty) {
                    continue;
                }
                let IntentionKind::Type { properties, methods, .. } = &graph.get(ty).kind else {
                    continue;
                };
                let mut outer = HashSet::new();
                for &prop in properties {
                    if let IntentionKind::Property { name, .. } = &graph.get(prop).kind {
                        outer.insert(ctx.interner.resolve(*name).to_string());
                    }
                }
                let methods = methods.clone();

                for method in methods {
                    if !graph.is_live(method) {
                        continue;
                    }
                    let (body_id, params) = match &graph.get(method).kind {
                        IntentionKind::Method { signature, body, .. } => {
                            (*body, signature_param_names(ctx, signature))
                        }
                        _ => continue,
                    };
                    let Some(body_id) = body_id else { continue };
                    let IntentionKind::Body { statements } = &graph.get(body_id).kind else {
                        continue;
                    };
                    let mut scope = Scope::new(outer.clone());
                    scope.push();
                    for p in params {
                        scope.declare(&p);
                    }
                    for stmt in statements {
                        walk_stmt(stmt, &mut scope, ctx.diagnostics);
                    }
                }
            }

            for global in globals {
                if !graph.is_live(global) {
                    continue;
                }
                let (body_id, params) = match &graph.get(global).kind {
                    IntentionKind::GlobalFunction { signature, body, .. } => {
                        (*body, signature_param_names(ctx, signature))
                    }
                    _ => continue,
                };
                let Some(body_id) = body_id else { continue };
                let IntentionKind::Body { statements } = &graph.get(body_id).kind else { continue };
                let mut scope = Scope::new(HashSet::new());
                scope.push();
                for p in params {
                    scope.declare(&p);
                }
                for stmt in statements {
                    walk_stmt(stmt, &mut scope, ctx.diagnostics);
                }
            }
        }

        false
    }
}

fn signature_param_names(
    ctx: &PassContext<'_>,
    signature: &swiftify_core::intention::graph::MethodSignature,
) -> Vec<String> {
    signature.params.iter().map(|p| ctx.interner.resolve(p.name).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use swiftify_core::ast::ty::SwiftType;
    use swiftify_core::intention::graph::{Access, MethodSignature, Param, TypeKind};
    use swiftify_core::span::{SourceId, Span};
    use swiftify_core::{Diagnostics, Interner};

    fn span() -> Span {
        Span::new(SourceId::new(0), 0, 1)
    }

    #[test]
    fn unresolved_identifier_is_reported() {
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
            vec![Statement::new(
                StatementKind::Expression(Expression::new(
                    ExpressionKind::Identifier("mysteryGlobal".into()),
                    span(),
                )),
                span(),
            )],
        );

        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        assert!(!ResolveIdentifiers.run(&mut graph, &mut ctx));
        assert_eq!(diagnostics.len(), 1);
        match &diagnostics.iter().next().unwrap().kind {
            DiagnosticKind::UnresolvedIdentifier { name } => assert_eq!(name, "mysteryGlobal"),
            other => panic!("unexpected diagnostic: {other:?}"),
        }
    }

    #[test]
    fn parameter_and_property_references_resolve_cleanly() {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let file = graph.add_file(PathBuf::from("Foo.h"), true, None);
        let type_name = interner.intern("Foo");
        let ty = graph.add_type_to_file(
            file, type_name, TypeKind::Class, None, Access::Internal, false, None, None,
        );
        let prop_name = interner.intern("count");
        graph.add_property(
            ty,
            prop_name,
            SwiftType::Named(interner.intern("Int")),
            vec![],
            swiftify_core::intention::graph::PropertyMode::Field,
            swiftify_core::intention::graph::ValueStorage::Stored { initializer: None },
            None,
            None,
        );
        let param_name = interner.intern("amount");
        let selector = interner.intern("addAmount:");
        let method = graph.add_method(
            ty,
            MethodSignature {
                is_static: false,
                selector,
                params: vec![Param { label: None, name: param_name }],
                param_types: vec![SwiftType::Named(interner.intern("Int"))],
                return_type: SwiftType::Void,
            },
            Access::Internal,
            false,
            None,
            None,
        );
        graph.set_method_body(
            method,
            vec![Statement::new(
                StatementKind::Expression(Expression::new(
                    ExpressionKind::Assignment {
                        op: swiftify_core::ast::expr::AssignOp::AddAssign,
                        target: Box::new(Expression::new(ExpressionKind::Identifier("count".into()), span())),
                        value: Box::new(Expression::new(ExpressionKind::Identifier("amount".into()), span())),
                    },
                    span(),
                )),
                span(),
            )],
        );

        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        ResolveIdentifiers.run(&mut graph, &mut ctx);
        assert!(diagnostics.is_empty());
    }
}
