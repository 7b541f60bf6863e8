//! Pass 5 (§4.4): fill in `Expression::resolved_type` bottom-up.
//!
//! Declared types (a `VariableDeclarator`'s `ty`, a parameter's entry in
//! `MethodSignature::param_types`) are already known from lowering —
//! this pass never has to guess those. What it adds is purely
//! expression-level: constants, operator results, casts, and member
//! access through a known property. Anything it can't determine is left
//! `None` (§7 category 2, "consumers must tolerate missing types"),
//! which is why this can't be an error: `PostfixCall`, `PostfixSubscript`
//! and `BlockLiteral` results stay unresolved.

use std::collections::HashMap;

use swiftify_core::ast::expr::{BinaryOp, Constant, Expression, ExpressionKind, UnaryOp};
use swiftify_core::ast::stmt::{Statement, StatementKind};
use swiftify_core::ast::ty::SwiftType;
use swiftify_core::intention::graph::IntentionKind;
use swiftify_core::intention::IntentionGraph;
use swiftify_core::{Interner, Symbol};

use super::{IntentionPass, PassContext};

pub struct InferExpressionTypes;

/// Every type's declared property types, by property name, snapshotted
/// before any body is walked mutably — this pass looks up *other*
/// types' shapes but only ever mutates the body it is currently
/// walking, so the lookup table has to be built from an immutable pass
/// over the whole graph first to avoid an aliasing mutable borrow of
/// `IntentionGraph` while a body is being rewritten.
fn snapshot_property_types(graph: &IntentionGraph) -> HashMap<Symbol, HashMap<Symbol, SwiftType>> {
    let mut out = HashMap::new();
    for &root in graph.roots() {
        let IntentionKind::File { types, .. } = &graph.get(root).kind else { continue };
        for &ty in types {
            let IntentionKind::Type { type_name, properties, .. } = &graph.get(ty).kind else {
                continue;
            };
            let mut members = HashMap::new();
            for &prop in properties {
                if let IntentionKind::Property { name, ty, .. } = &graph.get(prop).kind {
                    members.insert(*name, ty.clone());
                }
            }
            out.insert(*type_name, members);
        }
    }
    out
}

fn named(interner: &mut Interner, text: &str) -> SwiftType {
    SwiftType::Named(interner.intern(text))
}

fn constant_type(interner: &mut Interner, c: &Constant) -> Option<SwiftType> {
    match c {
        Constant::Int(_) => Some(named(interner, "Int")),
        Constant::Double(_) => Some(named(interner, "Double")),
        Constant::Bool(_) => Some(named(interner, "Bool")),
        Constant::String(_) => Some(named(interner, "String")),
        Constant::Nil => None,
    }
}

fn binary_result_type(op: &BinaryOp, lhs: Option<&SwiftType>, rhs: Option<&SwiftType>, interner: &mut Interner) -> Option<SwiftType> {
    match op {
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge
        | BinaryOp::And
        | BinaryOp::Or => Some(named(interner, "Bool")),
        BinaryOp::RangeHalfOpen | BinaryOp::RangeClosed => None,
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::Mod
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr => match (lhs, rhs) {
            (Some(l), Some(r)) if l == r => Some(l.clone()),
            _ => None,
        },
    }
}

fn unary_result_type(op: &UnaryOp, operand: Option<&SwiftType>, interner: &mut Interner) -> Option<SwiftType> {
    match op {
        UnaryOp::Not => Some(named(interner, "Bool")),
        UnaryOp::Neg
        | UnaryOp::BitNot
        | UnaryOp::PreInc
        | UnaryOp::PreDec
        | UnaryOp::PostInc
        | UnaryOp::PostDec => operand.cloned(),
        UnaryOp::AddressOf | UnaryOp::Deref => None,
    }
}

struct Scope {
    frames: Vec<HashMap<String, SwiftType>>,
}

impl Scope {
    fn new() -> Self {
        Self { frames: vec![HashMap::new()] }
    }

    fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn declare(&mut self, name: &str, ty: SwiftType) {
        self.frames.last_mut().expect("scope stack is never empty").insert(name.to_string(), ty);
    }

    fn lookup(&self, name: &str) -> Option<&SwiftType> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

struct InferCtx<'a> {
    interner: &'a mut Interner,
    /// This type's own properties, for bare-self member access (`self.x`
    /// lowers to a plain `Identifier`, not `PostfixMember`, so the scope
    /// itself is seeded with these — see `run`).
    property_types: &'a HashMap<Symbol, HashMap<Symbol, SwiftType>>,
}

fn infer_expr(expr: &mut Expression, scope: &mut Scope, ctx: &mut InferCtx<'_>) -> bool {
    let mut changed = false;
    let resolved = match &mut expr.kind {
        ExpressionKind::Constant(c) => constant_type(ctx.interner, c),
        ExpressionKind::Identifier(name) => scope.lookup(name).cloned(),
        ExpressionKind::Binary { op, lhs, rhs } => {
            changed |= infer_expr(lhs, scope, ctx);
            changed |= infer_expr(rhs, scope, ctx);
            binary_result_type(op, lhs.resolved_type.as_ref(), rhs.resolved_type.as_ref(), ctx.interner)
        }
        ExpressionKind::Assignment { target, value, .. } => {
            changed |= infer_expr(target, scope, ctx);
            changed |= infer_expr(value, scope, ctx);
            target.resolved_type.clone()
        }
        ExpressionKind::PostfixCall { callee, arguments } => {
            changed |= infer_expr(callee, scope, ctx);
            for arg in arguments {
                changed |= infer_expr(&mut arg.value, scope, ctx);
            }
            None
        }
        ExpressionKind::PostfixSubscript { target, index } => {
            changed |= infer_expr(target, scope, ctx);
            changed |= infer_expr(index, scope, ctx);
            None
        }
        ExpressionKind::PostfixMember { target, member } => {
            changed |= infer_expr(target, scope, ctx);
            let type_name = target.resolved_type.as_ref().and_then(type_name_of);
            let member_sym = ctx.interner.intern(member);
            type_name
                .and_then(|type_name| ctx.property_types.get(&type_name))
                .and_then(|members| members.get(&member_sym))
                .cloned()
        }
        ExpressionKind::Unary { op, operand } => {
            changed |= infer_expr(operand, scope, ctx);
            unary_result_type(op, operand.resolved_type.as_ref(), ctx.interner)
        }
        ExpressionKind::Cast { operand, target, .. } => {
            changed |= infer_expr(operand, scope, ctx);
            Some(target.clone())
        }
        ExpressionKind::Ternary { cond, then_branch, else_branch } => {
            changed |= infer_expr(cond, scope, ctx);
            changed |= infer_expr(then_branch, scope, ctx);
            changed |= infer_expr(else_branch, scope, ctx);
            match (&then_branch.resolved_type, &else_branch.resolved_type) {
                (Some(t), Some(e)) if t == e => Some(t.clone()),
                _ => None,
            }
        }
        ExpressionKind::Parens(inner) => {
            changed |= infer_expr(inner, scope, ctx);
            inner.resolved_type.clone()
        }
        ExpressionKind::BlockLiteral { params, body } => {
            scope.push();
            for p in params {
                scope.declare(p, SwiftType::Void);
            }
            for s in body {
                changed |= infer_stmt(s, scope, ctx);
            }
            scope.pop();
            None
        }
        ExpressionKind::Unknown { .. } => None,
    };

    if expr.resolved_type != resolved {
        expr.resolved_type = resolved;
        changed = true;
    }
    changed
}

/// Unwraps `Optional` to find the nominal type's name underneath, so
/// `self.name?.count` style chains still resolve against the owning
/// type's property table.
fn type_name_of(ty: &SwiftType) -> Option<Symbol> {
    match ty {
        SwiftType::Named(sym) => Some(*sym),
        SwiftType::Optional(inner) => type_name_of(inner),
        _ => None,
    }
}

fn infer_stmt(stmt: &mut Statement, scope: &mut Scope, ctx: &mut InferCtx<'_>) -> bool {
    let mut changed = false;
    match &mut stmt.kind {
        StatementKind::Expression(e) => changed |= infer_expr(e, scope, ctx),
        StatementKind::VariableDeclaration(decls) => {
            for d in decls {
                if let Some(init) = &mut d.initializer {
                    changed |= infer_expr(init, scope, ctx);
                }
                scope.declare(&d.name, d.ty.clone());
            }
        }
        StatementKind::If { cond, then_branch, else_branch } => {
            changed |= infer_expr(cond, scope, ctx);
            changed |= infer_stmt(then_branch, scope, ctx);
            if let Some(e) = else_branch {
                changed |= infer_stmt(e, scope, ctx);
            }
        }
        StatementKind::Switch { subject, cases } => {
            changed |= infer_expr(subject, scope, ctx);
            for case in cases {
                for pattern in &mut case.patterns {
                    match pattern {
                        swiftify_core::ast::stmt::CasePattern::Value(e) => changed |= infer_expr(e, scope, ctx),
                        swiftify_core::ast::stmt::CasePattern::Range { lo, hi, .. } => {
                            changed |= infer_expr(lo, scope, ctx);
                            changed |= infer_expr(hi, scope, ctx);
                        }
                        swiftify_core::ast::stmt::CasePattern::Default => {}
                    }
                }
                scope.push();
                for s in &mut case.body {
                    changed |= infer_stmt(s, scope, ctx);
                }
                scope.pop();
            }
        }
        StatementKind::While { cond, body } => {
            changed |= infer_expr(cond, scope, ctx);
            changed |= infer_stmt(body, scope, ctx);
        }
        StatementKind::RepeatWhile { body, cond } => {
            changed |= infer_stmt(body, scope, ctx);
            changed |= infer_expr(cond, scope, ctx);
        }
        StatementKind::ForIn { variable, sequence, body } => {
            changed |= infer_expr(sequence, scope, ctx);
            scope.push();
            let element_ty = match sequence.resolved_type.clone() {
                Some(SwiftType::Array(elem)) => *elem,
                _ => SwiftType::Named(ctx.interner.intern("Int")),
            };
            scope.declare(variable, element_ty);
            changed |= infer_stmt(body, scope, ctx);
            scope.pop();
        }
        StatementKind::Do { body, catches } => {
            changed |= infer_stmt(body, scope, ctx);
            for c in catches {
                changed |= infer_stmt(c, scope, ctx);
            }
        }
        StatementKind::Defer(body) => changed |= infer_stmt(body, scope, ctx),
        StatementKind::Throw(e) => changed |= infer_expr(e, scope, ctx),
        StatementKind::Return(Some(e)) => changed |= infer_expr(e, scope, ctx),
        StatementKind::Compound(stmts) => {
            scope.push();
            for s in stmts {
                changed |= infer_stmt(s, scope, ctx);
            }
            scope.pop();
        }
        StatementKind::LocalFunction { params, body, .. } => {
            scope.push();
            for p in params {
                scope.declare(p, SwiftType::Void);
            }
            for s in body {
                changed |= infer_stmt(s, scope, ctx);
            }
            scope.pop();
        }
        StatementKind::Return(None)
        | StatementKind::Break { .. }
        | StatementKind::Continue { .. }
        | StatementKind::Fallthrough
        | StatementKind::Unknown { .. } => {}
    }
    changed
}

impl IntentionPass for InferExpressionTypes {
    fn name(&self) -> &'static str {
        "infer_expression_types"
    }

    fn run(&self, graph: &mut IntentionGraph, ctx: &mut PassContext<'_>) -> bool {
        let property_types = snapshot_property_types(graph);
        let mut changed = false;

        for &root in graph.roots() {
            let IntentionKind::File { types, globals, .. } = &graph.get(root).kind else { continue };
            let types = types.clone();
            let globals = globals.clone();

            for ty in types {
                if !graph.is_live(ty) {
                    continue;
                }
                let (own_members, methods, prop_bodies) = match &graph.get(ty).kind {
                    IntentionKind::Type { type_name, methods, properties, .. } => (
                        property_types.get(type_name).cloned().unwrap_or_default(),
                        methods.clone(),
                        properties.clone(),
                    ),
                    _ => continue,
                };

                for method in methods {
                    if !graph.is_live(method) {
                        continue;
                    }
                    let (body_id, params) = match &graph.get(method).kind {
                        IntentionKind::Method { signature, body, .. } => {
                            (*body, params_with_types(signature, ctx.interner))
                        }
                        _ => continue,
                    };
                    let Some(body_id) = body_id else { continue };
                    changed |= infer_body(graph, body_id, &own_members, &params, ctx.interner, &property_types);
                }

                for prop in prop_bodies {
                    let bodies: Vec<_> = match &graph.get(prop).kind {
                        IntentionKind::Property {
                            storage: swiftify_core::intention::graph::ValueStorage::Accessors { getter, setter },
                            ..
                        } => [*getter, *setter].into_iter().flatten().collect(),
                        _ => continue,
                    };
                    for body_id in bodies {
                        changed |= infer_body(graph, body_id, &own_members, &[], ctx.interner, &property_types);
                    }
                }
            }

            for global in globals {
                if !graph.is_live(global) {
                    continue;
                }
                let (body_id, params) = match &graph.get(global).kind {
                    IntentionKind::GlobalFunction { signature, body, .. } => {
                        (*body, params_with_types(signature, ctx.interner))
                    }
                    _ => continue,
                };
                let Some(body_id) = body_id else { continue };
                changed |= infer_body(graph, body_id, &HashMap::new(), &params, ctx.interner, &property_types);
            }
        }

        changed
    }
}

fn params_with_types(
    signature: &swiftify_core::intention::graph::MethodSignature,
    interner: &mut Interner,
) -> Vec<(String, SwiftType)> {
    signature
        .params
        .iter()
        .zip(signature.param_types.iter())
        .map(|(p, ty)| (interner.resolve(p.name).to_string(), ty.clone()))
        .collect()
}

fn infer_body(
    graph: &mut IntentionGraph,
    body_id: swiftify_core::intention::IntentionId,
    own_members: &HashMap<Symbol, SwiftType>,
    params: &[(String, SwiftType)],
    interner: &mut Interner,
    property_types: &HashMap<Symbol, HashMap<Symbol, SwiftType>>,
) -> bool {
    let IntentionKind::Body { statements } = &mut graph.get_mut(body_id).kind else {
        return false;
    };

    let mut scope = Scope::new();
    for (name, ty) in params {
        scope.declare(name, ty.clone());
    }
    for (sym, ty) in own_members {
        scope.declare(interner.resolve(*sym), ty.clone());
    }

    let mut ctx = InferCtx { interner, property_types };
    let mut changed = false;
    for stmt in statements.iter_mut() {
        changed |= infer_stmt(stmt, &mut scope, &mut ctx);
    }
    changed
}
