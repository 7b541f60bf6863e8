//! Statement/expression AST lowering (§4.1): translates the
//! Objective-C-shaped tree in [`crate::parse_tree`] into the Swift AST
//! `swiftify-core` owns.
//!
//! Dispatch is a flat match over the closed `ObjcStmtKind`/`ObjcExprKind`
//! tags rather than a virtual visitor chain (§9 "Visitor dispatch").
//! Translation never fails: anything lowering has no rule for degrades
//! to `Statement::Unknown`/`Expression::Unknown` and is reported through
//! `Diagnostics`, never returned as an error (§4.1 "Failure semantics",
//! §7 category 1).

use swiftify_core::ast::expr::{Argument, AssignOp, BinaryOp, Constant, Expression, ExpressionKind, UnaryOp};
use swiftify_core::ast::stmt::{
    CasePattern, Statement, StatementKind, SwitchCase, VariableDeclarator,
};
use swiftify_core::ast::ty::{Ownership, SwiftType};
use swiftify_core::diagnostics::DiagnosticKind;
use swiftify_core::intention::{IntentionGraph, IntentionId};
use swiftify_core::{Diagnostics, Interner, SourceId, Span};

use crate::parse_tree::{
    ObjcArgument, ObjcAssignOp, ObjcBinaryOp, ObjcCaseLabel, ObjcExpr, ObjcExprKind, ObjcQualifier,
    ObjcStmt, ObjcStmtKind, ObjcSwitchCase, ObjcUnaryOp, ObjcVarDeclarator,
};
use crate::type_mapper::{self, TypeMapperContext};

/// Threaded through every `lower_*` call (§9 "per-pipeline-run context
/// passed explicitly", mirroring the interner and the type mapper's own
/// context).
pub struct LowerCtx<'a> {
    pub interner: &'a mut Interner,
    pub diagnostics: &'a mut Diagnostics,
    pub types: &'a TypeMapperContext,
    pub source: SourceId,
    /// Whether the enclosing type/file was collected inside an
    /// `NS_ASSUME_NONNULL_BEGIN/END` span (§3.1); used only as the
    /// default nullability of a pointer spelling that carries no
    /// explicit `nullable`/`nonnull` qualifier.
    pub in_nonnull_context: bool,
}

impl LowerCtx<'_> {
    fn unrecognized_stmt(&mut self, rule: &str, span: Span) -> Statement {
        self.diagnostics.report(DiagnosticKind::UnrecognisedRule { rule: rule.to_string() }, span);
        Statement::unknown(rule, span)
    }
}

/// Looks for an explicit `nullable`/`__nullable`/`nonnull`/`__nonnull`
/// qualifier in a spelled type; falls back to `default_nullable` (the
/// enclosing nonnull-context default) when neither appears.
fn resolve_nullability(spelling: &str, default_nullable: bool) -> bool {
    if spelling.contains("nonnull") {
        false
    } else if spelling.contains("nullable") {
        true
    } else {
        default_nullable
    }
}

fn map_var_type(ctx: &LowerCtx<'_>, spelling: &str) -> SwiftType {
    let nullable = resolve_nullability(spelling, !ctx.in_nonnull_context);
    type_mapper::map_type(ctx.types, ctx.interner, spelling, nullable)
}

fn ownership_of(qualifier: Option<ObjcQualifier>) -> Ownership {
    match qualifier {
        Some(ObjcQualifier::Weak) => Ownership::Weak,
        Some(ObjcQualifier::UnsafeUnretained) => Ownership::Unowned,
        Some(ObjcQualifier::Strong) | None => Ownership::Strong,
    }
}

fn lower_var_declarator(ctx: &mut LowerCtx<'_>, decl: &ObjcVarDeclarator) -> VariableDeclarator {
    VariableDeclarator {
        name: decl.name.clone(),
        ty: map_var_type(ctx, &decl.type_spelling),
        ownership: ownership_of(decl.qualifier),
        is_const: decl.is_const,
        initializer: decl.initializer.as_ref().map(|e| lower_expr(ctx, e)),
    }
}

fn lower_argument(ctx: &mut LowerCtx<'_>, arg: &ObjcArgument) -> Argument {
    Argument { label: arg.label.clone(), value: lower_expr(ctx, &arg.value) }
}

fn map_binary_op(op: ObjcBinaryOp) -> BinaryOp {
    match op {
        ObjcBinaryOp::Add => BinaryOp::Add,
        ObjcBinaryOp::Sub => BinaryOp::Sub,
        ObjcBinaryOp::Mul => BinaryOp::Mul,
        ObjcBinaryOp::Div => BinaryOp::Div,
        ObjcBinaryOp::Mod => BinaryOp::Mod,
        ObjcBinaryOp::Eq => BinaryOp::Eq,
        ObjcBinaryOp::Ne => BinaryOp::Ne,
        ObjcBinaryOp::Lt => BinaryOp::Lt,
        ObjcBinaryOp::Le => BinaryOp::Le,
        ObjcBinaryOp::Gt => BinaryOp::Gt,
        ObjcBinaryOp::Ge => BinaryOp::Ge,
        ObjcBinaryOp::And => BinaryOp::And,
        ObjcBinaryOp::Or => BinaryOp::Or,
        ObjcBinaryOp::BitAnd => BinaryOp::BitAnd,
        ObjcBinaryOp::BitOr => BinaryOp::BitOr,
        ObjcBinaryOp::BitXor => BinaryOp::BitXor,
        ObjcBinaryOp::Shl => BinaryOp::Shl,
        ObjcBinaryOp::Shr => BinaryOp::Shr,
    }
}

fn map_unary_op(op: ObjcUnaryOp) -> UnaryOp {
    match op {
        ObjcUnaryOp::Neg => UnaryOp::Neg,
        ObjcUnaryOp::Not => UnaryOp::Not,
        ObjcUnaryOp::BitNot => UnaryOp::BitNot,
        ObjcUnaryOp::PreInc => UnaryOp::PreInc,
        ObjcUnaryOp::PreDec => UnaryOp::PreDec,
        ObjcUnaryOp::PostInc => UnaryOp::PostInc,
        ObjcUnaryOp::PostDec => UnaryOp::PostDec,
        ObjcUnaryOp::AddressOf => UnaryOp::AddressOf,
        ObjcUnaryOp::Deref => UnaryOp::Deref,
    }
}

fn map_assign_op(op: ObjcAssignOp) -> AssignOp {
    match op {
        ObjcAssignOp::Assign => AssignOp::Assign,
        ObjcAssignOp::AddAssign => AssignOp::AddAssign,
        ObjcAssignOp::SubAssign => AssignOp::SubAssign,
        ObjcAssignOp::MulAssign => AssignOp::MulAssign,
        ObjcAssignOp::DivAssign => AssignOp::DivAssign,
        ObjcAssignOp::ModAssign => AssignOp::ModAssign,
    }
}

pub fn lower_expr(ctx: &mut LowerCtx<'_>, expr: &ObjcExpr) -> Expression {
    let span = expr.span;
    let kind = match &expr.kind {
        ObjcExprKind::IntLiteral(v) => ExpressionKind::Constant(Constant::Int(*v)),
        ObjcExprKind::DoubleLiteral(v) => ExpressionKind::Constant(Constant::Double(*v)),
        ObjcExprKind::BoolLiteral(v) => ExpressionKind::Constant(Constant::Bool(*v)),
        ObjcExprKind::StringLiteral(v) => ExpressionKind::Constant(Constant::String(v.clone())),
        ObjcExprKind::Nil => ExpressionKind::Constant(Constant::Nil),
        ObjcExprKind::Identifier(name) => ExpressionKind::Identifier(name.clone()),
        ObjcExprKind::Binary { op, lhs, rhs } => ExpressionKind::Binary {
            op: map_binary_op(*op),
            lhs: Box::new(lower_expr(ctx, lhs)),
            rhs: Box::new(lower_expr(ctx, rhs)),
        },
        ObjcExprKind::Assign { op, target, value } => ExpressionKind::Assignment {
            op: map_assign_op(*op),
            target: Box::new(lower_expr(ctx, target)),
            value: Box::new(lower_expr(ctx, value)),
        },
        ObjcExprKind::Call { callee, args } => ExpressionKind::PostfixCall {
            callee: Box::new(lower_expr(ctx, callee)),
            arguments: args.iter().map(|a| lower_argument(ctx, a)).collect(),
        },
        ObjcExprKind::Subscript { target, index } => ExpressionKind::PostfixSubscript {
            target: Box::new(lower_expr(ctx, target)),
            index: Box::new(lower_expr(ctx, index)),
        },
        ObjcExprKind::Member { target, member } => ExpressionKind::PostfixMember {
            target: Box::new(lower_expr(ctx, target)),
            member: member.clone(),
        },
        ObjcExprKind::Unary { op, operand } => {
            ExpressionKind::Unary { op: map_unary_op(*op), operand: Box::new(lower_expr(ctx, operand)) }
        }
        ObjcExprKind::Cast { type_spelling, operand } => ExpressionKind::Cast {
            operand: Box::new(lower_expr(ctx, operand)),
            // Objective-C's C-style cast has no checked/optional form;
            // always lower to a forced cast (§4.1).
            target: map_var_type(ctx, type_spelling),
            forced: true,
        },
        ObjcExprKind::Ternary { cond, then_branch, else_branch } => ExpressionKind::Ternary {
            cond: Box::new(lower_expr(ctx, cond)),
            then_branch: Box::new(lower_expr(ctx, then_branch)),
            else_branch: Box::new(lower_expr(ctx, else_branch)),
        },
        ObjcExprKind::BlockLiteral { params, body } => ExpressionKind::BlockLiteral {
            params: params.clone(),
            body: lower_block(ctx, body),
        },
        ObjcExprKind::Paren(inner) => ExpressionKind::Parens(Box::new(lower_expr(ctx, inner))),
        ObjcExprKind::Unrecognized(text) => {
            ctx.diagnostics.report(DiagnosticKind::UnrecognisedRule { rule: text.clone() }, span);
            ExpressionKind::Unknown { source_text: text.clone() }
        }
    };
    Expression::new(kind, span)
}

/// Lowers a sequence of sibling statements, flattening any directly
/// nested compound produced along the way (§3.2 invariant).
pub fn lower_block(ctx: &mut LowerCtx<'_>, stmts: &[ObjcStmt]) -> Vec<Statement> {
    let lowered = stmts.iter().flat_map(|s| lower_stmt(ctx, s)).collect();
    Statement::flatten_compound(lowered)
}

fn ident_call(name: &str, args: Vec<Expression>, span: Span) -> Expression {
    Expression::new(
        ExpressionKind::PostfixCall {
            callee: Box::new(Expression::new(ExpressionKind::Identifier(name.to_string()), span)),
            arguments: args.into_iter().map(|value| Argument { label: None, value }).collect(),
        },
        span,
    )
}

fn ident(name: &str, span: Span) -> Expression {
    Expression::new(ExpressionKind::Identifier(name.to_string()), span)
}

/// Lowers `@synchronized(e) { body }` to
/// `do { let _lockTarget = e; objc_sync_enter(_lockTarget); defer { objc_sync_exit(_lockTarget) }; body }`
/// (§4.1 "Synchronisation").
fn lower_synchronized(ctx: &mut LowerCtx<'_>, lock_expr: &ObjcExpr, body: &[ObjcStmt], span: Span) -> Statement {
    let lock = lower_expr(ctx, lock_expr);
    let decl = Statement::new(
        StatementKind::VariableDeclaration(vec![VariableDeclarator {
            name: "_lockTarget".to_string(),
            ty: SwiftType::Named(ctx.interner.intern("AnyObject")),
            ownership: Ownership::Strong,
            is_const: true,
            initializer: Some(lock),
        }]),
        span,
    );
    let enter = Statement::new(
        StatementKind::Expression(ident_call("objc_sync_enter", vec![ident("_lockTarget", span)], span)),
        span,
    );
    let exit_call = Statement::new(
        StatementKind::Expression(ident_call("objc_sync_exit", vec![ident("_lockTarget", span)], span)),
        span,
    );
    let deferred = Statement::new(StatementKind::Defer(Box::new(exit_call)), span);

    let mut block = vec![decl, enter, deferred];
    block.extend(lower_block(ctx, body));
    Statement::new(
        StatementKind::Do { body: Box::new(Statement::new(StatementKind::Compound(block), span)), catches: vec![] },
        span,
    )
}

/// Lowers `@autoreleasepool { body }` to `autoreleasepool { body }`
/// (§4.1 "Autorelease"), a call taking a trailing-closure body.
fn lower_autoreleasepool(ctx: &mut LowerCtx<'_>, body: &[ObjcStmt], span: Span) -> Statement {
    let closure = Expression::new(
        ExpressionKind::BlockLiteral { params: vec![], body: lower_block(ctx, body) },
        span,
    );
    Statement::new(
        StatementKind::Expression(ident_call("autoreleasepool", vec![closure], span)),
        span,
    )
}

/// Lowers `@try { body } @catch (...) { ... }... @finally { ... }` to
/// `Do { body, catches }`, folding `@finally` in as a `defer` prepended
/// to the try body (every catch handler still runs it via its own
/// control flow in Swift's `do`/`catch`, matching `@finally`'s
/// run-regardless semantics).
fn lower_try_catch(
    ctx: &mut LowerCtx<'_>,
    body: &[ObjcStmt],
    catches: &[(Option<String>, Vec<ObjcStmt>)],
    finally: &Option<Vec<ObjcStmt>>,
    span: Span,
) -> Statement {
    let mut lowered_body = Vec::new();
    if let Some(finally_stmts) = finally {
        let finally_body = lower_block(ctx, finally_stmts);
        lowered_body.push(Statement::new(
            StatementKind::Defer(Box::new(Statement::new(StatementKind::Compound(finally_body), span))),
            span,
        ));
    }
    lowered_body.extend(lower_block(ctx, body));

    let catch_stmts = catches
        .iter()
        .map(|(_name, catch_body)| Statement::new(StatementKind::Compound(lower_block(ctx, catch_body)), span))
        .collect();

    Statement::new(
        StatementKind::Do {
            body: Box::new(Statement::new(StatementKind::Compound(lowered_body), span)),
            catches: catch_stmts,
        },
        span,
    )
}

/// Recognises the counted-loop shape of a C-style `for` (§4.1, §8
/// "Counted-loop faithfulness"). Returns the loop variable name and
/// range bounds/kind when every required condition holds.
struct CountedLoop {
    variable: String,
    lo: ObjcExpr,
    hi: ObjcExpr,
    half_open: bool,
}

fn recognize_counted_loop(
    init: &Option<Box<ObjcStmt>>,
    cond: &Option<ObjcExpr>,
    step: &Option<ObjcExpr>,
    lowered_body: &[Statement],
) -> Option<CountedLoop> {
    let init = init.as_ref()?;
    let ObjcStmtKind::VarDecl(decls) = &init.kind else { return None };
    let [decl] = decls.as_slice() else { return None };
    let initializer = decl.initializer.as_ref()?;
    let variable = decl.name.clone();

    let cond = cond.as_ref()?;
    let ObjcExprKind::Binary { op, lhs, rhs } = &cond.kind else { return None };
    let half_open = match op {
        ObjcBinaryOp::Lt => true,
        ObjcBinaryOp::Le => false,
        _ => return None,
    };
    let ObjcExprKind::Identifier(cond_var) = &lhs.kind else { return None };
    if *cond_var != variable {
        return None;
    }
    if !matches!(rhs.kind, ObjcExprKind::IntLiteral(_) | ObjcExprKind::Identifier(_)) {
        return None;
    }
    if let ObjcExprKind::IntLiteral(_) = rhs.kind {
        // literal bound: always eligible
    } else {
        // A non-literal bound is never eligible: the upper bound must be
        // an integer literal, so other identifiers fall back to the
        // general lowering (§8 scenario 2).
        return None;
    }

    let step = step.as_ref()?;
    let step_var_matches = |name: &str| name == variable;
    let step_ok = match &step.kind {
        ObjcExprKind::Assign { op: ObjcAssignOp::AddAssign, target, value } => {
            matches!(&target.kind, ObjcExprKind::Identifier(n) if step_var_matches(n))
                && matches!(value.kind, ObjcExprKind::IntLiteral(1))
        }
        ObjcExprKind::Unary { op: ObjcUnaryOp::PostInc | ObjcUnaryOp::PreInc, operand } => {
            matches!(&operand.kind, ObjcExprKind::Identifier(n) if step_var_matches(n))
        }
        _ => false,
    };
    if !step_ok {
        return None;
    }

    let mut assigned_elsewhere = false;
    for stmt in lowered_body {
        stmt.visit_expressions(&mut |e| {
            e.visit_assignment_targets(&mut |name| {
                if name == variable {
                    assigned_elsewhere = true;
                }
            });
        });
    }
    if assigned_elsewhere {
        return None;
    }

    Some(CountedLoop { variable, lo: initializer.clone(), hi: rhs.as_ref().clone(), half_open })
}

fn lower_for(
    ctx: &mut LowerCtx<'_>,
    init: &Option<Box<ObjcStmt>>,
    cond: &Option<ObjcExpr>,
    step: &Option<ObjcExpr>,
    body: &ObjcStmt,
    span: Span,
) -> Vec<Statement> {
    let lowered_body = lower_stmt(ctx, body);

    if let Some(counted) = recognize_counted_loop(init, cond, step, &lowered_body) {
        let lo = lower_expr(ctx, &counted.lo);
        let hi = lower_expr(ctx, &counted.hi);
        let op = if counted.half_open { BinaryOp::RangeHalfOpen } else { BinaryOp::RangeClosed };
        let sequence = Expression::new(
            ExpressionKind::Binary { op, lhs: Box::new(lo), rhs: Box::new(hi) },
            span,
        );
        return vec![Statement::new(
            StatementKind::ForIn {
                variable: counted.variable,
                sequence,
                body: Box::new(Statement::new(StatementKind::Compound(lowered_body), span)),
            },
            span,
        )];
    }

    // General form (§4.1, §9 "open question" decision for missing cond):
    // `{ init; while (cond ?? true) { defer { step }; body } }`.
    ctx.diagnostics.report(
        DiagnosticKind::CountedLoopRejected { reason: "loop shape does not match the counted-loop pattern".into() },
        span,
    );

    let cond_expr = match cond {
        Some(c) => lower_expr(ctx, c),
        None => Expression::new(ExpressionKind::Constant(Constant::Bool(true)), span),
    };

    let mut while_body = Vec::new();
    if let Some(step_expr) = step {
        let step_stmt = Statement::new(StatementKind::Expression(lower_expr(ctx, step_expr)), span);
        while_body.push(Statement::new(StatementKind::Defer(Box::new(step_stmt)), span));
    }
    while_body.extend(lowered_body);

    let while_stmt = Statement::new(
        StatementKind::While {
            cond: cond_expr,
            body: Box::new(Statement::new(StatementKind::Compound(while_body), span)),
        },
        span,
    );

    match init {
        Some(init_stmt) => {
            let mut out = lower_stmt(ctx, init_stmt);
            out.push(while_stmt);
            out
        }
        None => vec![while_stmt],
    }
}

/// Lowers a `switch`'s cases (§4.1 "Selection", §8 "Switch
/// exhaustiveness"). A case's own trailing plain `break` is dropped (it
/// only terminated the C `switch`, which Swift's cases do by default);
/// a case with no terminal jump at all gets an explicit `fallthrough`
/// appended, since Swift's default is the opposite of C's. A synthetic
/// `default: break` is appended when the input has no default.
fn lower_switch_cases(ctx: &mut LowerCtx<'_>, cases: &[ObjcSwitchCase]) -> Vec<SwitchCase> {
    let mut has_default = false;
    let mut out = Vec::with_capacity(cases.len() + 1);

    for case in cases {
        let patterns = case
            .labels
            .iter()
            .map(|label| match label {
                ObjcCaseLabel::IntLiteral(v) => {
                    CasePattern::Value(Expression::new(ExpressionKind::Constant(Constant::Int(*v)), case.span))
                }
                ObjcCaseLabel::Range { lo, hi } => CasePattern::Range {
                    lo: Expression::new(ExpressionKind::Constant(Constant::Int(*lo)), case.span),
                    hi: Expression::new(ExpressionKind::Constant(Constant::Int(*hi)), case.span),
                    inclusive: true,
                },
                ObjcCaseLabel::Default => {
                    has_default = true;
                    CasePattern::Default
                }
            })
            .collect();

        let mut body = lower_block(ctx, &case.body);
        let ends_in_jump = body.last().is_some_and(Statement::is_terminal);
        let falls_through = if !ends_in_jump {
            body.push(Statement::new(StatementKind::Fallthrough, case.span));
            true
        } else if matches!(body.last().map(|s| &s.kind), Some(StatementKind::Break { label: None })) {
            // A bare `break` purely ends the C switch case; drop it, Swift
            // falls out of the case on its own.
            body.pop();
            false
        } else {
            false
        };

        out.push(SwitchCase { patterns, body, falls_through });
    }

    if !has_default {
        out.push(SwitchCase {
            patterns: vec![CasePattern::Default],
            body: vec![Statement::new(StatementKind::Break { label: None }, cases.first().map(|c| c.span).unwrap_or(Span::synthetic(ctx.source)))],
            falls_through: false,
        });
    }
    out
}

/// Lowers one Objective-C statement into zero-or-more Swift statements:
/// ordinary constructs produce exactly one, but the `for`-loop general
/// form can expand into a leading `init` statement plus the `while`
/// that follows it.
pub fn lower_stmt(ctx: &mut LowerCtx<'_>, stmt: &ObjcStmt) -> Vec<Statement> {
    let span = stmt.span;
    match &stmt.kind {
        ObjcStmtKind::Expr(e) => vec![Statement::new(StatementKind::Expression(lower_expr(ctx, e)), span)],

        ObjcStmtKind::VarDecl(decls) => {
            let declarators = decls.iter().map(|d| lower_var_declarator(ctx, d)).collect();
            vec![Statement::new(StatementKind::VariableDeclaration(declarators), span)]
        }

        ObjcStmtKind::If { cond, then_branch, else_branch } => {
            let cond = lower_expr(ctx, cond);
            let then_stmts = lower_stmt(ctx, then_branch);
            let then_branch = Box::new(Statement::new(StatementKind::Compound(then_stmts), span));
            let else_branch = else_branch.as_ref().map(|e| {
                let stmts = lower_stmt(ctx, e);
                Box::new(Statement::new(StatementKind::Compound(stmts), span))
            });
            vec![Statement::new(StatementKind::If { cond, then_branch, else_branch }, span)]
        }

        ObjcStmtKind::Switch { subject, cases } => {
            let subject = lower_expr(ctx, subject);
            let cases = lower_switch_cases(ctx, cases);
            vec![Statement::new(StatementKind::Switch { subject, cases }, span)]
        }

        ObjcStmtKind::While { cond, body } => {
            let cond = lower_expr(ctx, cond);
            let body_stmts = lower_stmt(ctx, body);
            vec![Statement::new(
                StatementKind::While { cond, body: Box::new(Statement::new(StatementKind::Compound(body_stmts), span)) },
                span,
            )]
        }

        ObjcStmtKind::DoWhile { body, cond } => {
            let body_stmts = lower_stmt(ctx, body);
            let cond = lower_expr(ctx, cond);
            vec![Statement::new(
                StatementKind::RepeatWhile { body: Box::new(Statement::new(StatementKind::Compound(body_stmts), span)), cond },
                span,
            )]
        }

        ObjcStmtKind::For { init, cond, step, body } => lower_for(ctx, init, cond, step, body, span),

        ObjcStmtKind::ForIn { var_name, collection, body } => {
            let sequence = lower_expr(ctx, collection);
            let body_stmts = lower_stmt(ctx, body);
            vec![Statement::new(
                StatementKind::ForIn {
                    variable: var_name.clone(),
                    sequence,
                    body: Box::new(Statement::new(StatementKind::Compound(body_stmts), span)),
                },
                span,
            )]
        }

        ObjcStmtKind::Synchronized { lock_expr, body } => vec![lower_synchronized(ctx, lock_expr, body, span)],
        ObjcStmtKind::Autoreleasepool { body } => vec![lower_autoreleasepool(ctx, body, span)],
        ObjcStmtKind::TryCatch { body, catches, finally } => {
            vec![lower_try_catch(ctx, body, catches, finally, span)]
        }

        ObjcStmtKind::Break => vec![Statement::new(StatementKind::Break { label: None }, span)],
        ObjcStmtKind::Continue => vec![Statement::new(StatementKind::Continue { label: None }, span)],
        ObjcStmtKind::Throw(e) => vec![Statement::new(StatementKind::Throw(lower_expr(ctx, e)), span)],
        ObjcStmtKind::Return(e) => {
            vec![Statement::new(StatementKind::Return(e.as_ref().map(|e| lower_expr(ctx, e))), span)]
        }
        ObjcStmtKind::Compound(stmts) => {
            vec![Statement::new(StatementKind::Compound(lower_block(ctx, stmts)), span)]
        }
        ObjcStmtKind::Unrecognized(text) => vec![ctx.unrecognized_stmt(text, span)],
    }
}

/// Lowers a method/accessor/global-function body and attaches it to
/// `owner` (§4.1, §6 "Output to lowering").
pub fn lower_method_body(
    graph: &mut IntentionGraph,
    ctx: &mut LowerCtx<'_>,
    owner: IntentionId,
    stmts: &[ObjcStmt],
) -> IntentionId {
    let body = lower_block(ctx, stmts);
    graph.set_method_body(owner, body)
}
