//! Lowering tests for the concrete scenarios and invariants of §8.

use swiftify_core::ast::expr::{AssignOp, BinaryOp, Constant, ExpressionKind};
use swiftify_core::ast::stmt::{CasePattern, StatementKind};
use swiftify_core::{Diagnostics, Interner, SourceId, Span};

use crate::lower::{lower_stmt, LowerCtx};
use crate::parse_tree::{
    ObjcAssignOp, ObjcBinaryOp, ObjcCaseLabel, ObjcExpr, ObjcExprKind, ObjcStmt, ObjcStmtKind,
    ObjcSwitchCase, ObjcUnaryOp, ObjcVarDeclarator,
};
use crate::type_mapper::TypeMapperContext;

fn span() -> Span {
    Span::new(SourceId::new(0), 0, 1)
}

fn int_lit(v: i64) -> ObjcExpr {
    ObjcExpr::new(ObjcExprKind::IntLiteral(v), span())
}

fn ident(name: &str) -> ObjcExpr {
    ObjcExpr::new(ObjcExprKind::Identifier(name.to_string()), span())
}

fn with_ctx<R>(f: impl FnOnce(&mut LowerCtx<'_>) -> R) -> R {
    let mut interner = Interner::new();
    let mut diagnostics = Diagnostics::new();
    let types = TypeMapperContext::new();
    let mut ctx = LowerCtx {
        interner: &mut interner,
        diagnostics: &mut diagnostics,
        types: &types,
        source: SourceId::new(0),
        in_nonnull_context: false,
    };
    f(&mut ctx)
}

/// §8 scenario 1: `for(int i = 0; i < 10; i++) { a[i] = 0; }` recognises
/// as a counted loop and lowers to `for i in 0..<10 { a[i] = 0 }`.
#[test]
fn counted_loop_with_literal_bound_lowers_to_half_open_range() {
    let assign = ObjcExpr::new(
        ObjcExprKind::Assign {
            op: ObjcAssignOp::Assign,
            target: Box::new(ObjcExpr::new(
                ObjcExprKind::Subscript { target: Box::new(ident("a")), index: Box::new(ident("i")) },
                span(),
            )),
            value: Box::new(int_lit(0)),
        },
        span(),
    );
    let body = ObjcStmt::new(ObjcStmtKind::Compound(vec![ObjcStmt::new(ObjcStmtKind::Expr(assign), span())]), span());

    let init = ObjcStmt::new(
        ObjcStmtKind::VarDecl(vec![ObjcVarDeclarator {
            name: "i".to_string(),
            type_spelling: "int".to_string(),
            qualifier: None,
            is_const: false,
            initializer: Some(int_lit(0)),
        }]),
        span(),
    );
    let cond = ObjcExpr::new(
        ObjcExprKind::Binary { op: ObjcBinaryOp::Lt, lhs: Box::new(ident("i")), rhs: Box::new(int_lit(10)) },
        span(),
    );
    let step = ObjcExpr::new(ObjcExprKind::Unary { op: ObjcUnaryOp::PostInc, operand: Box::new(ident("i")) }, span());
    let for_stmt = ObjcStmt::new(
        ObjcStmtKind::For { init: Some(Box::new(init)), cond: Some(cond), step: Some(step), body: Box::new(body) },
        span(),
    );

    let lowered = with_ctx(|ctx| lower_stmt(ctx, &for_stmt));
    assert_eq!(lowered.len(), 1);
    match &lowered[0].kind {
        StatementKind::ForIn { variable, sequence, .. } => {
            assert_eq!(variable, "i");
            match &sequence.kind {
                ExpressionKind::Binary { op, lhs, rhs } => {
                    assert_eq!(*op, BinaryOp::RangeHalfOpen);
                    assert_eq!(lhs.kind, ExpressionKind::Constant(Constant::Int(0)));
                    assert_eq!(rhs.kind, ExpressionKind::Constant(Constant::Int(10)));
                }
                other => panic!("expected Binary range expression, got {other:?}"),
            }
        }
        other => panic!("expected ForIn, got {other:?}"),
    }
}

/// §8 scenario 2: a non-literal upper bound (`i <= n` with `n` an
/// identifier, not a literal) does not qualify as a counted loop and
/// falls back to the general `while`-with-`defer` lowering.
#[test]
fn non_literal_bound_falls_back_to_general_while_form() {
    let body = ObjcStmt::new(
        ObjcStmtKind::Compound(vec![ObjcStmt::new(
            ObjcStmtKind::Expr(ObjcExpr::new(
                ObjcExprKind::Assign {
                    op: ObjcAssignOp::AddAssign,
                    target: Box::new(ident("sum")),
                    value: Box::new(ident("i")),
                },
                span(),
            )),
            span(),
        )]),
        span(),
    );
    let init = ObjcStmt::new(
        ObjcStmtKind::VarDecl(vec![ObjcVarDeclarator {
            name: "i".to_string(),
            type_spelling: "int".to_string(),
            qualifier: None,
            is_const: false,
            initializer: Some(int_lit(1)),
        }]),
        span(),
    );
    let cond = ObjcExpr::new(
        ObjcExprKind::Binary { op: ObjcBinaryOp::Le, lhs: Box::new(ident("i")), rhs: Box::new(ident("n")) },
        span(),
    );
    let step = ObjcExpr::new(ObjcExprKind::Unary { op: ObjcUnaryOp::PostInc, operand: Box::new(ident("i")) }, span());
    let for_stmt = ObjcStmt::new(
        ObjcStmtKind::For { init: Some(Box::new(init)), cond: Some(cond), step: Some(step), body: Box::new(body) },
        span(),
    );

    let lowered = with_ctx(|ctx| lower_stmt(ctx, &for_stmt));
    // init statement followed by the while loop.
    assert_eq!(lowered.len(), 2);
    assert!(matches!(lowered[0].kind, StatementKind::VariableDeclaration(_)));
    match &lowered[1].kind {
        StatementKind::While { body, .. } => match &body.kind {
            StatementKind::Compound(stmts) => {
                assert!(matches!(stmts[0].kind, StatementKind::Defer(_)));
            }
            other => panic!("expected Compound, got {other:?}"),
        },
        other => panic!("expected While, got {other:?}"),
    }
}

/// §8 scenario 3: `@synchronized(self) { x = 1; }` lowers to
/// `do { let _lockTarget = self; objc_sync_enter(_lockTarget); defer { objc_sync_exit(_lockTarget) }; x = 1 }`.
#[test]
fn synchronized_lowers_to_do_block_with_enter_and_deferred_exit() {
    let assign = ObjcExpr::new(
        ObjcExprKind::Assign { op: ObjcAssignOp::Assign, target: Box::new(ident("x")), value: Box::new(int_lit(1)) },
        span(),
    );
    let sync = ObjcStmt::new(
        ObjcStmtKind::Synchronized {
            lock_expr: ident("self"),
            body: vec![ObjcStmt::new(ObjcStmtKind::Expr(assign), span())],
        },
        span(),
    );

    let lowered = with_ctx(|ctx| lower_stmt(ctx, &sync));
    assert_eq!(lowered.len(), 1);
    match &lowered[0].kind {
        StatementKind::Do { body, catches } => {
            assert!(catches.is_empty());
            match &body.kind {
                StatementKind::Compound(stmts) => {
                    assert!(matches!(stmts[0].kind, StatementKind::VariableDeclaration(_)));
                    assert!(matches!(stmts[1].kind, StatementKind::Expression(_)));
                    assert!(matches!(stmts[2].kind, StatementKind::Defer(_)));
                    assert!(matches!(stmts[3].kind, StatementKind::Expression(_)));
                }
                other => panic!("expected Compound, got {other:?}"),
            }
        }
        other => panic!("expected Do, got {other:?}"),
    }
}

/// §8 scenario 4 / "Switch exhaustiveness": `switch(x){ case 1: f(); break; }`
/// lowers to `switch x { case 1: f(); default: break }`.
#[test]
fn switch_without_default_gets_synthetic_default_break() {
    let call = ObjcExpr::new(
        ObjcExprKind::Call { callee: Box::new(ident("f")), args: vec![] },
        span(),
    );
    let switch = ObjcStmt::new(
        ObjcStmtKind::Switch {
            subject: ident("x"),
            cases: vec![ObjcSwitchCase {
                labels: vec![ObjcCaseLabel::IntLiteral(1)],
                body: vec![ObjcStmt::new(ObjcStmtKind::Expr(call), span()), ObjcStmt::new(ObjcStmtKind::Break, span())],
                span: span(),
            }],
        },
        span(),
    );

    let lowered = with_ctx(|ctx| lower_stmt(ctx, &switch));
    match &lowered[0].kind {
        StatementKind::Switch { cases, .. } => {
            assert_eq!(cases.len(), 2);
            // The explicit `break` that only terminated the C case is dropped.
            assert_eq!(cases[0].body.len(), 1);
            assert!(!cases[0].falls_through);
            assert_eq!(cases[1].patterns, vec![CasePattern::Default]);
            assert!(matches!(cases[1].body[0].kind, StatementKind::Break { label: None }));
        }
        other => panic!("expected Switch, got {other:?}"),
    }
}

/// Counted-loop faithfulness (§8): a loop variable reassigned inside its
/// own body disqualifies the counted-loop recognition even though the
/// header otherwise matches exactly, falling back to the general form.
#[test]
fn loop_variable_reassigned_in_body_disqualifies_counted_recognition() {
    let reassign = ObjcExpr::new(
        ObjcExprKind::Assign { op: ObjcAssignOp::Assign, target: Box::new(ident("i")), value: Box::new(int_lit(0)) },
        span(),
    );
    let body = ObjcStmt::new(ObjcStmtKind::Compound(vec![ObjcStmt::new(ObjcStmtKind::Expr(reassign), span())]), span());

    let init = ObjcStmt::new(
        ObjcStmtKind::VarDecl(vec![ObjcVarDeclarator {
            name: "i".to_string(),
            type_spelling: "int".to_string(),
            qualifier: None,
            is_const: false,
            initializer: Some(int_lit(0)),
        }]),
        span(),
    );
    let cond = ObjcExpr::new(
        ObjcExprKind::Binary { op: ObjcBinaryOp::Lt, lhs: Box::new(ident("i")), rhs: Box::new(int_lit(10)) },
        span(),
    );
    let step = ObjcExpr::new(ObjcExprKind::Unary { op: ObjcUnaryOp::PostInc, operand: Box::new(ident("i")) }, span());
    let for_stmt = ObjcStmt::new(
        ObjcStmtKind::For { init: Some(Box::new(init)), cond: Some(cond), step: Some(step), body: Box::new(body) },
        span(),
    );

    let lowered = with_ctx(|ctx| lower_stmt(ctx, &for_stmt));
    assert!(lowered.iter().all(|s| !matches!(s.kind, StatementKind::ForIn { .. })));
}

/// Lowering totality (§8): a parse-tree context the lowerer has no rule
/// for degrades to an `unknown` statement, never a panic.
#[test]
fn unrecognized_statement_degrades_to_unknown() {
    let stmt = ObjcStmt::new(ObjcStmtKind::Unrecognized("#pragma mark - Section".to_string()), span());
    let lowered = with_ctx(|ctx| lower_stmt(ctx, &stmt));
    assert_eq!(lowered.len(), 1);
    assert!(lowered[0].is_unknown());
}

/// AssignOp::AddAssign still round-trips through `lower_expr` when used
/// outside a counted-loop context (regression guard for the op-mapping table).
#[test]
fn compound_assignment_operator_maps_through() {
    use crate::lower::lower_expr;
    let expr = ObjcExpr::new(
        ObjcExprKind::Assign { op: ObjcAssignOp::AddAssign, target: Box::new(ident("sum")), value: Box::new(int_lit(1)) },
        span(),
    );
    let lowered = with_ctx(|ctx| lower_expr(ctx, &expr));
    match lowered.kind {
        ExpressionKind::Assignment { op, .. } => assert_eq!(op, AssignOp::AddAssign),
        other => panic!("expected Assignment, got {other:?}"),
    }
}
