//! The Swift expression AST (§3.2).
//!
//! Every node is wrapped in [`Expression`], which carries the shared
//! `resolved_type` slot filled in by the expression-type-inference pass
//! (§4.4 item 5); it is `nil`/`None` at construction and stays `None` if
//! inference can't determine a type (§7 category 2).

use crate::ast::ty::SwiftType;
use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    /// `a..<b`, from a counted-loop `<`/half-open recognition (§4.1).
    RangeHalfOpen,
    /// `a...b`, from a counted-loop `<=`/closed recognition (§4.1).
    RangeClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    AddressOf,
    Deref,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Double(f64),
    Bool(bool),
    String(String),
    Nil,
}

/// A named or trailing-closure call argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub label: Option<String>,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Constant(Constant),
    Identifier(String),
    Binary { op: BinaryOp, lhs: Box<Expression>, rhs: Box<Expression> },
    Assignment { op: AssignOp, target: Box<Expression>, value: Box<Expression> },
    /// `f(a, b)` — postfix call on a callee expression.
    PostfixCall { callee: Box<Expression>, arguments: Vec<Argument> },
    /// `a[i]`.
    PostfixSubscript { target: Box<Expression>, index: Box<Expression> },
    /// `a.b`.
    PostfixMember { target: Box<Expression>, member: String },
    Unary { op: UnaryOp, operand: Box<Expression> },
    /// `e as T` / `e as! T` / `e as? T` — the Objective-C `(T)e` cast family.
    Cast { operand: Box<Expression>, target: SwiftType, forced: bool },
    Ternary { cond: Box<Expression>, then_branch: Box<Expression>, else_branch: Box<Expression> },
    /// A Swift closure literal, used for lowered Objective-C block literals.
    BlockLiteral { params: Vec<String>, body: Vec<crate::ast::stmt::Statement> },
    /// `(e)` — kept distinct from its inner expression so the emitter can
    /// decide whether parens are still syntactically required.
    Parens(Box<Expression>),
    /// A parse-tree context lowering had no rule for (§4.1 "Failure
    /// semantics"); `source_text` is the verbatim spelling for the emitter
    /// to reproduce as a comment.
    Unknown { source_text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
    pub resolved_type: Option<SwiftType>,
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span, resolved_type: None }
    }

    pub fn unknown(source_text: impl Into<String>, span: Span) -> Self {
        Self::new(ExpressionKind::Unknown { source_text: source_text.into() }, span)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, ExpressionKind::Unknown { .. })
    }

    /// Walks every assignment target nested in this expression, including
    /// through calls/subscripts/etc., invoking `visit` with each target's
    /// identifier name when the target is a bare identifier. Used by the
    /// counted-loop recogniser (§4.1, §8 "Counted-loop faithfulness") to
    /// check that the loop variable is never assigned inside the body.
    pub fn visit_assignment_targets<'a>(&'a self, visit: &mut dyn FnMut(&'a str)) {
        match &self.kind {
            ExpressionKind::Assignment { target, value, .. } => {
                if let ExpressionKind::Identifier(name) = &target.kind {
                    visit(name);
                }
                target.visit_assignment_targets(visit);
                value.visit_assignment_targets(visit);
            }
            ExpressionKind::Unary { op, operand } => {
                if matches!(
                    op,
                    UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
                ) {
                    if let ExpressionKind::Identifier(name) = &operand.kind {
                        visit(name);
                    }
                }
                operand.visit_assignment_targets(visit);
            }
            ExpressionKind::Binary { lhs, rhs, .. } => {
                lhs.visit_assignment_targets(visit);
                rhs.visit_assignment_targets(visit);
            }
            ExpressionKind::PostfixCall { callee, arguments } => {
                callee.visit_assignment_targets(visit);
                for arg in arguments {
                    arg.value.visit_assignment_targets(visit);
                }
            }
            ExpressionKind::PostfixSubscript { target, index } => {
                target.visit_assignment_targets(visit);
                index.visit_assignment_targets(visit);
            }
            ExpressionKind::PostfixMember { target, .. } => {
                target.visit_assignment_targets(visit);
            }
            ExpressionKind::Cast { operand, .. } => operand.visit_assignment_targets(visit),
            ExpressionKind::Ternary { cond, then_branch, else_branch } => {
                cond.visit_assignment_targets(visit);
                then_branch.visit_assignment_targets(visit);
                else_branch.visit_assignment_targets(visit);
            }
            ExpressionKind::Parens(inner) => inner.visit_assignment_targets(visit),
            ExpressionKind::BlockLiteral { body, .. } => {
                for stmt in body {
                    stmt.visit_expressions(&mut |e| e.visit_assignment_targets(visit));
                }
            }
            ExpressionKind::Constant(_) | ExpressionKind::Identifier(_) | ExpressionKind::Unknown { .. } => {}
        }
    }
}
