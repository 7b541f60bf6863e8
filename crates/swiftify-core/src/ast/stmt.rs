//! The Swift statement AST (§3.2).

use crate::ast::expr::Expression;
use crate::ast::ty::{Ownership, SwiftType};
use crate::span::Span;

/// A pattern in a `switch` case label list (§4.1 "Selection").
#[derive(Debug, Clone, PartialEq)]
pub enum CasePattern {
    Value(Expression),
    Range { lo: Expression, hi: Expression, inclusive: bool },
    /// The synthesised-or-explicit `default:` branch.
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub patterns: Vec<CasePattern>,
    pub body: Vec<Statement>,
    /// Whether this case's body ends in a C-style `fallthrough` to the
    /// next case (§4.3 "switch": "fallthrough inserts an edge ...").
    pub falls_through: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    pub name: String,
    pub ty: SwiftType,
    pub ownership: Ownership,
    pub is_const: bool,
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Expression(Expression),
    VariableDeclaration(Vec<VariableDeclarator>),
    If { cond: Expression, then_branch: Box<Statement>, else_branch: Option<Box<Statement>> },
    Switch { subject: Expression, cases: Vec<SwitchCase> },
    While { cond: Expression, body: Box<Statement> },
    RepeatWhile { body: Box<Statement>, cond: Expression },
    /// `for v in a..<b` / `for v in a...b` / `for v in e` (§4.1 "Iteration").
    ForIn { variable: String, sequence: Expression, body: Box<Statement> },
    Do { body: Box<Statement>, catches: Vec<Statement> },
    Defer(Box<Statement>),
    Throw(Expression),
    Break { label: Option<String> },
    Continue { label: Option<String> },
    Fallthrough,
    Return(Option<Expression>),
    Compound(Vec<Statement>),
    /// A Swift local function declaration (nested `func`).
    LocalFunction { name: String, params: Vec<String>, body: Vec<Statement> },
    /// A construct lowering had no rule for (§4.1 "Failure semantics",
    /// §7 category 1). `source_text` is reproduced verbatim by the
    /// emitter as a block comment.
    Unknown { source_text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
    pub label: Option<String>,
    pub leading_comments: Vec<String>,
    pub trailing_comments: Vec<String>,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self {
            kind,
            span,
            label: None,
            leading_comments: Vec::new(),
            trailing_comments: Vec::new(),
        }
    }

    pub fn unknown(source_text: impl Into<String>, span: Span) -> Self {
        Self::new(StatementKind::Unknown { source_text: source_text.into() }, span)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, StatementKind::Unknown { .. })
    }

    /// `true` for statements that unconditionally transfer control away
    /// (used by the counted-loop general-form lowering's `defer` wiring
    /// and by CFG construction for `throw`/`return`/infinite loops).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            StatementKind::Return(_)
                | StatementKind::Throw(_)
                | StatementKind::Break { .. }
                | StatementKind::Continue { .. }
                | StatementKind::Fallthrough
        )
    }

    /// A `CompoundStatement` directly nested inside another is flattened
    /// during lowering (§3.2 invariant); this helper performs that
    /// flattening for a just-built statement list.
    pub fn flatten_compound(statements: Vec<Statement>) -> Vec<Statement> {
        let mut flat = Vec::with_capacity(statements.len());
        for stmt in statements {
            match stmt.kind {
                StatementKind::Compound(inner) if stmt.label.is_none() => {
                    flat.extend(Statement::flatten_compound(inner));
                }
                _ => flat.push(stmt),
            }
        }
        flat
    }

    /// Visits every expression directly owned by this statement (not
    /// recursing into nested statement bodies' own sub-statements beyond
    /// what `visit` itself does). Used by the counted-loop assignment
    /// check to walk "all expression positions including nested blocks".
    pub fn visit_expressions<'a>(&'a self, visit: &mut dyn FnMut(&'a Expression)) {
        match &self.kind {
            StatementKind::Expression(e) => visit(e),
            StatementKind::VariableDeclaration(decls) => {
                for d in decls {
                    if let Some(init) = &d.initializer {
                        visit(init);
                    }
                }
            }
            StatementKind::If { cond, then_branch, else_branch } => {
                visit(cond);
                then_branch.visit_expressions(visit);
                if let Some(e) = else_branch {
                    e.visit_expressions(visit);
                }
            }
            StatementKind::Switch { subject, cases } => {
                visit(subject);
                for case in cases {
                    for pattern in &case.patterns {
                        match pattern {
                            CasePattern::Value(e) => visit(e),
                            CasePattern::Range { lo, hi, .. } => {
                                visit(lo);
                                visit(hi);
                            }
                            CasePattern::Default => {}
                        }
                    }
                    for stmt in &case.body {
                        stmt.visit_expressions(visit);
                    }
                }
            }
            StatementKind::While { cond, body } => {
                visit(cond);
                body.visit_expressions(visit);
            }
            StatementKind::RepeatWhile { body, cond } => {
                body.visit_expressions(visit);
                visit(cond);
            }
            StatementKind::ForIn { sequence, body, .. } => {
                visit(sequence);
                body.visit_expressions(visit);
            }
            StatementKind::Do { body, catches } => {
                body.visit_expressions(visit);
                for c in catches {
                    c.visit_expressions(visit);
                }
            }
            StatementKind::Defer(body) => body.visit_expressions(visit),
            StatementKind::Throw(e) => visit(e),
            StatementKind::Return(Some(e)) => visit(e),
            StatementKind::Compound(stmts) => {
                for s in stmts {
                    s.visit_expressions(visit);
                }
            }
            StatementKind::LocalFunction { body, .. } => {
                for s in body {
                    s.visit_expressions(visit);
                }
            }
            StatementKind::Return(None)
            | StatementKind::Break { .. }
            | StatementKind::Continue { .. }
            | StatementKind::Fallthrough
            | StatementKind::Unknown { .. } => {}
        }
    }
}
