//! The Swift AST (§3.2): a closed sum type per node class, produced by
//! `swiftify_compiler`'s lowering code and consumed by the CFG builder,
//! the intention passes, and ultimately the emitter.

pub mod expr;
pub mod stmt;
pub mod ty;

pub use expr::{Argument, AssignOp, BinaryOp, Constant, Expression, ExpressionKind, UnaryOp};
pub use stmt::{CasePattern, Statement, StatementKind, SwitchCase, VariableDeclarator};
pub use ty::{Ownership, SwiftType};
