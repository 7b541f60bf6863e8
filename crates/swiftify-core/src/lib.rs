//! `swiftify-core`: the shared, parse-tree-agnostic model behind the
//! Objective-C → Swift translator — the intention graph, the Swift AST
//! it stores inside method/accessor bodies, and the control-flow graph
//! built over those bodies for the dead-code-elimination pass.
//!
//! This crate owns no parser and no emitter (§1 "Non-goals"): it is
//! handed already-lowered [`ast::stmt::Statement`] trees by
//! `swiftify-compiler`'s lowering layer and hands back a mutated
//! [`intention::IntentionGraph`] plus [`diagnostics::Diagnostics`].

pub mod ast;
pub mod cfg;
pub mod diagnostics;
pub mod interner;
pub mod intention;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use interner::{Interner, Symbol};
pub use span::{SourceId, Span};
