//! A per-pipeline-run string interner.
//!
//! Type names, member names, and selectors are compared and hashed on every
//! lookup-by-name operation and in nearly every intention pass (§10.2 of
//! SPEC_FULL.md). Interning them once into a `Copy`, O(1)-comparable
//! `Symbol` avoids repeated `String` hashing. The interner is created once
//! per `Pipeline::run` and threaded explicitly alongside the intention
//! graph; it is never global or thread-local state.

use indexmap::IndexSet;
use std::fmt;

/// A cheap, `Copy` handle over a deduplicated string held by an [`Interner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Deduplicated string table for one translation run.
#[derive(Debug, Default)]
pub struct Interner {
    strings: IndexSet<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the existing symbol if already present.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(idx) = self.strings.get_index_of(text) {
            return Symbol(idx as u32);
        }
        let (idx, _) = self.strings.insert_full(text.into());
        Symbol(idx as u32)
    }

    /// Resolve a symbol back to its string. Panics if the symbol was not
    /// produced by this interner, which would indicate a programmer error
    /// (mixing interners across pipeline runs).
    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.strings
            .get_index(symbol.0 as usize)
            .expect("Symbol resolved against a foreign Interner")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
