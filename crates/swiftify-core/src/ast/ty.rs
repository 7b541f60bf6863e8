//! The Swift-shaped type model that the type mapper (§4.5) produces and
//! that `Expression::resolved_type` (§3.2) is filled in with.

use crate::interner::Symbol;

/// A Swift type as synthesised by the type mapper or inferred by the
/// expression-type pass. Kept as a closed sum type (§9 "open sum types")
/// rather than a string so later passes can match on shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwiftType {
    /// `Bool`, `Int`, `String`, or any other bare nominal type, including
    /// ones the mapper did not recognise and passed through unchanged.
    Named(Symbol),
    /// `[T]`, from `NSArray<T> *`.
    Array(Box<SwiftType>),
    /// `[K: V]`, from `NSDictionary<K, V> *`.
    Dictionary(Box<SwiftType>, Box<SwiftType>),
    /// `T?`, from a nullable Objective-C pointer type outside a nonnull
    /// context.
    Optional(Box<SwiftType>),
    /// `P`, from `id<P>`.
    Protocol(Symbol),
    /// A block type, e.g. `(Int, String) -> Void`.
    Function { params: Vec<SwiftType>, returns: Box<SwiftType> },
    /// `UnsafeMutablePointer<T>`, from a pointer to a primitive type.
    UnsafeMutablePointer(Box<SwiftType>),
    /// `Void`, the mapping for Objective-C `void`.
    Void,
}

impl SwiftType {
    pub fn named(symbol: Symbol) -> Self {
        SwiftType::Named(symbol)
    }

    pub fn optional(self) -> Self {
        match self {
            // `T??` never arises from the mapper's rules; collapse it.
            already @ SwiftType::Optional(_) => already,
            other => SwiftType::Optional(Box::new(other)),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, SwiftType::Optional(_))
    }
}

/// Reference ownership qualifier, derived from Objective-C `__weak` /
/// `__unsafe_unretained` / the implicit strong default (§4.1 "Variable
/// declarations").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    #[default]
    Strong,
    Weak,
    Unowned,
}
