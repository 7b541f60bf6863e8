//! The intention graph (§3.1) and the read-only `Known-X` views over it
//! (§4.2, Glossary).

pub mod graph;
pub mod known;

pub use graph::{
    Access, Intention, IntentionGraph, IntentionId, IntentionKind, MethodSignature, Param,
    Provenance, PropertyAttribute, PropertyMode, TypeKind, ValueStorage,
};
pub use known::{KnownMethodDescriptor, KnownProperty, KnownPropertyDescriptor, KnownType};
