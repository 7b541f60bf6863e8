//! Swiftify compiler: Objective-C parse-tree lowering, the intention
//! graph, intention passes, and the pipeline driver that runs them to a
//! fixed point.
//!
//! - `parse_tree` - the read-only view of an Objective-C parse tree that
//!   lowering consumes (a test double in this crate; a real front end
//!   wires in a tree-sitter `Lang` the way `plotnik-langs` does)
//! - `lower` - AST lowering (parse tree -> intention graph)
//! - `type_mapper` - Objective-C to Swift type mapping (§4.5)
//! - `passes` - the standard intention-pass catalogue (§4.4)
//! - `pipeline` - the fixed-point scheduler over that catalogue

pub mod lower;
pub mod parse_tree;
pub mod passes;
pub mod pipeline;
pub mod type_mapper;

#[cfg(test)]
mod lower_tests;

pub use pipeline::{Error, Pipeline, PipelineConfig, Result};
