//! The standard intention-pass catalogue (§4.4) and the scheduler
//! contract each pass is written against.
//!
//! Passes are modeled as a trait with one `run` method returning whether
//! the graph changed, rather than a vector of closures, mirroring the
//! `FunctionTargetProcessor`/`FunctionTargetsHolder` pipeline-driver
//! shape used for the same "run a sequence of graph transformations to
//! a fixed point" problem in optimizing-compiler pipelines (§10.6). It
//! gives every pass a name for diagnostics and keeps `Pipeline::run`
//! itself a tiny, declarative loop.

mod dce;
mod infer_types;
mod merge_fragments;
mod nullability;
mod promote_readonly;
mod resolve_identifiers;
mod synthesize_accessors;

pub use dce::ControlFlowDce;
pub use infer_types::InferExpressionTypes;
pub use merge_fragments::MergeDuplicateFragments;
pub use nullability::PropagateNullability;
pub use promote_readonly::PromoteReadonlyProperties;
pub use resolve_identifiers::ResolveIdentifiers;
pub use synthesize_accessors::SynthesizeAccessors;

use swiftify_core::intention::IntentionGraph;
use swiftify_core::{Diagnostics, Interner};

/// Threaded through every pass's `run` call (§9 "per-pipeline-run
/// context passed explicitly", the same shape `LowerCtx` and
/// `TypeMapperContext` already use).
pub struct PassContext<'a> {
    pub interner: &'a mut Interner,
    pub diagnostics: &'a mut Diagnostics,
}

/// One in-place transformation over the intention graph (§4.4, Glossary
/// "Pass"). `run` reports whether it changed the graph so the scheduler
/// can detect a fixed point.
pub trait IntentionPass {
    fn name(&self) -> &'static str;
    fn run(&self, graph: &mut IntentionGraph, ctx: &mut PassContext<'_>) -> bool;
}

/// The standard catalogue (§4.4), in the declared order the scheduler
/// runs them every sweep. Order matters — passes are not commutative
/// (e.g. fragments must be merged before identifier resolution sees a
/// type's complete member list).
pub fn standard_catalogue() -> Vec<Box<dyn IntentionPass>> {
    vec![
        Box::new(MergeDuplicateFragments),
        Box::new(SynthesizeAccessors),
        Box::new(PromoteReadonlyProperties),
        Box::new(ResolveIdentifiers),
        Box::new(InferExpressionTypes),
        Box::new(ControlFlowDce),
        Box::new(PropagateNullability),
    ]
}
