//! Pass scheduler (§4.4 "Scheduling").
//!
//! Runs the standard catalogue to a fixed point: each sweep runs every
//! pass in declared order, and the scheduler stops as soon as a sweep
//! leaves the graph unchanged. `iteration_cap` bounds runaway sweeps
//! the same way `plotnik-compiler`'s analyzer bounds recursion with an
//! execution-fuel counter rather than trusting convergence blindly.

use serde::Deserialize;

use swiftify_core::intention::IntentionGraph;
use swiftify_core::{Diagnostics, Interner};

use crate::passes::{self, PassContext};

/// Tunables for a pipeline run. Loaded from the driver's configuration
/// file (if any) and defaulted otherwise — every intention pass itself
/// stays config-free, matching the `FunctionTargetProcessor` passes this
/// catalogue is modeled on, which take no configuration of their own.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of full sweeps over the catalogue before giving up
    /// and reporting `Error::IterationLimitExceeded`. The standard
    /// catalogue converges in 2-3 sweeps on any real input; this guards
    /// against a pass that (by a bug) never stabilizes.
    pub iteration_cap: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { iteration_cap: 16 }
    }
}

/// Errors the pipeline driver itself can raise, as opposed to ordinary
/// translation diagnostics (which are collected into [`Diagnostics`]
/// and never stop the run).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("intention passes did not reach a fixed point within {0} sweeps")]
    IterationLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Drives [`passes::standard_catalogue`] to a fixed point over `graph`.
pub struct Pipeline;

impl Pipeline {
    /// Runs every pass in the standard catalogue, in order, repeating
    /// full sweeps until one leaves the graph unchanged. Diagnostics
    /// accumulate across every sweep; nothing is cleared between them.
    pub fn run(
        graph: &mut IntentionGraph,
        interner: &mut Interner,
        diagnostics: &mut Diagnostics,
        config: &PipelineConfig,
    ) -> Result<()> {
        let catalogue = passes::standard_catalogue();
        let mut ctx = PassContext { interner, diagnostics };

        for _ in 0..config.iteration_cap {
            let mut changed = false;
            for pass in &catalogue {
                changed |= pass.run(graph, &mut ctx);
            }
            if !changed {
                return Ok(());
            }
        }

        Err(Error::IterationLimitExceeded(config.iteration_cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use swiftify_core::ast::expr::{Constant, Expression, ExpressionKind};
    use swiftify_core::ast::stmt::{Statement, StatementKind};
    use swiftify_core::ast::ty::SwiftType;
    use swiftify_core::intention::graph::{Access, MethodSignature, TypeKind};
    use swiftify_core::span::{SourceId, Span};

    fn span() -> Span {
        Span::new(SourceId::new(0), 0, 1)
    }

    #[test]
    fn empty_graph_converges_immediately() {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let mut diagnostics = Diagnostics::new();
        let config = PipelineConfig::default();

        assert!(Pipeline::run(&mut graph, &mut interner, &mut diagnostics, &config).is_ok());
    }

    #[test]
    fn dce_and_readonly_promotion_compose_across_sweeps() {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let file = graph.add_file(PathBuf::from("Foo.h"), true, None);
        let type_name = interner.intern("Foo");
        let ty = graph.add_type_to_file(
            file, type_name, TypeKind::Class, None, Access::Internal, false, None, None,
        );
        let selector = interner.intern("doThing");
        let method = graph.add_method(
            ty,
            MethodSignature {
                is_static: false,
                selector,
                params: vec![],
                param_types: vec![],
                return_type: SwiftType::Void,
            },
            Access::Internal,
            false,
            None,
            None,
        );
        let dead = Statement::new(
            StatementKind::Expression(Expression::new(ExpressionKind::Constant(Constant::Int(0)), span())),
            span(),
        );
        graph.set_method_body(method, vec![Statement::new(StatementKind::Return(None), span()), dead]);

        let mut diagnostics = Diagnostics::new();
        let config = PipelineConfig::default();
        assert!(Pipeline::run(&mut graph, &mut interner, &mut diagnostics, &config).is_ok());

        let body_id = match &graph.get(method).kind {
            swiftify_core::intention::graph::IntentionKind::Method { body, .. } => body.unwrap(),
            _ => unreachable!(),
        };
        let swiftify_core::intention::graph::IntentionKind::Body { statements } = &graph.get(body_id).kind else {
            unreachable!()
        };
        assert_eq!(statements.len(), 1);
    }
}
