//! Pass 2 (§4.4): synthesise declared-but-unimplemented property
//! accessors, and collapse trivial getter/setter pairs back to stored
//! form.
//!
//! Objective-C's `@synthesize` (or the modern implicit synthesis) backs
//! a `@property` with a hidden ivar when no custom accessor bodies were
//! written; that case lowers to `ValueStorage::Accessors { getter: None,
//! setter: None }` and is collapsed here to a plain `Stored` property.
//! A property whose accessor bodies do exist but are trivial wrappers
//! (`get { _x }` / `set { _x = newValue }`) is likewise collapsed —
//! the distinction the user's custom code actually cared about was
//! never more than the default ivar forwarding.

use swiftify_core::ast::expr::ExpressionKind;
use swiftify_core::ast::stmt::StatementKind;
use swiftify_core::intention::graph::{IntentionKind, ValueStorage};
use swiftify_core::intention::{IntentionGraph, IntentionId};

use super::{IntentionPass, PassContext};

pub struct SynthesizeAccessors;

fn body_statements(graph: &IntentionGraph, body: IntentionId) -> Option<Vec<swiftify_core::ast::stmt::Statement>> {
    match &graph.get(body).kind {
        IntentionKind::Body { statements } => Some(statements.clone()),
        _ => None,
    }
}

/// A getter body is trivial iff it is exactly one `return <member access
/// or identifier>` statement.
fn getter_is_trivial(stmts: &[swiftify_core::ast::stmt::Statement]) -> bool {
    match stmts {
        [stmt] => matches!(
            &stmt.kind,
            StatementKind::Return(Some(expr))
                if matches!(expr.kind, ExpressionKind::Identifier(_) | ExpressionKind::PostfixMember { .. })
        ),
        _ => false,
    }
}

/// A setter body is trivial iff it is exactly one assignment statement
/// whose value is a bare identifier (the implicit `newValue`/parameter).
fn setter_is_trivial(stmts: &[swiftify_core::ast::stmt::Statement]) -> bool {
    match stmts {
        [stmt] => matches!(
            &stmt.kind,
            StatementKind::Expression(expr)
                if matches!(
                    &expr.kind,
                    ExpressionKind::Assignment { value, .. } if matches!(value.kind, ExpressionKind::Identifier(_))
                )
        ),
        _ => false,
    }
}

fn property_ids(graph: &IntentionGraph) -> Vec<IntentionId> {
    let mut out = Vec::new();
    for &root in graph.roots() {
        let IntentionKind::File { types, .. } = &graph.get(root).kind else { continue };
        for &ty in types {
            let IntentionKind::Type { properties, .. } = &graph.get(ty).kind else { continue };
            out.extend(properties.iter().copied());
        }
    }
    out
}

impl IntentionPass for SynthesizeAccessors {
    fn name(&self) -> &'static str {
        "synthesize_accessors"
    }

    fn run(&self, graph: &mut IntentionGraph, _ctx: &mut PassContext<'_>) -> bool {
        let mut changed = false;

        for prop in property_ids(graph) {
            if !graph.is_live(prop) {
                continue;
            }
            let IntentionKind::Property { storage, .. } = &graph.get(prop).kind else { continue };
            let ValueStorage::Accessors { getter, setter } = storage else { continue };

            let collapses = match (*getter, *setter) {
                (None, None) => true,
                (Some(g), s) => {
                    let getter_ok = body_statements(graph, g).is_some_and(|b| getter_is_trivial(&b));
                    let setter_ok = match s {
                        None => true,
                        Some(s) => body_statements(graph, s).is_some_and(|b| setter_is_trivial(&b)),
                    };
                    getter_ok && setter_ok
                }
                (None, Some(_)) => false,
            };

            if !collapses {
                continue;
            }

            let (old_getter, old_setter) = (*getter, *setter);
            if let IntentionKind::Property { storage, .. } = &mut graph.get_mut(prop).kind {
                *storage = ValueStorage::Stored { initializer: None };
            }
            for body in [old_getter, old_setter].into_iter().flatten() {
                graph.remove_child(body);
            }
            changed = true;
        }

        changed
    }
}
