//! Pass 3 (§4.4): promote `@property (readonly)` (detected by the
//! attribute scan already recorded on the property by lowering) to a
//! Swift `{ get }`-only computed property — dropping any setter it was
//! synthesised with and marking it `Computed` so the emitter knows not
//! to print a `set`.

use swiftify_core::intention::graph::{IntentionKind, PropertyAttribute, PropertyMode, ValueStorage};
use swiftify_core::intention::{IntentionGraph, IntentionId};

use super::{IntentionPass, PassContext};

pub struct PromoteReadonlyProperties;

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

impl IntentionPass for PromoteReadonlyProperties {
    fn name(&self) -> &'static str {
        "promote_readonly_properties"
    }

    fn run(&self, graph: &mut IntentionGraph, _ctx: &mut PassContext<'_>) -> bool {
        let mut changed = false;

        for prop in property_ids(graph) {
            if !graph.is_live(prop) {
                continue;
            }
            let IntentionKind::Property { attributes, mode, storage, .. } = &mut graph.get_mut(prop).kind
            else {
                continue;
            };
            if !attributes.contains(&PropertyAttribute::ReadOnly) {
                continue;
            }

            if let ValueStorage::Accessors { setter, .. } = storage {
                if setter.take().is_some() {
                    changed = true;
                }
            }
            if matches!(storage, ValueStorage::Accessors { .. }) && *mode != PropertyMode::Computed {
                *mode = PropertyMode::Computed;
                changed = true;
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use swiftify_core::ast::ty::SwiftType;
    use swiftify_core::intention::graph::{Access, TypeKind};
    use swiftify_core::{Diagnostics, Interner};

    fn setup_readonly_property(
        storage: impl FnOnce(&mut IntentionGraph, IntentionId) -> ValueStorage,
    ) -> (IntentionGraph, Interner, IntentionId) {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let file = graph.add_file(PathBuf::from("Foo.h"), true, None);
        let type_name = interner.intern("Foo");
        let ty = graph.add_type_to_file(
            file, type_name, TypeKind::Class, None, Access::Internal, false, None, None,
        );
        let name = interner.intern("count");
        let prop = graph.add_property(
            ty,
            name,
            SwiftType::Named(interner.intern("Int")),
            vec![PropertyAttribute::ReadOnly],
            PropertyMode::Property,
            ValueStorage::Stored { initializer: None },
            None,
            None,
        );
        let storage = storage(&mut graph, prop);
        if let IntentionKind::Property { storage: slot, .. } = &mut graph.get_mut(prop).kind {
            *slot = storage;
        }
        (graph, interner, prop)
    }

    #[test]
    fn readonly_with_setter_drops_it_and_becomes_computed() {
        let (mut graph, mut interner, prop) = setup_readonly_property(|graph, prop| {
            let setter = graph.add_detached_body(prop, vec![]);
            ValueStorage::Accessors { getter: None, setter: Some(setter) }
        });
        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        assert!(PromoteReadonlyProperties.run(&mut graph, &mut ctx));
        match &graph.get(prop).kind {
            IntentionKind::Property { storage: ValueStorage::Accessors { setter, .. }, mode, .. } => {
                assert!(setter.is_none());
                assert_eq!(*mode, PropertyMode::Computed);
            }
            other => panic!("expected Accessors, got {other:?}"),
        }
    }

    #[test]
    fn readonly_stored_property_is_untouched_structurally() {
        let (mut graph, mut interner, _prop) =
            setup_readonly_property(|_graph, _prop| ValueStorage::Stored { initializer: None });
        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        assert!(!PromoteReadonlyProperties.run(&mut graph, &mut ctx));
    }

    #[test]
    fn second_run_is_idempotent() {
        let (mut graph, mut interner, _prop) = setup_readonly_property(|graph, prop| {
            let setter = graph.add_detached_body(prop, vec![]);
            ValueStorage::Accessors { getter: None, setter: Some(setter) }
        });
        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        assert!(PromoteReadonlyProperties.run(&mut graph, &mut ctx));
        assert!(!PromoteReadonlyProperties.run(&mut graph, &mut ctx));
    }
}
