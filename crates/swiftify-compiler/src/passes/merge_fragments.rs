//! Pass 1 (§4.4): merge duplicate type fragments (categories,
//! extensions) into a single type identity.
//!
//! `IntentionGraph::add_type_to_file` (§3.1 "A type intention may be
//! split across several files ... its identity is the fully-qualified
//! type name") only registers the *first* `Type` intention seen for a
//! name in `type_index`; later fragments are left as ordinary children
//! of their own `File`, disconnected from the canonical type's member
//! lists. This pass finds those stray fragments, splices their
//! properties/methods/conformances onto the canonical type (preserving
//! each fragment's own insertion order, appended after the canonical
//! type's existing members — §5 "Ordering"), and removes the now-empty
//! fragment from its file.

use swiftify_core::intention::graph::IntentionKind;
use swiftify_core::intention::{IntentionGraph, IntentionId};

use super::{IntentionPass, PassContext};

pub struct MergeDuplicateFragments;

fn type_name_of(graph: &IntentionGraph, id: IntentionId) -> Option<swiftify_core::Symbol> {
    match &graph.get(id).kind {
        IntentionKind::Type { type_name, .. } => Some(*type_name),
        _ => None,
    }
}

/// Every `Type` intention reachable from a `File` root, in file-then-
/// insertion order — the order fragments are visited in matters only in
/// that the first one visited for a name becomes canonical, which
/// `type_by_name` already guarantees by construction.
fn all_type_ids(graph: &IntentionGraph) -> Vec<IntentionId> {
    let mut out = Vec::new();
    for &root in graph.roots() {
        if let IntentionKind::File { types, .. } = &graph.get(root).kind {
            out.extend(types.iter().copied());
        }
    }
    out
}

impl IntentionPass for MergeDuplicateFragments {
    fn name(&self) -> &'static str {
        "merge_duplicate_fragments"
    }

    fn run(&self, graph: &mut IntentionGraph, _ctx: &mut PassContext<'_>) -> bool {
        let mut changed = false;

        for fragment in all_type_ids(graph) {
            if !graph.is_live(fragment) {
                continue;
            }
            let Some(name) = type_name_of(graph, fragment) else { continue };
            let Some(canonical) = graph.type_by_name(name) else { continue };
            if canonical == fragment {
                continue;
            }

            let (fragment_properties, fragment_methods, fragment_conformances) =
                match &graph.get(fragment).kind {
                    IntentionKind::Type { properties, methods, conformances, .. } => {
                        (properties.clone(), methods.clone(), conformances.clone())
                    }
                    _ => continue,
                };

            for &child in fragment_properties
                .iter()
                .chain(fragment_methods.iter())
                .chain(fragment_conformances.iter())
            {
                graph.get_mut(child).parent = Some(canonical);
            }

            if let IntentionKind::Type { properties, methods, conformances, .. } =
                &mut graph.get_mut(canonical).kind
            {
                properties.extend(fragment_properties);
                methods.extend(fragment_methods);
                conformances.extend(fragment_conformances);
            }

            graph.remove_child(fragment);
            changed = true;
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use swiftify_core::intention::graph::{Access, TypeKind};
    use swiftify_core::{Diagnostics, Interner};

    #[test]
    fn fragment_properties_move_onto_the_canonical_type() {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let name = interner.intern("Foo");

        let header = graph.add_file(PathBuf::from("Foo.h"), true, None);
        let canonical = graph.add_type_to_file(
            header, name, TypeKind::Class, None, Access::Internal, false, None, None,
        );

        let category_file = graph.add_file(PathBuf::from("Foo+Extras.m"), false, None);
        let fragment = graph.add_type_to_file(
            category_file, name, TypeKind::Extension, None, Access::Internal, false, None, None,
        );
        let extra_name = interner.intern("extra");
        let int_ty = swiftify_core::ast::ty::SwiftType::Named(interner.intern("Int"));
        graph.add_property(
            fragment,
            extra_name,
            int_ty,
            vec![],
            swiftify_core::intention::graph::PropertyMode::Field,
            swiftify_core::intention::graph::ValueStorage::Stored { initializer: None },
            None,
            None,
        );

        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        let changed = MergeDuplicateFragments.run(&mut graph, &mut ctx);
        assert!(changed);

        match &graph.get(canonical).kind {
            IntentionKind::Type { properties, .. } => assert_eq!(properties.len(), 1),
            _ => panic!("expected Type"),
        }
        assert!(!graph.is_live(fragment));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let name = interner.intern("Foo");
        let header = graph.add_file(PathBuf::from("Foo.h"), true, None);
        graph.add_type_to_file(
            header, name, TypeKind::Class, None, Access::Internal, false, None, None,
        );

        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        assert!(!MergeDuplicateFragments.run(&mut graph, &mut ctx));
    }
}
