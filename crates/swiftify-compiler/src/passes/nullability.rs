//! Pass 7 (§4.4): propagate nullability onto property types.
//!
//! Scoped to properties, not method/global-function signatures: a
//! `MethodSignature` parameter carries no per-parameter "explicitly
//! qualified nullable/nonnull" marker the way `PropertyAttribute` does
//! for a `@property` line, so there is nothing for this pass to read to
//! tell "inherited from `NS_ASSUME_NONNULL_BEGIN`" apart from
//! "explicitly qualified" at a parameter. Properties keep that
//! information (`PropertyAttribute::Nullable`/`Nonnull`), so the rule
//! here is: inside a type whose `in_nonnull_context` is set, a property
//! without an explicit `nullable` qualifier loses any `Optional`
//! wrapper; `nullable` forces one back on.

use swiftify_core::ast::ty::SwiftType;
use swiftify_core::intention::graph::{IntentionKind, PropertyAttribute};
use swiftify_core::intention::IntentionGraph;

use super::{IntentionPass, PassContext};

pub struct PropagateNullability;

fn unwrap_optional(ty: SwiftType) -> SwiftType {
    match ty {
        SwiftType::Optional(inner) => *inner,
        other => other,
    }
}

impl IntentionPass for PropagateNullability {
    fn name(&self) -> &'static str {
        "propagate_nullability"
    }

    fn run(&self, graph: &mut IntentionGraph, _ctx: &mut PassContext<'_>) -> bool {
        let mut changed = false;

        for &root in graph.roots() {
            let IntentionKind::File { types, .. } = &graph.get(root).kind else { continue };
            let types = types.clone();

            for ty in types {
                if !graph.is_live(ty) {
                    continue;
                }
                let (in_nonnull_context, properties) = match &graph.get(ty).kind {
                    IntentionKind::Type { in_nonnull_context, properties, .. } => {
                        (*in_nonnull_context, properties.clone())
                    }
                    _ => continue,
                };
                if !in_nonnull_context {
                    continue;
                }

                for prop in properties {
                    if !graph.is_live(prop) {
                        continue;
                    }
                    let IntentionKind::Property { attributes, ty: prop_ty, .. } = &mut graph.get_mut(prop).kind
                    else {
                        continue;
                    };

                    let wants_optional = attributes.contains(&PropertyAttribute::Nullable);
                    let is_optional = prop_ty.is_optional();

                    if wants_optional && !is_optional {
                        *prop_ty = std::mem::replace(prop_ty, SwiftType::Void).optional();
                        changed = true;
                    } else if !wants_optional && is_optional {
                        let current = std::mem::replace(prop_ty, SwiftType::Void);
                        *prop_ty = unwrap_optional(current);
                        changed = true;
                    }
                }
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use swiftify_core::intention::graph::{Access, PropertyMode, TypeKind, ValueStorage};
    use swiftify_core::{Diagnostics, Interner};

    fn setup(in_nonnull: bool, attrs: Vec<PropertyAttribute>, ty: SwiftType) -> (IntentionGraph, Interner, swiftify_core::intention::IntentionId) {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let file = graph.add_file(PathBuf::from("Foo.h"), true, None);
        let type_name = interner.intern("Foo");
        let owner = graph.add_type_to_file(
            file, type_name, TypeKind::Class, None, Access::Internal, in_nonnull, None, None,
        );
        let name = interner.intern("value");
        let prop = graph.add_property(
            owner,
            name,
            ty,
            attrs,
            PropertyMode::Field,
            ValueStorage::Stored { initializer: None },
            None,
            None,
        );
        (graph, interner, prop)
    }

    #[test]
    fn nonnull_context_strips_optional_without_nullable_qualifier() {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let file = graph.add_file(PathBuf::from("Foo.h"), true, None);
        let type_name = interner.intern("Foo");
        let owner = graph.add_type_to_file(
            file, type_name, TypeKind::Class, None, Access::Internal, true, None, None,
        );
        let name = interner.intern("value");
        let string_ty = interner.intern("String");
        let prop = graph.add_property(
            owner,
            name,
            SwiftType::Optional(Box::new(SwiftType::Named(string_ty))),
            vec![],
            PropertyMode::Field,
            ValueStorage::Stored { initializer: None },
            None,
            None,
        );

        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        assert!(PropagateNullability.run(&mut graph, &mut ctx));
        match &graph.get(prop).kind {
            IntentionKind::Property { ty, .. } => assert!(!ty.is_optional()),
            _ => panic!("expected Property"),
        }
    }

    #[test]
    fn explicit_nullable_qualifier_forces_optional() {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let file = graph.add_file(PathBuf::from("Foo.h"), true, None);
        let type_name = interner.intern("Foo");
        let owner = graph.add_type_to_file(
            file, type_name, TypeKind::Class, None, Access::Internal, true, None, None,
        );
        let name = interner.intern("value");
        let string_ty = interner.intern("String");
        let prop = graph.add_property(
            owner,
            name,
            SwiftType::Named(string_ty),
            vec![PropertyAttribute::Nullable],
            PropertyMode::Field,
            ValueStorage::Stored { initializer: None },
            None,
            None,
        );

        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        assert!(PropagateNullability.run(&mut graph, &mut ctx));
        match &graph.get(prop).kind {
            IntentionKind::Property { ty, .. } => assert!(ty.is_optional()),
            _ => panic!("expected Property"),
        }
    }

    #[test]
    fn outside_nonnull_context_is_left_alone() {
        let (mut graph, mut interner, prop) = setup(false, vec![], SwiftType::Void);
        let string_ty = interner.intern("String");
        if let IntentionKind::Property { ty, .. } = &mut graph.get_mut(prop).kind {
            *ty = SwiftType::Optional(Box::new(SwiftType::Named(string_ty)));
        }

        let mut diagnostics = Diagnostics::new();
        let mut ctx = PassContext { interner: &mut interner, diagnostics: &mut diagnostics };
        assert!(!PropagateNullability.run(&mut graph, &mut ctx));
    }
}
