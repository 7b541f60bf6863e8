//! Read-only `Known-X` views (Glossary, §4.2, §9) over intentions, plus
//! the name-based lookup operations a pass uses instead of walking the
//! arena by hand.

use crate::ast::ty::SwiftType;
use crate::interner::Symbol;
use crate::intention::graph::{
    Access, Intention, IntentionGraph, IntentionId, IntentionKind, MethodSignature, Param,
    PropertyAttribute, PropertyMode,
};

/// Strips nullability (`Optional` wrapping) recursively, for signature
/// comparison "with nullability dropped" (§4.2).
fn strip_nullability(ty: &SwiftType) -> SwiftType {
    match ty {
        SwiftType::Optional(inner) => strip_nullability(inner),
        SwiftType::Array(inner) => SwiftType::Array(Box::new(strip_nullability(inner))),
        SwiftType::Dictionary(k, v) => {
            SwiftType::Dictionary(Box::new(strip_nullability(k)), Box::new(strip_nullability(v)))
        }
        SwiftType::Function { params, returns } => SwiftType::Function {
            params: params.iter().map(strip_nullability).collect(),
            returns: Box::new(strip_nullability(returns)),
        },
        SwiftType::UnsafeMutablePointer(inner) => {
            SwiftType::UnsafeMutablePointer(Box::new(strip_nullability(inner)))
        }
        other => other.clone(),
    }
}

fn signatures_equal_ignoring_nullability(a: &MethodSignature, b: &MethodSignature) -> bool {
    if a.is_static != b.is_static || a.selector != b.selector {
        return false;
    }
    if a.param_types.len() != b.param_types.len() {
        return false;
    }
    a.param_types
        .iter()
        .zip(&b.param_types)
        .all(|(x, y)| strip_nullability(x) == strip_nullability(y))
        && strip_nullability(&a.return_type) == strip_nullability(&b.return_type)
}

/// Read-only facade over a `Type` intention. Borrowing, not owning: it
/// cannot be used to mutate the graph (§10.6 "thin borrowing wrapper").
pub struct KnownType<'g> {
    graph: &'g IntentionGraph,
    id: IntentionId,
}

impl<'g> KnownType<'g> {
    pub fn new(graph: &'g IntentionGraph, id: IntentionId) -> Option<Self> {
        match &graph.get(id).kind {
            IntentionKind::Type { .. } => Some(Self { graph, id }),
            _ => None,
        }
    }

    pub fn id(&self) -> IntentionId {
        self.id
    }

    fn intention(&self) -> &'g Intention {
        self.graph.get(self.id)
    }

    pub fn type_name(&self) -> Symbol {
        match &self.intention().kind {
            IntentionKind::Type { type_name, .. } => *type_name,
            _ => unreachable!("KnownType constructed over a non-Type intention"),
        }
    }

    pub fn in_nonnull_context(&self) -> bool {
        match &self.intention().kind {
            IntentionKind::Type { in_nonnull_context, .. } => *in_nonnull_context,
            _ => unreachable!(),
        }
    }

    /// Property lookup by name (§4.2 "Lookup by name on a type").
    pub fn property_named(&self, name: Symbol) -> Option<KnownProperty<'g>> {
        let IntentionKind::Type { properties, .. } = &self.intention().kind else {
            unreachable!()
        };
        properties
            .iter()
            .find(|&&p| match &self.graph.get(p).kind {
                IntentionKind::Property { name: n, .. } => *n == name,
                _ => false,
            })
            .map(|&p| KnownProperty { graph: self.graph, id: p })
    }

    /// Method lookup by selector (§4.2): ignores parameter/return types
    /// and variable names, matching purely on the selector symbol.
    pub fn method_by_selector(&self, selector: Symbol, is_static: bool) -> Option<IntentionId> {
        let IntentionKind::Type { methods, .. } = &self.intention().kind else {
            unreachable!()
        };
        methods.iter().copied().find(|&m| match &self.graph.get(m).kind {
            IntentionKind::Method { signature, .. } => {
                signature.selector == selector && signature.is_static == is_static
            }
            _ => false,
        })
    }

    /// Method lookup by full signature, nullability dropped (§4.2).
    pub fn method_by_signature(&self, signature: &MethodSignature) -> Option<IntentionId> {
        let IntentionKind::Type { methods, .. } = &self.intention().kind else {
            unreachable!()
        };
        methods.iter().copied().find(|&m| match &self.graph.get(m).kind {
            IntentionKind::Method { signature: other, .. } => {
                signatures_equal_ignoring_nullability(signature, other)
            }
            _ => false,
        })
    }

    /// Protocol-conformance lookup by name (§4.2).
    pub fn conforms_to(&self, protocol_name: Symbol) -> bool {
        let IntentionKind::Type { conformances, .. } = &self.intention().kind else {
            unreachable!()
        };
        conformances.iter().any(|&c| match &self.graph.get(c).kind {
            IntentionKind::ProtocolConformance { protocol_name: p } => *p == protocol_name,
            _ => false,
        })
    }

    pub fn properties(&self) -> impl Iterator<Item = KnownProperty<'g>> + '_ {
        let IntentionKind::Type { properties, .. } = &self.intention().kind else {
            unreachable!()
        };
        properties.iter().map(|&p| KnownProperty { graph: self.graph, id: p })
    }

    pub fn methods(&self) -> impl Iterator<Item = IntentionId> + '_ {
        let IntentionKind::Type { methods, .. } = &self.intention().kind else {
            unreachable!()
        };
        methods.iter().copied()
    }
}

/// Read-only facade over a `Property` intention.
pub struct KnownProperty<'g> {
    graph: &'g IntentionGraph,
    id: IntentionId,
}

impl<'g> KnownProperty<'g> {
    pub fn id(&self) -> IntentionId {
        self.id
    }

    pub fn name(&self) -> Symbol {
        match &self.graph.get(self.id).kind {
            IntentionKind::Property { name, .. } => *name,
            _ => unreachable!(),
        }
    }

    pub fn ty(&self) -> &'g SwiftType {
        match &self.graph.get(self.id).kind {
            IntentionKind::Property { ty, .. } => ty,
            _ => unreachable!(),
        }
    }

    pub fn mode(&self) -> PropertyMode {
        match &self.graph.get(self.id).kind {
            IntentionKind::Property { mode, .. } => *mode,
            _ => unreachable!(),
        }
    }

    pub fn attributes(&self) -> &'g [PropertyAttribute] {
        match &self.graph.get(self.id).kind {
            IntentionKind::Property { attributes, .. } => attributes,
            _ => unreachable!(),
        }
    }

    pub fn is_readonly(&self) -> bool {
        self.attributes().contains(&PropertyAttribute::ReadOnly)
    }
}

/// An abstract method descriptor, independent of any intention, used by
/// the protocol-conformance-synthesis pass to generate a concrete member
/// on a conforming type (§4.2 "Generate a member from an abstract
/// `KnownMethod`/`KnownProperty` descriptor").
#[derive(Debug, Clone)]
pub struct KnownMethodDescriptor {
    pub signature: MethodSignature,
    pub access: Access,
    pub is_initializer: bool,
    /// Default body to synthesise (e.g. `[.unknown(required-stub)]`);
    /// empty means an empty `{ }` body.
    pub default_body: Vec<crate::ast::stmt::Statement>,
}

#[derive(Debug, Clone)]
pub struct KnownPropertyDescriptor {
    pub name: Symbol,
    pub ty: SwiftType,
    pub mode: PropertyMode,
    pub attributes: Vec<PropertyAttribute>,
}

impl IntentionGraph {
    /// Materialises a method on `owner_type` from an abstract descriptor,
    /// skipping synthesis if a matching member already exists (keeps
    /// conformance synthesis idempotent, §8 scenario 6).
    pub fn generate_method_from_descriptor(
        &mut self,
        owner_type: IntentionId,
        descriptor: &KnownMethodDescriptor,
    ) -> IntentionId {
        if let Some(existing) = KnownType::new(self, owner_type)
            .and_then(|kt| kt.method_by_signature(&descriptor.signature))
        {
            return existing;
        }
        let method = self.add_method(
            owner_type,
            descriptor.signature.clone(),
            descriptor.access,
            descriptor.is_initializer,
            None,
            None,
        );
        if !descriptor.default_body.is_empty() {
            self.set_method_body(method, descriptor.default_body.clone());
        } else {
            self.set_method_body(method, Vec::new());
        }
        method
    }

    pub fn generate_property_from_descriptor(
        &mut self,
        owner_type: IntentionId,
        descriptor: &KnownPropertyDescriptor,
    ) -> IntentionId {
        if let Some(existing) =
            KnownType::new(self, owner_type).and_then(|kt| kt.property_named(descriptor.name))
        {
            return existing.id();
        }
        self.add_property(
            owner_type,
            descriptor.name,
            descriptor.ty.clone(),
            descriptor.attributes.clone(),
            descriptor.mode,
            crate::intention::graph::ValueStorage::Stored { initializer: None },
            None,
            None,
        )
    }
}

/// Helper re-exported for callers that only have a bare `Param` list to
/// build a `MethodSignature` from (e.g. test doubles and the lowering
/// layer), kept here rather than on `MethodSignature` itself since it is
/// a convenience, not part of the core model.
pub fn params_match_arity(a: &[Param], b: &[Param]) -> bool {
    a.len() == b.len()
}
