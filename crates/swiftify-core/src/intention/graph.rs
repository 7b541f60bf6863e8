//! The intention graph (§3.1, §4.2): a tree by ownership, a graph by
//! cross-reference, stored as a flat arena so the "non-owning upward
//! back-edge" (§9) can be a plain index rather than a reference-counted
//! or lifetime-bound pointer.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::ast::stmt::Statement;
use crate::ast::ty::SwiftType;
use crate::interner::Symbol;
use crate::span::Span;

/// Opaque, read-only, non-owning reference to the Objective-C parse node
/// an intention was derived from (§3.1 invariant). The core never walks
/// back into the parse tree through this handle; it only carries enough
/// identity (`node_id`) and location (`span`) for diagnostics and
/// provenance queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance {
    pub node_id: u64,
    pub span: Span,
}

/// Index into the [`IntentionGraph`] arena. `IntentionId::ROOT_PARENT`
/// (i.e. `None` wherever this type is wrapped in `Option`) marks a root
/// with no owning parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntentionId(u32);

impl IntentionId {
    fn new(raw: usize) -> Self {
        Self(raw as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Internal,
    Private,
    FilePrivate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Struct,
    Enum,
    Protocol,
    Extension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyMode {
    /// A plain stored field: `var x: Int`.
    Field,
    /// A property with a synthesised getter/setter pair backed by hidden
    /// storage (Objective-C `@synthesize`-style `@property`).
    Property,
    /// A computed property with no backing storage: `{ get set }` /
    /// `{ get }` only, e.g. after readonly-promotion (§4.4 item 3).
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAttribute {
    ReadOnly,
    ReadWrite,
    Strong,
    Weak,
    Copy,
    Nonatomic,
    Atomic,
    /// Explicit `nullable`/`__nullable` qualifier on the `@property` line,
    /// as opposed to a nullability inherited from the enclosing
    /// `NS_ASSUME_NONNULL_BEGIN/END` span (§4.4 item 7).
    Nullable,
    /// Explicit `nonnull`/`__nonnull` qualifier on the `@property` line.
    Nonnull,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    /// External argument label, `None` for Swift's `_`.
    pub label: Option<Symbol>,
    pub name: Symbol,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub is_static: bool,
    /// The full Objective-C selector, colon-joined (e.g.
    /// `"initWithName:age:"`), used as-is for Swift's method base name
    /// during emission and as the identity for selector-based lookup.
    pub selector: Symbol,
    pub params: Vec<Param>,
    pub param_types: Vec<SwiftType>,
    pub return_type: SwiftType,
}

/// Where a property's backing value lives.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueStorage {
    /// Stored directly, no accessor bodies.
    Stored { initializer: Option<crate::ast::expr::Expression> },
    /// Backed by getter/setter method bodies (as `IntentionId`s pointing
    /// at `Body` intentions owned by this same `Property`).
    Accessors { getter: Option<IntentionId>, setter: Option<IntentionId> },
}

#[derive(Debug, Clone)]
pub enum IntentionKind {
    File {
        path: PathBuf,
        is_header_derived: bool,
        imports: Vec<Symbol>,
        types: Vec<IntentionId>,
        globals: Vec<IntentionId>,
    },
    Type {
        type_name: Symbol,
        kind: TypeKind,
        supertype: Option<Symbol>,
        access: Access,
        in_nonnull_context: bool,
        properties: Vec<IntentionId>,
        methods: Vec<IntentionId>,
        conformances: Vec<IntentionId>,
    },
    Property {
        name: Symbol,
        ty: SwiftType,
        attributes: Vec<PropertyAttribute>,
        mode: PropertyMode,
        storage: ValueStorage,
    },
    Method {
        signature: MethodSignature,
        access: Access,
        is_initializer: bool,
        body: Option<IntentionId>,
    },
    GlobalFunction {
        signature: MethodSignature,
        access: Access,
        body: Option<IntentionId>,
    },
    ProtocolConformance {
        protocol_name: Symbol,
    },
    Body {
        statements: Vec<Statement>,
    },
}

impl IntentionKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            IntentionKind::File { .. } => "File",
            IntentionKind::Type { .. } => "Type",
            IntentionKind::Property { .. } => "Property",
            IntentionKind::Method { .. } => "Method",
            IntentionKind::GlobalFunction { .. } => "GlobalFunction",
            IntentionKind::ProtocolConformance { .. } => "ProtocolConformance",
            IntentionKind::Body { .. } => "Body",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Intention {
    pub kind: IntentionKind,
    pub parent: Option<IntentionId>,
    pub provenance: Option<Provenance>,
}

/// The mutable, hierarchical model of the Swift program being synthesised
/// (§3.1). Backed by a flat arena; children are tracked both as
/// `Vec<IntentionId>` inside the owning `IntentionKind` variant (for
/// ordered, insertion-stable iteration, §5 "Ordering") and, implicitly,
/// via each child's `parent` back-edge.
#[derive(Debug, Default)]
pub struct IntentionGraph {
    arena: Vec<Intention>,
    roots: Vec<IntentionId>,
    /// Fully-qualified type name -> the `Type` intention that is the
    /// canonical identity for that name, after fragment merging (§3.1
    /// "A type intention may be split across several files ... its
    /// identity is the fully-qualified type name.").
    type_index: IndexMap<Symbol, IntentionId>,
}

impl IntentionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, kind: IntentionKind, provenance: Option<Provenance>) -> IntentionId {
        let id = IntentionId::new(self.arena.len());
        self.arena.push(Intention { kind, parent: None, provenance });
        id
    }

    pub fn get(&self, id: IntentionId) -> &Intention {
        &self.arena[id.index()]
    }

    pub fn get_mut(&mut self, id: IntentionId) -> &mut Intention {
        &mut self.arena[id.index()]
    }

    pub fn roots(&self) -> &[IntentionId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = IntentionId> {
        (0..self.arena.len()).map(IntentionId::new)
    }

    /// Creates a new `File` intention and registers it as a root.
    pub fn add_file(
        &mut self,
        path: PathBuf,
        is_header_derived: bool,
        provenance: Option<Provenance>,
    ) -> IntentionId {
        let id = self.alloc(
            IntentionKind::File {
                path,
                is_header_derived,
                imports: Vec::new(),
                types: Vec::new(),
                globals: Vec::new(),
            },
            provenance,
        );
        self.roots.push(id);
        id
    }

    fn set_parent(&mut self, child: IntentionId, parent: IntentionId) {
        self.arena[child.index()].parent = Some(parent);
    }

    fn clear_parent(&mut self, child: IntentionId) {
        self.arena[child.index()].parent = None;
    }

    /// Adds `child` as a `Type` belonging to `file`, at `index` (or
    /// appended when `None`), and registers it in the by-name index if
    /// this is the first fragment seen for `type_name`.
    pub fn add_type_to_file(
        &mut self,
        file: IntentionId,
        type_name: Symbol,
        kind: TypeKind,
        supertype: Option<Symbol>,
        access: Access,
        in_nonnull_context: bool,
        provenance: Option<Provenance>,
        index: Option<usize>,
    ) -> IntentionId {
        let child = self.alloc(
            IntentionKind::Type {
                type_name,
                kind,
                supertype,
                access,
                in_nonnull_context,
                properties: Vec::new(),
                methods: Vec::new(),
                conformances: Vec::new(),
            },
            provenance,
        );
        self.insert_child_ref(file, index, child, |intention| match &mut intention.kind {
            IntentionKind::File { types, .. } => types,
            _ => panic!("add_type_to_file: parent is not a File"),
        });
        self.type_index.entry(type_name).or_insert(child);
        child
    }

    pub fn type_by_name(&self, type_name: Symbol) -> Option<IntentionId> {
        self.type_index.get(&type_name).copied()
    }

    pub fn add_property(
        &mut self,
        owner_type: IntentionId,
        name: Symbol,
        ty: SwiftType,
        attributes: Vec<PropertyAttribute>,
        mode: PropertyMode,
        storage: ValueStorage,
        provenance: Option<Provenance>,
        index: Option<usize>,
    ) -> IntentionId {
        let child = self.alloc(
            IntentionKind::Property { name, ty, attributes, mode, storage },
            provenance,
        );
        self.insert_child_ref(owner_type, index, child, |intention| match &mut intention.kind {
            IntentionKind::Type { properties, .. } => properties,
            _ => panic!("add_property: parent is not a Type"),
        });
        child
    }

    pub fn add_method(
        &mut self,
        owner_type: IntentionId,
        signature: MethodSignature,
        access: Access,
        is_initializer: bool,
        provenance: Option<Provenance>,
        index: Option<usize>,
    ) -> IntentionId {
        let child = self.alloc(
            IntentionKind::Method { signature, access, is_initializer, body: None },
            provenance,
        );
        self.insert_child_ref(owner_type, index, child, |intention| match &mut intention.kind {
            IntentionKind::Type { methods, .. } => methods,
            _ => panic!("add_method: parent is not a Type"),
        });
        child
    }

    pub fn add_conformance(
        &mut self,
        owner_type: IntentionId,
        protocol_name: Symbol,
        provenance: Option<Provenance>,
        index: Option<usize>,
    ) -> IntentionId {
        let child = self.alloc(IntentionKind::ProtocolConformance { protocol_name }, provenance);
        self.insert_child_ref(owner_type, index, child, |intention| match &mut intention.kind {
            IntentionKind::Type { conformances, .. } => conformances,
            _ => panic!("add_conformance: parent is not a Type"),
        });
        child
    }

    /// Creates a `Body` intention owned by `owner` with no other wiring
    /// — used for property accessor bodies, which (unlike a `Method`'s)
    /// have no dedicated slot on their owner to point back at them; the
    /// owner's `ValueStorage::Accessors` variant holds the `IntentionId`
    /// itself instead.
    pub fn add_detached_body(&mut self, owner: IntentionId, statements: Vec<Statement>) -> IntentionId {
        let body = self.alloc(IntentionKind::Body { statements }, None);
        self.set_parent(body, owner);
        body
    }

    /// Creates a `Body` intention owned by `owner` (a `Method` or
    /// `GlobalFunction`) and wires it as that owner's body.
    pub fn set_method_body(&mut self, method: IntentionId, statements: Vec<Statement>) -> IntentionId {
        let body = self.add_detached_body(method, statements);
        match &mut self.arena[method.index()].kind {
            IntentionKind::Method { body: slot, .. } => *slot = Some(body),
            IntentionKind::GlobalFunction { body: slot, .. } => *slot = Some(body),
            _ => panic!("set_method_body: target is not a Method/GlobalFunction"),
        }
        body
    }

    /// Generic insertion helper enforcing §4.2's invariant: `parent` is
    /// set *after* the child is inserted into the owner's ordered child
    /// list, and existing sibling order is preserved.
    fn insert_child_ref(
        &mut self,
        parent: IntentionId,
        index: Option<usize>,
        child: IntentionId,
        children_of: impl FnOnce(&mut Intention) -> &mut Vec<IntentionId>,
    ) {
        let list = children_of(&mut self.arena[parent.index()]);
        let at = index.unwrap_or(list.len()).min(list.len());
        list.insert(at, child);
        self.set_parent(child, parent);
    }

    /// Removes `child` from its parent's ordered child list, clearing the
    /// back-edge first (§4.2 "`removeX(intention)` clears the parent
    /// back-edge before removal"). Does not reclaim the arena slot; the
    /// intention becomes unreachable from any root but its id stays
    /// valid to dereference (mirrors §3.1's "never freed individually").
    pub fn remove_child(&mut self, child: IntentionId) {
        let Some(parent) = self.arena[child.index()].parent else {
            return;
        };
        self.clear_parent(child);
        match &mut self.arena[parent.index()].kind {
            IntentionKind::File { types, globals, .. } => {
                types.retain(|&c| c != child);
                globals.retain(|&c| c != child);
            }
            IntentionKind::Type { properties, methods, conformances, .. } => {
                properties.retain(|&c| c != child);
                methods.retain(|&c| c != child);
                conformances.retain(|&c| c != child);
            }
            _ => {}
        }
    }

    /// True iff `candidate` is reachable from some root by following
    /// owning child lists — i.e. it has not been orphaned by
    /// [`remove_child`]. Used by passes that want to skip removed nodes
    /// without compacting the arena.
    pub fn is_live(&self, candidate: IntentionId) -> bool {
        let mut current = candidate;
        loop {
            match self.arena[current.index()].parent {
                Some(parent) => current = parent,
                None => return self.roots.contains(&current),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::Interner;

    fn graph_with_type() -> (IntentionGraph, Interner, IntentionId, IntentionId) {
        let mut graph = IntentionGraph::new();
        let mut interner = Interner::new();
        let file = graph.add_file(PathBuf::from("Foo.h"), true, None);
        let name = interner.intern("Foo");
        let ty = graph.add_type_to_file(
            file,
            name,
            TypeKind::Class,
            None,
            Access::Internal,
            false,
            None,
            None,
        );
        (graph, interner, file, ty)
    }

    #[test]
    fn parent_back_edge_set_after_insertion() {
        let (graph, _interner, file, ty) = graph_with_type();
        assert_eq!(graph.get(ty).parent, Some(file));
        match &graph.get(file).kind {
            IntentionKind::File { types, .. } => assert_eq!(types, &vec![ty]),
            _ => panic!("expected File"),
        }
    }

    #[test]
    fn remove_child_clears_back_edge_and_list_entry() {
        let (mut graph, mut interner, file, _ty) = graph_with_type();
        let prop_name = interner.intern("count");
        let ty = graph.type_by_name(interner.intern("Foo")).unwrap();
        let prop = graph.add_property(
            ty,
            prop_name,
            SwiftType::Named(interner.intern("Int")),
            vec![],
            PropertyMode::Field,
            ValueStorage::Stored { initializer: None },
            None,
            None,
        );
        graph.remove_child(prop);
        assert_eq!(graph.get(prop).parent, None);
        match &graph.get(ty).kind {
            IntentionKind::Type { properties, .. } => assert!(properties.is_empty()),
            _ => panic!("expected Type"),
        }
        let _ = file;
    }

    #[test]
    fn insertion_preserves_sibling_order() {
        let (mut graph, mut interner, _file, ty) = graph_with_type();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let c = interner.intern("c");
        let int_ty = || SwiftType::Named(interner.intern("Int"));
        let pa = graph.add_property(
            ty, a, int_ty(), vec![], PropertyMode::Field,
            ValueStorage::Stored { initializer: None }, None, None,
        );
        let pb = graph.add_property(
            ty, b, int_ty(), vec![], PropertyMode::Field,
            ValueStorage::Stored { initializer: None }, None, None,
        );
        // Insert `c` between `a` and `b`.
        let pc = graph.add_property(
            ty, c, int_ty(), vec![], PropertyMode::Field,
            ValueStorage::Stored { initializer: None }, None, Some(1),
        );
        match &graph.get(ty).kind {
            IntentionKind::Type { properties, .. } => {
                assert_eq!(properties, &vec![pa, pc, pb]);
            }
            _ => panic!("expected Type"),
        }
    }

    #[test]
    fn type_lookup_by_name() {
        let (graph, mut interner, _file, ty) = graph_with_type();
        assert_eq!(graph.type_by_name(interner.intern("Foo")), Some(ty));
        assert_eq!(graph.type_by_name(interner.intern("Bar")), None);
    }
}
