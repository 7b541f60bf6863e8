//! The type mapper (§4.5): a pure function from a spelled-out
//! Objective-C type expression to a [`SwiftType`].
//!
//! Stateless apart from [`TypeMapperContext`], which carries the
//! protocol/class name tables needed to distinguish `id<P>` from a bare
//! unrecognised name; the context is built once per pipeline run and
//! passed by reference, mirroring the interner (§9 "the type-mapper's
//! context is per-pipeline-run and passed explicitly").

use std::collections::HashSet;

use swiftify_core::ast::ty::SwiftType;
use swiftify_core::{Interner, Symbol};

/// Per-run context: the set of protocol names declared anywhere in this
/// translation, used only to decide whether `id<P>` should map to
/// [`SwiftType::Protocol`] (not load-bearing for correctness — either
/// branch produces a valid nominal type — but keeps emitted spelling
/// stable across passes).
#[derive(Debug, Default)]
pub struct TypeMapperContext {
    known_protocols: HashSet<Symbol>,
}

impl TypeMapperContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_protocol(&mut self, name: Symbol) {
        self.known_protocols.insert(name);
    }
}

/// Foundation/primitive name table. An exhaustive table of every
/// Foundation type is out of scope (§4.5); this covers the rules named
/// explicitly plus the handful of scalar types every Objective-C
/// snippet uses.
fn map_known_name(name: &str) -> Option<&'static str> {
    Some(match name {
        "NSString" | "NSMutableString" => "String",
        "NSNumber" => "NSNumber",
        "NSArray" | "NSMutableArray" => "Array",
        "NSDictionary" | "NSMutableDictionary" => "Dictionary",
        "NSObject" => "NSObject",
        "BOOL" | "bool" | "_Bool" => "Bool",
        "NSInteger" | "int" | "long" | "short" | "NSInteger8" => "Int",
        "NSUInteger" | "unsigned" | "unsigned int" | "unsigned long" => "UInt",
        "CGFloat" | "double" => "Double",
        "float" => "Float",
        "void" => "Void",
        "id" => "AnyObject",
        _ => return None,
    })
}

/// Strips a single trailing `*` (plus surrounding whitespace) and a
/// leading `const`, returning the stripped core spelling and whether a
/// pointer marker was present.
fn strip_pointer_and_const(spelling: &str) -> (&str, bool) {
    let mut s = spelling.trim();
    if let Some(rest) = s.strip_prefix("const ") {
        s = rest.trim();
    }
    match s.strip_suffix('*') {
        Some(rest) => (rest.trim(), true),
        None => (s, false),
    }
}

/// Parses `id<Protocol>` / `NSArray<T>` / `NSDictionary<K, V>` generic
/// argument lists out of `core`, returning the base name and the raw
/// argument spellings.
fn split_generic_args(core: &str) -> (&str, Vec<&str>) {
    let Some(open) = core.find('<') else {
        return (core.trim(), Vec::new());
    };
    let Some(close) = core.rfind('>') else {
        return (core.trim(), Vec::new());
    };
    let base = core[..open].trim();
    let inner = &core[open + 1..close];
    let mut depth = 0i32;
    let mut args = Vec::new();
    let mut start = 0;
    for (i, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < inner.len() {
        args.push(inner[start..].trim());
    }
    (base, args)
}

/// Recognises a block-type spelling, Objective-C's `RET (^)(PARAMS)`
/// syntax, returning the return-type spelling and the parameter-type
/// spellings when it matches.
fn split_block_type(spelling: &str) -> Option<(&str, Vec<&str>)> {
    let marker = spelling.find("(^)")?;
    let ret = spelling[..marker].trim();
    let params_start = spelling[marker + 3..].find('(')? + marker + 3 + 1;
    let params_end = spelling.rfind(')')?;
    if params_end < params_start {
        return None;
    }
    let params_text = spelling[params_start..params_end].trim();
    if params_text.is_empty() || params_text == "void" {
        return Some((ret, Vec::new()));
    }
    let mut depth = 0i32;
    let mut params = Vec::new();
    let mut start = 0;
    for (i, ch) in params_text.char_indices() {
        match ch {
            '(' | '<' => depth += 1,
            ')' | '>' => depth -= 1,
            ',' if depth == 0 => {
                params.push(params_text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(params_text[start..].trim());
    Some((ret, params))
}

/// Maps a spelled-out Objective-C type to its Swift equivalent.
/// `nullable` reflects whether the spelling appeared outside a nonnull
/// context (a `nullable`/`_Nullable` qualifier, or simply outside
/// `NS_ASSUME_NONNULL_BEGIN`); the caller resolves that from the
/// enclosing `inNonnullContext` before calling this function, since the
/// mapper itself is stateless (§4.5).
pub fn map_type(
    ctx: &TypeMapperContext,
    interner: &mut Interner,
    spelling: &str,
    nullable: bool,
) -> SwiftType {
    let result = map_type_core(ctx, interner, spelling);
    if nullable && !matches!(result, SwiftType::Void) {
        result.optional()
    } else {
        result
    }
}

fn map_type_core(ctx: &TypeMapperContext, interner: &mut Interner, spelling: &str) -> SwiftType {
    if let Some((ret, params)) = split_block_type(spelling) {
        let returns = Box::new(map_type_core(ctx, interner, ret));
        let params = params.iter().map(|p| map_type_core(ctx, interner, p)).collect();
        return SwiftType::Function { params, returns };
    }

    let (core, is_pointer) = strip_pointer_and_const(spelling);
    let (base, generic_args) = split_generic_args(core);

    if base == "id" && generic_args.len() == 1 {
        let protocol = interner.intern(generic_args[0]);
        return SwiftType::Protocol(protocol);
    }

    if (base == "NSArray" || base == "NSMutableArray") && generic_args.len() == 1 {
        let elem = map_type_core(ctx, interner, generic_args[0]);
        return SwiftType::Array(Box::new(elem));
    }

    if (base == "NSDictionary" || base == "NSMutableDictionary") && generic_args.len() == 2 {
        let key = map_type_core(ctx, interner, generic_args[0]);
        let value = map_type_core(ctx, interner, generic_args[1]);
        return SwiftType::Dictionary(Box::new(key), Box::new(value));
    }

    if let Some(mapped) = map_known_name(base) {
        if mapped == "Void" {
            return SwiftType::Void;
        }
        let sym = interner.intern(mapped);
        return SwiftType::Named(sym);
    }

    if is_pointer {
        // A pointer to a type this function doesn't otherwise recognise
        // (and which isn't a known Foundation class, handled above) is a
        // pointer to a primitive, e.g. `int *` (§4.5).
        let pointee = map_type_core(ctx, interner, base);
        return SwiftType::UnsafeMutablePointer(Box::new(pointee));
    }

    let sym = interner.intern(base);
    if ctx.known_protocols.contains(&sym) {
        return SwiftType::Protocol(sym);
    }
    SwiftType::Named(sym)
}
