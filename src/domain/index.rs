use dashmap::DashMap;
use rayon::prelude::*;
use syn::{GenericArgument, ImplItem, Item, PathArguments, ReturnType, TraitItem, Type, TypeParamBound};
use tracing::warn;

use crate::infrastructure::project_loader::SourceFile;

/// Pointer types that are transparent to method calls.
const SMART_POINTERS: &[&str] = &["Box", "Rc", "Arc"];

/// Generic types whose first argument is the interesting element type.
const CONTAINERS: &[&str] = &[
    "Option", "Result", "Vec", "VecDeque", "HashSet", "BTreeSet", "LinkedList",
];

/// A best-effort type label: the outer type name plus, for containers,
/// the name of the element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub wrapped: Option<String>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wrapped: None,
        }
    }

    /// The element type of a container, as its own label.
    pub fn unwrap_inner(&self) -> Option<TypeRef> {
        self.wrapped.clone().map(TypeRef::named)
    }
}

/// Label a syntactic type. `Self` resolves to `self_ty`.
pub fn type_ref(ty: &Type, self_ty: &str) -> Option<TypeRef> {
    match ty {
        Type::Reference(r) => type_ref(&r.elem, self_ty),
        Type::Paren(p) => type_ref(&p.elem, self_ty),
        Type::Group(g) => type_ref(&g.elem, self_ty),
        Type::Slice(s) => Some(TypeRef {
            name: "slice".to_string(),
            wrapped: type_ref(&s.elem, self_ty).map(|t| t.name),
        }),
        Type::Array(a) => Some(TypeRef {
            name: "array".to_string(),
            wrapped: type_ref(&a.elem, self_ty).map(|t| t.name),
        }),
        Type::TraitObject(t) => first_trait_bound(t.bounds.iter()),
        Type::ImplTrait(t) => first_trait_bound(t.bounds.iter()),
        Type::Path(tp) => {
            let segment = tp.path.segments.last()?;
            let name = segment.ident.to_string();
            if name == "Self" {
                return Some(TypeRef::named(self_ty));
            }
            let first_arg = first_type_argument(&segment.arguments);
            if SMART_POINTERS.contains(&name.as_str()) {
                return first_arg.and_then(|inner| type_ref(inner, self_ty));
            }
            let wrapped = if CONTAINERS.contains(&name.as_str()) {
                first_arg.and_then(|inner| type_ref(inner, self_ty)).map(|t| t.name)
            } else {
                None
            };
            Some(TypeRef { name, wrapped })
        }
        _ => None,
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

fn first_trait_bound<'a>(mut bounds: impl Iterator<Item = &'a TypeParamBound>) -> Option<TypeRef> {
    bounds.find_map(|bound| match bound {
        TypeParamBound::Trait(t) => t
            .path
            .segments
            .last()
            .map(|s| TypeRef::named(s.ident.to_string())),
        _ => None,
    })
}

/// Thread-safe symbol index using DashMap for concurrent access.
/// Enables parallel parsing and indexing of source files.
#[derive(Default)]
pub struct SymbolIndex {
    // Key: (TypeName, FieldName)
    field_types: DashMap<(String, String), TypeRef>,

    // Key: (TypeName, MethodName)
    return_types: DashMap<(String, String), TypeRef>,

    // Acceleration map: MethodName -> declaring types
    method_lookup: DashMap<String, Vec<String>>,
}

impl SymbolIndex {
    /// Build the symbol index from source files in parallel.
    pub fn build(sources: &[SourceFile]) -> Self {
        let index = SymbolIndex::default();

        sources.par_iter().for_each(|source| match syn::parse_file(&source.content) {
            Ok(ast) => index.index_items(&ast.items),
            Err(e) => warn!(file = %source.path, error = %e, "not indexed"),
        });

        index
    }

    pub fn field_type(&self, type_name: &str, field: &str) -> Option<TypeRef> {
        self.field_types
            .get(&(type_name.to_string(), field.to_string()))
            .map(|r| r.clone())
    }

    pub fn return_type(&self, type_name: &str, method: &str) -> Option<TypeRef> {
        self.return_types
            .get(&(type_name.to_string(), method.to_string()))
            .map(|r| r.clone())
    }

    /// The declaring type of `method` when exactly one project type declares it.
    pub fn unique_declarer(&self, method: &str) -> Option<String> {
        self.method_lookup.get(method).and_then(|types| match types.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        })
    }

    /// Index all items in a list (recursive for inline modules).
    fn index_items(&self, items: &[Item]) {
        for item in items {
            match item {
                Item::Struct(s) => {
                    let owner = s.ident.to_string();
                    self.index_fields(&owner, s.fields.iter());
                }
                Item::Union(u) => {
                    let owner = u.ident.to_string();
                    self.index_fields(&owner, u.fields.named.iter());
                }
                Item::Trait(t) => {
                    let owner = t.ident.to_string();
                    for trait_item in &t.items {
                        if let TraitItem::Fn(f) = trait_item {
                            self.index_method(&owner, &f.sig.ident.to_string(), &f.sig.output);
                        }
                    }
                }
                Item::Impl(imp) => {
                    let Some(owner) = type_ref(&imp.self_ty, "").map(|t| t.name) else {
                        continue;
                    };
                    for impl_item in &imp.items {
                        if let ImplItem::Fn(f) = impl_item {
                            self.index_method(&owner, &f.sig.ident.to_string(), &f.sig.output);
                        }
                    }
                }
                Item::Mod(module) => {
                    if let Some((_, content)) = &module.content {
                        self.index_items(content);
                    }
                }
                _ => {}
            }
        }
    }

    fn index_fields<'a>(&self, owner: &str, fields: impl Iterator<Item = &'a syn::Field>) {
        for (position, field) in fields.enumerate() {
            let name = field
                .ident
                .as_ref()
                .map_or_else(|| position.to_string(), |ident| ident.to_string());
            if let Some(ty) = type_ref(&field.ty, owner) {
                self.field_types.insert((owner.to_string(), name), ty);
            }
        }
    }

    fn index_method(&self, owner: &str, method: &str, output: &ReturnType) {
        if let ReturnType::Type(_, ty) = output {
            if let Some(ty) = type_ref(ty, owner) {
                self.return_types
                    .insert((owner.to_string(), method.to_string()), ty);
            }
        }

        // Thread-safe append to method_lookup
        let mut declarers = self.method_lookup.entry(method.to_string()).or_default();
        if !declarers.iter().any(|t| t == owner) {
            declarers.push(owner.to_string());
        }
    }
}
