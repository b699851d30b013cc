//! Declaration source for Rust code, built on `syn`.
//!
//! Structs, enums and unions become classes, traits become interfaces, and
//! `impl` blocks attach their functions and associated consts to the type they
//! implement. Binding is best effort: a receiver type is only reported when it
//! can be read off a signature, a `let`, a struct literal or the
//! [`SymbolIndex`].

use std::collections::HashMap;
use std::path::{Component, Path};

use indexmap::IndexMap;
use proc_macro2::Span;
use rayon::prelude::*;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{
    Block, Expr, ExprCall, ExprClosure, ExprForLoop, ExprMethodCall, FnArg, ImplItem, Item, Local,
    Macro, Member, Pat, Signature, Token, TraitItem,
};
use tracing::{debug, info};

use crate::domain::declarations::{
    CompilationUnit, FieldDeclaration, Invocation, MethodDeclaration, ProjectDeclarations,
    SourceUnit, TypeDeclaration, UnparsableUnit,
};
use crate::domain::index::{type_ref, SymbolIndex, TypeRef};
use crate::infrastructure::project_loader::SourceFile;
use crate::ports::DeclarationSource;

/// Methods whose result has the receiver's type for binding purposes.
const PASSTHROUGH_METHODS: &[&str] = &[
    "iter", "iter_mut", "into_iter", "clone", "as_ref", "as_mut", "borrow", "borrow_mut",
    "lock", "read", "write", "to_owned",
];

/// Methods that yield the element type of an `Option`/`Result`.
const UNWRAP_METHODS: &[&str] = &["unwrap", "expect", "unwrap_or_default"];

/// `impl` targets that are never project classes: primitives, slices and std types.
const FOREIGN_IMPL_TARGETS: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32",
    "u64", "u128", "usize", "f32", "f64", "slice", "array", "String", "Vec", "VecDeque",
    "LinkedList", "HashMap", "HashSet", "BTreeMap", "BTreeSet", "Option", "Result", "Cow",
    "Path", "PathBuf",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SynDeclarationSource;

impl DeclarationSource for SynDeclarationSource {
    fn declarations(&self, sources: &[SourceFile]) -> ProjectDeclarations {
        let index = SymbolIndex::build(sources);
        let units: Vec<SourceUnit> = sources
            .par_iter()
            .map(|source| extract_unit(source, &index))
            .collect();
        info!(files = sources.len(), "extracted Rust declarations");
        ProjectDeclarations::new(units)
    }
}

/// Turn one Rust file into a compilation unit, using `index` for binding.
pub fn extract_unit(source: &SourceFile, index: &SymbolIndex) -> SourceUnit {
    let ast = syn::parse_file(&source.content).map_err(|e| UnparsableUnit {
        unit: source.path.clone(),
        reason: e.to_string(),
    })?;

    let mut extractor = UnitExtractor {
        index,
        types: IndexMap::new(),
    };
    extractor.items(&ast.items);
    debug!(file = %source.path, types = extractor.types.len(), "extracted unit");

    let package = module_path(&source.crate_name, &source.path);
    Ok(CompilationUnit {
        name: source.path.clone(),
        package: (!package.is_empty()).then_some(package),
        line_count: source.content.lines().count(),
        types: extractor.types.into_values().collect(),
    })
}

/// `crate::a::b` for `<crate>/src/a/b.rs`; `lib.rs`, `main.rs` and `mod.rs`
/// name their parent module.
pub fn module_path(crate_name: &str, path: &str) -> String {
    let components: Vec<&str> = Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    let in_crate = match components.iter().rposition(|c| *c == "src") {
        Some(src) => &components[src + 1..],
        None => &components[components.len().saturating_sub(1)..],
    };

    let mut segments: Vec<String> = Vec::new();
    if !crate_name.is_empty() {
        segments.push(crate_name.to_string());
    }
    for (i, part) in in_crate.iter().enumerate() {
        let is_file = i + 1 == in_crate.len();
        let part = if is_file {
            part.strip_suffix(".rs").unwrap_or(part)
        } else {
            part
        };
        if is_file && matches!(part, "lib" | "main" | "mod") {
            continue;
        }
        segments.push(part.replace('-', "_"));
    }
    segments.join("::")
}

struct UnitExtractor<'a> {
    index: &'a SymbolIndex,
    types: IndexMap<String, TypeDeclaration>,
}

impl UnitExtractor<'_> {
    fn entry(&mut self, name: &str) -> &mut TypeDeclaration {
        self.types
            .entry(name.to_string())
            .or_insert_with(|| TypeDeclaration::class(name))
    }

    fn items(&mut self, items: &[Item]) {
        for item in items {
            match item {
                Item::Struct(s) => {
                    let owner = s.ident.to_string();
                    let fields: Vec<FieldDeclaration> = s
                        .fields
                        .iter()
                        .enumerate()
                        .map(|(i, f)| field(&owner, i, f))
                        .collect();
                    self.entry(&owner).fields.extend(fields);
                }
                Item::Union(u) => {
                    let owner = u.ident.to_string();
                    let fields: Vec<FieldDeclaration> = u
                        .fields
                        .named
                        .iter()
                        .enumerate()
                        .map(|(i, f)| field(&owner, i, f))
                        .collect();
                    self.entry(&owner).fields.extend(fields);
                }
                Item::Enum(e) => {
                    self.entry(&e.ident.to_string());
                }
                Item::Trait(t) => {
                    let owner = t.ident.to_string();
                    self.entry(&owner).is_interface = true;
                    for trait_item in &t.items {
                        match trait_item {
                            TraitItem::Fn(f) => {
                                let method =
                                    self.method(&owner, &f.sig, f.default.as_ref(), f.span());
                                self.entry(&owner).methods.push(method);
                            }
                            TraitItem::Const(c) => {
                                let constant = FieldDeclaration {
                                    name: c.ident.to_string(),
                                    type_name: type_ref(&c.ty, &owner).map(|t| t.name),
                                };
                                self.entry(&owner).fields.push(constant);
                            }
                            _ => {}
                        }
                    }
                }
                Item::Impl(imp) => {
                    let Some(owner) = type_ref(&imp.self_ty, "").map(|t| t.name) else {
                        continue;
                    };
                    if FOREIGN_IMPL_TARGETS.contains(&owner.as_str()) {
                        debug!(target_type = %owner, "skipping impl on a non-project type");
                        continue;
                    }
                    self.entry(&owner);
                    for impl_item in &imp.items {
                        match impl_item {
                            ImplItem::Fn(f) => {
                                let method = self.method(&owner, &f.sig, Some(&f.block), f.span());
                                self.entry(&owner).methods.push(method);
                            }
                            ImplItem::Const(c) => {
                                let constant = FieldDeclaration {
                                    name: c.ident.to_string(),
                                    type_name: type_ref(&c.ty, &owner).map(|t| t.name),
                                };
                                self.entry(&owner).fields.push(constant);
                            }
                            _ => {}
                        }
                    }
                }
                Item::Mod(module) => {
                    if let Some((_, content)) = &module.content {
                        self.items(content);
                    }
                }
                _ => {}
            }
        }
    }

    fn method(&self, owner: &str, sig: &Signature, body: Option<&Block>, span: Span) -> MethodDeclaration {
        let mut collector = CallCollector::new(self.index, owner, sig);
        if let Some(body) = body {
            collector.visit_block(body);
        }
        MethodDeclaration {
            name: sig.ident.to_string(),
            parameter_count: sig
                .inputs
                .iter()
                .filter(|input| matches!(input, FnArg::Typed(_)))
                .count(),
            line_count: span.end().line.saturating_sub(span.start().line),
            invocations: collector.invocations,
        }
    }
}

fn field(owner: &str, position: usize, f: &syn::Field) -> FieldDeclaration {
    FieldDeclaration {
        name: f
            .ident
            .as_ref()
            .map_or_else(|| position.to_string(), |ident| ident.to_string()),
        type_name: type_ref(&f.ty, owner).map(|t| t.name),
    }
}

/// Collects the invocations of one method body in pre-order.
struct CallCollector<'a> {
    index: &'a SymbolIndex,
    owner: &'a str,
    bindings: HashMap<String, TypeRef>,
    invocations: Vec<Invocation>,
}

impl<'a> CallCollector<'a> {
    fn new(index: &'a SymbolIndex, owner: &'a str, sig: &Signature) -> Self {
        let mut collector = Self {
            index,
            owner,
            bindings: HashMap::new(),
            invocations: Vec::new(),
        };
        for input in &sig.inputs {
            match input {
                FnArg::Receiver(_) => {
                    collector
                        .bindings
                        .insert("self".to_string(), TypeRef::named(owner));
                }
                FnArg::Typed(typed) => {
                    let ty = type_ref(&typed.ty, owner);
                    collector.bind(&typed.pat, ty);
                }
            }
        }
        collector
    }

    /// Bind the identifiers of `pat`. An unknown type clears a shadowed binding.
    fn bind(&mut self, pat: &Pat, ty: Option<TypeRef>) {
        match pat {
            Pat::Ident(p) => {
                let name = p.ident.to_string();
                match ty {
                    Some(ty) => {
                        self.bindings.insert(name, ty);
                    }
                    None => {
                        self.bindings.remove(&name);
                    }
                }
            }
            Pat::Type(p) => {
                let annotated = type_ref(&p.ty, self.owner).or(ty);
                self.bind(&p.pat, annotated);
            }
            Pat::Reference(p) => self.bind(&p.pat, ty),
            Pat::Paren(p) => self.bind(&p.pat, ty),
            _ => {}
        }
    }

    fn type_of(&self, expr: &Expr) -> Option<TypeRef> {
        match expr {
            Expr::Path(p) if p.qself.is_none() => {
                let ident = p.path.get_ident()?;
                self.bindings.get(&ident.to_string()).cloned()
            }
            Expr::Field(f) => {
                let base = self.type_of(&f.base)?;
                let member = match &f.member {
                    Member::Named(ident) => ident.to_string(),
                    Member::Unnamed(index) => index.index.to_string(),
                };
                self.index.field_type(&base.name, &member)
            }
            Expr::MethodCall(m) => {
                let base = self.type_of(&m.receiver)?;
                let method = m.method.to_string();
                if PASSTHROUGH_METHODS.contains(&method.as_str()) {
                    Some(base)
                } else if UNWRAP_METHODS.contains(&method.as_str()) {
                    base.unwrap_inner()
                } else {
                    self.index.return_type(&base.name, &method)
                }
            }
            Expr::Call(c) => {
                let Expr::Path(func) = &*c.func else {
                    return None;
                };
                let segments: Vec<String> =
                    func.path.segments.iter().map(|s| s.ident.to_string()).collect();
                match segments.as_slice() {
                    [.., qualifier, function] => {
                        let owner = self.qualifier_type(qualifier)?;
                        self.index.return_type(&owner, function)
                    }
                    // Tuple-struct constructor.
                    [single] if starts_uppercase(single) => Some(TypeRef::named(single.as_str())),
                    _ => None,
                }
            }
            Expr::Struct(s) => {
                let name = s.path.segments.last()?.ident.to_string();
                self.qualifier_type(&name).map(TypeRef::named)
            }
            Expr::Reference(r) => self.type_of(&r.expr),
            Expr::Paren(p) => self.type_of(&p.expr),
            Expr::Group(g) => self.type_of(&g.expr),
            Expr::Unary(u) if matches!(u.op, syn::UnOp::Deref(_)) => self.type_of(&u.expr),
            Expr::Try(t) => self.type_of(&t.expr)?.unwrap_inner(),
            Expr::Cast(c) => type_ref(&c.ty, self.owner),
            _ => None,
        }
    }

    /// `Self` names the enclosing type; other capitalised segments name a type.
    fn qualifier_type(&self, segment: &str) -> Option<String> {
        if segment == "Self" {
            Some(self.owner.to_string())
        } else if starts_uppercase(segment) {
            Some(segment.to_string())
        } else {
            None
        }
    }
}

impl<'ast> Visit<'ast> for CallCollector<'_> {
    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        let callee_name = node.method.to_string();
        let receiver_type = self.type_of(&node.receiver).map(|t| t.name);
        let declaring_class = match receiver_type {
            Some(_) => None,
            None => self.index.unique_declarer(&callee_name),
        };
        self.invocations.push(Invocation {
            callee_name,
            receiver_type,
            declaring_class,
        });
        visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        if let Expr::Path(func) = &*node.func {
            let segments: Vec<String> =
                func.path.segments.iter().map(|s| s.ident.to_string()).collect();
            if let Some(callee) = segments.last().filter(|name| !starts_uppercase(name)) {
                let declaring_class = match segments.as_slice() {
                    [.., qualifier, _] => self.qualifier_type(qualifier),
                    _ => None,
                };
                self.invocations.push(Invocation {
                    callee_name: callee.clone(),
                    receiver_type: None,
                    declaring_class,
                });
            }
        }
        visit::visit_expr_call(self, node);
    }

    fn visit_local(&mut self, node: &'ast Local) {
        if let Some(init) = &node.init {
            self.visit_expr(&init.expr);
            if let Some((_, diverge)) = &init.diverge {
                self.visit_expr(diverge);
            }
        }
        let ty = node.init.as_ref().and_then(|init| self.type_of(&init.expr));
        self.bind(&node.pat, ty);
    }

    fn visit_expr_closure(&mut self, node: &'ast ExprClosure) {
        for input in &node.inputs {
            self.bind(input, None);
        }
        visit::visit_expr_closure(self, node);
    }

    fn visit_expr_for_loop(&mut self, node: &'ast ExprForLoop) {
        self.visit_expr(&node.expr);
        let element = self.type_of(&node.expr).and_then(|t| t.unwrap_inner());
        self.bind(&node.pat, element);
        self.visit_block(&node.body);
    }

    // Macro arguments are opaque tokens; walk them when they read as `expr, expr, ...`.
    fn visit_macro(&mut self, node: &'ast Macro) {
        if let Ok(args) = node.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            for arg in &args {
                self.visit_expr(arg);
            }
        }
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
