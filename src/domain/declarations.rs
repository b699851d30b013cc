//! Declaration stream consumed by the call graph builder.
//!
//! A Declaration Source (the `syn` front-end, or a JSON dump written by any
//! external parser) hands the core one [`SourceUnit`] per compilation unit.
//! All semantic resolution has already happened by then: invocations carry
//! plain optional type names and nothing else.

use serde::{Deserialize, Serialize};

/// One invocation expression inside a method body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub callee_name: String,
    /// Resolved type of the receiver expression, when there is one and it resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_type: Option<String>,
    /// Declaring class of the statically resolved target method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_class: Option<String>,
}

impl Invocation {
    pub fn new(callee_name: impl Into<String>) -> Self {
        Self {
            callee_name: callee_name.into(),
            ..Self::default()
        }
    }

    pub fn on(mut self, receiver_type: impl Into<String>) -> Self {
        self.receiver_type = Some(receiver_type.into());
        self
    }

    pub fn declared_by(mut self, class: impl Into<String>) -> Self {
        self.declaring_class = Some(class.into());
        self
    }
}

/// One field-declaration fragment (`int a, b;` is two of these).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    #[serde(default)]
    pub parameter_count: usize,
    #[serde(default)]
    pub line_count: usize,
    /// Body invocations in depth-first, pre-order source order.
    #[serde(default)]
    pub invocations: Vec<Invocation>,
}

impl MethodDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn calls(mut self, invocation: Invocation) -> Self {
        self.invocations.push(invocation);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub methods: Vec<MethodDeclaration>,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
}

impl TypeDeclaration {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_interface: true,
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: MethodDeclaration) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, type_name: Option<&str>) -> Self {
        self.fields.push(FieldDeclaration {
            name: name.into(),
            type_name: type_name.map(str::to_string),
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default)]
    pub line_count: usize,
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
}

impl CompilationUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, decl: TypeDeclaration) -> Self {
        self.types.push(decl);
        self
    }
}

/// A compilation unit the parser could not turn into declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnparsableUnit {
    pub unit: String,
    pub reason: String,
}

pub type SourceUnit = Result<CompilationUnit, UnparsableUnit>;

/// The complete, ordered declaration stream of one project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDeclarations {
    pub units: Vec<SourceUnit>,
}

impl ProjectDeclarations {
    pub fn new(units: Vec<SourceUnit>) -> Self {
        Self { units }
    }

    pub fn from_units(units: impl IntoIterator<Item = CompilationUnit>) -> Self {
        Self {
            units: units.into_iter().map(Ok).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn extend(&mut self, other: ProjectDeclarations) {
        self.units.extend(other.units);
    }

    /// Parse a JSON declaration dump: a single unit, an array of units, or
    /// an object with a `units` array.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let dump: DumpShape = serde_json::from_str(json)?;
        let units = match dump {
            DumpShape::Wrapped { units } | DumpShape::Many(units) => units,
            DumpShape::One(unit) => vec![unit],
        };
        Ok(Self {
            units: units.into_iter().map(UnitDump::into_source_unit).collect(),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DumpShape {
    Wrapped { units: Vec<UnitDump> },
    Many(Vec<UnitDump>),
    One(UnitDump),
}

#[derive(Deserialize)]
struct UnitDump {
    name: String,
    #[serde(default)]
    package: Option<String>,
    #[serde(default)]
    line_count: usize,
    #[serde(default)]
    types: Vec<TypeDeclaration>,
    #[serde(default)]
    error: Option<String>,
}

impl UnitDump {
    fn into_source_unit(self) -> SourceUnit {
        match self.error {
            Some(reason) => Err(UnparsableUnit {
                unit: self.name,
                reason,
            }),
            None => Ok(CompilationUnit {
                name: self.name,
                package: self.package,
                line_count: self.line_count,
                types: self.types,
            }),
        }
    }
}
