//! Input formats the analyzer accepts.

use std::fmt;
use std::path::Path;

/// How a project file is turned into declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InputFormat {
    /// Rust source, parsed with `syn`.
    #[default]
    RustSource,
    /// A JSON declaration dump written by an external parser.
    DeclarationDump,
}

impl InputFormat {
    /// Parse a format name (CLI/config input).
    pub fn parse(s: &str) -> Option<InputFormat> {
        match s.to_lowercase().as_str() {
            "rust" | "rs" => Some(InputFormat::RustSource),
            "json" | "dump" | "declarations" => Some(InputFormat::DeclarationDump),
            _ => None,
        }
    }

    /// Infer format from file extension.
    pub fn from_extension(ext: &str) -> Option<InputFormat> {
        match ext.to_lowercase().as_str() {
            "rs" => Some(InputFormat::RustSource),
            "json" => Some(InputFormat::DeclarationDump),
            _ => None,
        }
    }

    /// Infer format from a file path.
    pub fn from_path(path: &Path) -> Option<InputFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn name(&self) -> &'static str {
        match self {
            InputFormat::RustSource => "Rust source",
            InputFormat::DeclarationDump => "declaration dump",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            InputFormat::RustSource => &["rs"],
            InputFormat::DeclarationDump => &["json"],
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
