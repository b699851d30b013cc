// Infrastructure implementations for hotgraph.

pub mod concurrency;
pub mod config;
pub mod json_source;
pub mod project_loader;
pub mod syn_source;

use rayon::prelude::*;

use crate::domain::declarations::{ProjectDeclarations, SourceUnit};
use crate::domain::format::InputFormat;
use crate::domain::index::SymbolIndex;
use crate::ports::DeclarationSource;
use json_source::JsonDeclarationSource;
use project_loader::SourceFile;

/// Dispatches each file to the source for its format, keeping file order.
/// Files of no known format are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectSource;

impl DeclarationSource for ProjectSource {
    fn declarations(&self, sources: &[SourceFile]) -> ProjectDeclarations {
        let rust: Vec<SourceFile> = sources
            .iter()
            .filter(|s| s.format() == Some(InputFormat::RustSource))
            .cloned()
            .collect();
        let index = SymbolIndex::build(&rust);

        let units: Vec<Vec<SourceUnit>> = sources
            .par_iter()
            .map(|source| match source.format() {
                Some(InputFormat::RustSource) => vec![syn_source::extract_unit(source, &index)],
                Some(InputFormat::DeclarationDump) => JsonDeclarationSource::units(source),
                None => Vec::new(),
            })
            .collect();

        ProjectDeclarations::new(units.into_iter().flatten().collect())
    }
}
