//! Declaration dumps written by external parsers.

use tracing::warn;

use crate::domain::declarations::{ProjectDeclarations, SourceUnit, UnparsableUnit};
use crate::error::{Error, Result};
use crate::infrastructure::project_loader::SourceFile;
use crate::ports::DeclarationSource;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeclarationSource;

impl JsonDeclarationSource {
    pub fn parse(source: &SourceFile) -> Result<ProjectDeclarations> {
        ProjectDeclarations::from_json_str(&source.content).map_err(|e| Error::json(&source.path, e))
    }

    /// The units of one dump. A dump that is not valid JSON becomes a
    /// single unparsable unit named after the file.
    pub fn units(source: &SourceFile) -> Vec<SourceUnit> {
        match Self::parse(source) {
            Ok(declarations) => declarations.units,
            Err(e) => {
                warn!(error = %e, "unreadable declaration dump");
                vec![Err(UnparsableUnit {
                    unit: source.path.clone(),
                    reason: e.to_string(),
                })]
            }
        }
    }
}

impl DeclarationSource for JsonDeclarationSource {
    fn declarations(&self, sources: &[SourceFile]) -> ProjectDeclarations {
        ProjectDeclarations::new(sources.iter().flat_map(Self::units).collect())
    }
}
