//! The analyze use case: declarations in, one report out.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::domain::builder::{BuildScope, CallGraphBuilder};
use crate::domain::callgraph::ProjectCallGraph;
use crate::domain::classifier::{intersection, over_threshold, top_ten_percent};
use crate::domain::coupling::{self, CouplingReport};
use crate::domain::declarations::{ProjectDeclarations, UnparsableUnit};
use crate::domain::stats::ProjectStats;
use crate::error::{Error, Result};
use crate::infrastructure::config::AnalysisConfig;
use crate::infrastructure::project_loader::SourceFile;
use crate::ports::{DeclarationSource, OutputExporter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    pub coupling_enabled: bool,
    pub method_threshold: i64,
    pub scope: BuildScope,
}

impl AnalyzeOptions {
    pub fn new(method_threshold: i64) -> Self {
        Self {
            coupling_enabled: true,
            method_threshold,
            scope: BuildScope::Project,
        }
    }

    pub fn with_coupling(mut self, enabled: bool) -> Self {
        self.coupling_enabled = enabled;
        self
    }

    pub fn with_scope(mut self, scope: BuildScope) -> Self {
        self.scope = scope;
        self
    }
}

impl From<&AnalysisConfig> for AnalyzeOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self::new(config.method_threshold).with_coupling(config.coupling)
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub call_graph: ProjectCallGraph,
    pub method_counts: IndexMap<String, usize>,
    pub attribute_counts: IndexMap<String, usize>,
    pub coupling_enabled: bool,
    pub coupling: CouplingReport,
    pub top_by_methods: Vec<String>,
    pub top_by_attributes: Vec<String>,
    pub top_intersection: Vec<String>,
    pub method_threshold: i64,
    pub over_threshold: Vec<String>,
    pub stats: ProjectStats,
    pub skipped_units: Vec<UnparsableUnit>,
}

/// Build the call graph, then run every consumer over it.
///
/// Coupling only starts once the graph is complete. With coupling disabled
/// the analyzer is not run and the report carries an empty map.
pub fn analyze(declarations: &ProjectDeclarations, options: &AnalyzeOptions) -> AnalysisReport {
    let span = info_span!("analyze", units = declarations.units.len());
    let _guard = span.enter();

    let output = CallGraphBuilder::new(options.scope.clone()).build(declarations);
    let counters = output.counters;

    let coupling = if options.coupling_enabled {
        coupling::analyze(&output.graph)
    } else {
        CouplingReport::default()
    };

    let top_by_methods = top_ten_percent(&counters.method_counts);
    let top_by_attributes = top_ten_percent(&counters.attribute_counts);
    let top_intersection = intersection(&top_by_methods, &top_by_attributes);
    let over = over_threshold(&counters.method_counts, options.method_threshold);
    let stats = ProjectStats::collect(declarations, &options.scope);

    info!(
        classes = output.graph.class_count(),
        hot = top_intersection.len(),
        over_threshold = over.len(),
        "analysis complete"
    );

    AnalysisReport {
        call_graph: output.graph,
        method_counts: counters.method_counts,
        attribute_counts: counters.attribute_counts,
        coupling_enabled: options.coupling_enabled,
        coupling,
        top_by_methods,
        top_by_attributes,
        top_intersection,
        method_threshold: options.method_threshold,
        over_threshold: over,
        stats,
        skipped_units: output.skipped,
    }
}

pub struct AnalyzeUsecase<'a> {
    pub source: &'a dyn DeclarationSource,
    pub exporter: &'a dyn OutputExporter,
}

impl<'a> AnalyzeUsecase<'a> {
    pub fn analyze(&self, sources: &[SourceFile], options: &AnalyzeOptions) -> AnalysisReport {
        let declarations = self.source.declarations(sources);
        analyze(&declarations, options)
    }

    /// Analyze and write the rendered report to `export_path`.
    pub fn run(
        &self,
        sources: &[SourceFile],
        options: &AnalyzeOptions,
        export_path: &str,
    ) -> Result<AnalysisReport> {
        let report = self.analyze(sources, options);
        self.exporter
            .export(&report, export_path)
            .map_err(|e| Error::io(export_path, e))?;
        Ok(report)
    }
}
