//! Call Graph Builder.
//!
//! Walks the declaration stream of a project and folds it into one
//! [`ProjectCallGraph`] plus [`PerClassCounters`]. Each compilation unit is
//! turned into a private fragment (in parallel, on the rayon pool) and the
//! fragments are merged in unit order on the calling thread, so the result
//! does not depend on scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::domain::callgraph::{MethodCall, PerClassCounters, ProjectCallGraph};
use crate::domain::declarations::{CompilationUnit, ProjectDeclarations, UnparsableUnit};
use crate::domain::resolver::resolve_receiver;

/// Which declared types the builder processes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildScope {
    #[default]
    Project,
    /// Only types with exactly this simple name.
    Class(String),
}

impl BuildScope {
    pub fn includes(&self, class: &str) -> bool {
        match self {
            BuildScope::Project => true,
            BuildScope::Class(name) => name == class,
        }
    }
}

/// Everything one build produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub graph: ProjectCallGraph,
    pub counters: PerClassCounters,
    pub skipped: Vec<UnparsableUnit>,
}

#[derive(Debug, Clone, Default)]
pub struct CallGraphBuilder {
    scope: BuildScope,
}

impl CallGraphBuilder {
    pub fn new(scope: BuildScope) -> Self {
        Self { scope }
    }

    pub fn for_class(class: impl Into<String>) -> Self {
        Self::new(BuildScope::Class(class.into()))
    }

    pub fn scope(&self) -> &BuildScope {
        &self.scope
    }

    pub fn build(&self, declarations: &ProjectDeclarations) -> BuildOutput {
        let span = info_span!("build_call_graph", units = declarations.units.len());
        let _guard = span.enter();

        let fragments: Vec<Result<BuildOutput, &UnparsableUnit>> = declarations
            .units
            .par_iter()
            .map(|unit| unit.as_ref().map(|cu| self.build_unit(cu)))
            .collect();

        let mut output = BuildOutput::default();
        for fragment in fragments {
            match fragment {
                Ok(fragment) => {
                    for class in fragment.graph.class_names() {
                        if output.graph.contains_class(class) {
                            debug!(class = %class, "merging repeated class declaration");
                        }
                    }
                    output.graph.merge(fragment.graph);
                    output.counters.merge(fragment.counters);
                }
                Err(unparsable) => {
                    warn!(unit = %unparsable.unit, reason = %unparsable.reason, "skipping unparsable unit");
                    output.skipped.push(unparsable.clone());
                }
            }
        }

        info!(
            classes = output.graph.class_count(),
            calls = output.graph.call_count(),
            skipped = output.skipped.len(),
            "call graph built"
        );
        output
    }

    /// Build the fragment contributed by one compilation unit.
    pub fn build_unit(&self, unit: &CompilationUnit) -> BuildOutput {
        let mut out = BuildOutput::default();

        for decl in unit.types.iter().filter(|t| self.scope.includes(&t.name)) {
            out.graph.add_class(&decl.name);
            out.counters.register(&decl.name);
            out.counters.add_methods(&decl.name, decl.methods.len());
            out.counters.add_attributes(&decl.name, decl.fields.len());

            for method in &decl.methods {
                out.graph.add_method(&decl.name, &method.name);
                for invocation in &method.invocations {
                    let receiver = resolve_receiver(invocation, &decl.name);
                    out.graph.add_call(
                        &decl.name,
                        &method.name,
                        MethodCall::new(invocation.callee_name.clone(), receiver),
                    );
                }
            }
        }

        out
    }
}
