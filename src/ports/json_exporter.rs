//! JSON renderings of a report: the whole report, or one of its graphs as
//! nodes and edges.

use serde::Serialize;
use serde_json::json;

use crate::api::dto::GraphDto;
use crate::application::AnalysisReport;
use crate::ports::OutputExporter;

fn to_pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
}

/// The full [`AnalysisReport`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportJsonExporter;

impl OutputExporter for ReportJsonExporter {
    fn render(&self, report: &AnalysisReport) -> String {
        to_pretty_json(report)
    }
}

/// Call graph elements: `CLASS`, `METHOD` and `EXTERNAL` nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphJsonExporter;

impl OutputExporter for GraphJsonExporter {
    fn render(&self, report: &AnalysisReport) -> String {
        to_pretty_json(&GraphDto::from(&report.call_graph))
    }
}

/// Coupling graph elements: class nodes and weighted edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct CouplingJsonExporter;

impl OutputExporter for CouplingJsonExporter {
    fn render(&self, report: &AnalysisReport) -> String {
        to_pretty_json(&GraphDto::from(&report.coupling))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{analyze, AnalyzeOptions};
    use crate::domain::declarations::{
        CompilationUnit, Invocation, MethodDeclaration, ProjectDeclarations, TypeDeclaration,
    };

    fn report() -> AnalysisReport {
        let decls = ProjectDeclarations::from_units([CompilationUnit::new("A.java").with_type(
            TypeDeclaration::class("A")
                .with_method(MethodDeclaration::new("m1").calls(Invocation::new("helper").on("B"))),
        )]);
        analyze(&decls, &AnalyzeOptions::new(2))
    }

    #[test]
    fn test_report_json_has_every_section() {
        let value: serde_json::Value = serde_json::from_str(&ReportJsonExporter.render(&report())).unwrap();
        for key in [
            "call_graph",
            "method_counts",
            "attribute_counts",
            "coupling",
            "top_by_methods",
            "top_by_attributes",
            "top_intersection",
            "over_threshold",
            "stats",
            "skipped_units",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["call_graph"]["A"]["m1"][0]["receiver_type"], "B");
        assert_eq!(value["coupling"]["map"]["A"]["B"], 1.0);
    }

    #[test]
    fn test_graph_and_coupling_json() {
        let report = report();
        let graph: GraphDto = serde_json::from_str(&GraphJsonExporter.render(&report)).unwrap();
        assert_eq!(graph.nodes.len(), 3);

        let coupling: GraphDto = serde_json::from_str(&CouplingJsonExporter.render(&report)).unwrap();
        assert_eq!(coupling.nodes.len(), 2);
        assert_eq!(coupling.edges[0].weight, Some(1.0));
    }
}
