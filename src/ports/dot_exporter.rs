//! Call graph DOT Exporter
//!
//! Exports the project call graph as Graphviz DOT: classes contain methods,
//! methods point at what they call, with a legend cluster.

use indexmap::IndexSet;

use crate::application::AnalysisReport;
use crate::domain::callgraph::ProjectCallGraph;
use crate::ports::OutputExporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Class,
    Method,
    External,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DotExporter;

impl OutputExporter for DotExporter {
    fn render(&self, report: &AnalysisReport) -> String {
        Self::to_dot(&report.call_graph)
    }
}

impl DotExporter {
    /// Convert a call graph to a DOT string.
    pub fn to_dot(graph: &ProjectCallGraph) -> String {
        let mut lines = Vec::new();

        lines.push("digraph CallGraph {".to_string());
        lines.push("    rankdir=LR;".to_string()); // Left to right
        lines.push("    node [fontname=\"Helvetica\", fontsize=12];".to_string());
        lines.push("    edge [fontname=\"Helvetica\", fontsize=10];".to_string());
        lines.push("".to_string());

        // Class and method nodes
        for (class, methods) in graph.iter() {
            lines.push(Self::node(class, class, NodeKind::Class));
            for method in methods.keys() {
                lines.push(Self::node(&format!("{class}.{method}"), method, NodeKind::Method));
            }
        }

        // One node per call target outside the graph
        let externals: IndexSet<String> = graph
            .call_targets()
            .into_iter()
            .filter(|call| !graph.is_project_method(call))
            .map(|call| call.target_id())
            .collect();
        for target in &externals {
            lines.push(Self::node(target, target, NodeKind::External));
        }

        lines.push("".to_string());

        for (class, methods) in graph.iter() {
            for (method, calls) in methods {
                let method_id = format!("{class}.{method}");
                lines.push(Self::edge(class, &method_id));
                for call in calls {
                    lines.push(Self::edge(&method_id, &call.target_id()));
                }
            }
        }

        lines.push("".to_string());
        lines.extend(Self::legend());
        lines.push("}".to_string());

        lines.join("\n")
    }

    fn node(id: &str, label: &str, kind: NodeKind) -> String {
        let (shape, color) = Self::node_style(kind);
        format!(
            "    \"{}\" [label=\"{}\", shape={}, style=filled, fillcolor={}];",
            Self::escape_label(id),
            Self::escape_label(label),
            shape,
            color
        )
    }

    fn edge(from: &str, to: &str) -> String {
        format!(
            "    \"{}\" -> \"{}\";",
            Self::escape_label(from),
            Self::escape_label(to)
        )
    }

    fn node_style(kind: NodeKind) -> (&'static str, &'static str) {
        match kind {
            NodeKind::Class => ("ellipse", "orange"),
            NodeKind::Method => ("box", "pink"),
            NodeKind::External => ("box", "mediumpurple"),
        }
    }

    fn legend() -> Vec<String> {
        let (_, class) = Self::node_style(NodeKind::Class);
        let (_, method) = Self::node_style(NodeKind::Method);
        let (_, external) = Self::node_style(NodeKind::External);
        vec![
            "    subgraph cluster_legend {".to_string(),
            "        label=\"Legend\";".to_string(),
            "        fontsize=14;".to_string(),
            "        color=black;".to_string(),
            "        style=dashed;".to_string(),
            format!("        legend_class [label=\"Class\", shape=box, style=filled, fillcolor={class}];"),
            format!("        legend_method [label=\"Project method\", shape=box, style=filled, fillcolor={method}];"),
            format!("        legend_external [label=\"External method\", shape=box, style=filled, fillcolor={external}];"),
            "        legend_class -> legend_method [label=\"contains\"];".to_string(),
            "        legend_method -> legend_external [label=\"calls\"];".to_string(),
            "    }".to_string(),
        ]
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}
