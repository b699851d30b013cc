use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::domain::callgraph::ProjectCallGraph;
use crate::domain::coupling::CouplingReport;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDto {
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Class,
    Method,
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    /// Owning class of a method node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDto {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl NodeDto {
    fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            class: None,
        }
    }
}

impl EdgeDto {
    fn new(from: impl Into<String>, to: impl Into<String>, type_: &str) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            type_: type_.to_string(),
            weight: None,
        }
    }
}

impl From<&ProjectCallGraph> for GraphDto {
    fn from(graph: &ProjectCallGraph) -> Self {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        for (class, methods) in graph.iter() {
            nodes.push(NodeDto::new(class.as_str(), class.as_str(), NodeKind::Class));
            for (method, calls) in methods {
                let method_id = format!("{class}.{method}");
                nodes.push(NodeDto {
                    class: Some(class.clone()),
                    ..NodeDto::new(method_id.as_str(), method.as_str(), NodeKind::Method)
                });
                edges.push(EdgeDto::new(class.as_str(), method_id.as_str(), "contains"));
                for call in calls {
                    edges.push(EdgeDto::new(method_id.as_str(), call.target_id(), "calls"));
                }
            }
        }

        let externals: IndexSet<String> = graph
            .call_targets()
            .into_iter()
            .filter(|call| !graph.is_project_method(call))
            .map(|call| call.target_id())
            .collect();
        nodes.extend(
            externals
                .into_iter()
                .map(|target| NodeDto::new(target.clone(), target, NodeKind::External)),
        );

        GraphDto { nodes, edges }
    }
}

impl From<&CouplingReport> for GraphDto {
    fn from(report: &CouplingReport) -> Self {
        let mut classes: IndexSet<&str> = IndexSet::new();
        let mut edges = Vec::new();

        for (source, targets) in &report.map {
            classes.insert(source.as_str());
            for (target, value) in targets {
                classes.insert(target.as_str());
                edges.push(EdgeDto {
                    weight: Some(*value),
                    ..EdgeDto::new(source.as_str(), target.as_str(), "coupling")
                });
            }
        }

        let nodes = classes
            .into_iter()
            .map(|class| NodeDto::new(class, class, NodeKind::Class))
            .collect();
        GraphDto { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::callgraph::MethodCall;
    use crate::domain::coupling;

    #[test]
    fn test_call_graph_elements() {
        let mut graph = ProjectCallGraph::new();
        graph.add_call("A", "m1", MethodCall::new("helper", "B"));
        graph.add_call("A", "m1", MethodCall::new("len", "Vec"));
        graph.add_method("B", "helper");

        let dto = GraphDto::from(&graph);
        let kinds: Vec<(&str, NodeKind)> = dto.nodes.iter().map(|n| (n.id.as_str(), n.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("A", NodeKind::Class),
                ("A.m1", NodeKind::Method),
                ("B", NodeKind::Class),
                ("B.helper", NodeKind::Method),
                ("Vec.len", NodeKind::External),
            ]
        );
        assert_eq!(dto.edges.len(), 4);
        assert_eq!(dto.edges[1].to, "B.helper");

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["nodes"][0]["kind"], "CLASS");
        assert_eq!(json["nodes"][1]["class"], "A");
        assert_eq!(json["edges"][1]["type"], "calls");
    }

    #[test]
    fn test_coupling_elements() {
        let mut graph = ProjectCallGraph::new();
        graph.add_call("A", "m", MethodCall::new("x", "B"));
        graph.add_call("B", "n", MethodCall::new("y", "C"));

        let dto = GraphDto::from(&coupling::analyze(&graph));
        let ids: Vec<&str> = dto.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(dto.edges.len(), 2);
        assert_eq!(dto.edges[0].weight, Some(0.5));
    }
}
