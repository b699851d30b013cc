// Call graph structures for hotgraph.
// Represents class -> method -> ordered call relationships.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// One invocation recorded inside a method body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodCall {
    pub callee_name: String,
    /// Best-effort label, not a verified fully-qualified type.
    pub receiver_type: String,
}

impl MethodCall {
    pub fn new(callee_name: impl Into<String>, receiver_type: impl Into<String>) -> Self {
        Self {
            callee_name: callee_name.into(),
            receiver_type: receiver_type.into(),
        }
    }

    /// Identifier of the call target, `Receiver.callee`.
    pub fn target_id(&self) -> String {
        format!("{}.{}", self.receiver_type, self.callee_name)
    }
}

/// Method name -> calls in source order. Overloads share a key (last write wins).
pub type MethodEntry = IndexMap<String, Vec<MethodCall>>;

/// The call graph of a whole project, keyed by simple class name in
/// first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectCallGraph {
    classes: IndexMap<String, MethodEntry>,
}

impl ProjectCallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a class entry exists and return it.
    pub fn add_class(&mut self, class: &str) -> &mut MethodEntry {
        self.classes.entry(class.to_string()).or_default()
    }

    /// Start a fresh call list for `method`, replacing any earlier overload.
    pub fn add_method(&mut self, class: &str, method: &str) {
        self.add_class(class).insert(method.to_string(), Vec::new());
    }

    pub fn add_call(&mut self, class: &str, method: &str, call: MethodCall) {
        self.add_class(class)
            .entry(method.to_string())
            .or_default()
            .push(call);
    }

    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    pub fn methods(&self, class: &str) -> Option<&MethodEntry> {
        self.classes.get(class)
    }

    pub fn calls(&self, class: &str, method: &str) -> Option<&[MethodCall]> {
        self.classes
            .get(class)
            .and_then(|methods| methods.get(method))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MethodEntry)> {
        self.classes.iter()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &String> {
        self.classes.keys()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Every `(class, method, call)` triple in graph order.
    pub fn all_calls(&self) -> impl Iterator<Item = (&str, &str, &MethodCall)> {
        self.classes.iter().flat_map(|(class, methods)| {
            methods.iter().flat_map(move |(method, calls)| {
                calls
                    .iter()
                    .map(move |call| (class.as_str(), method.as_str(), call))
            })
        })
    }

    pub fn call_count(&self) -> usize {
        self.all_calls().count()
    }

    /// Whether the call lands on a method of this graph rather than outside it.
    pub fn is_project_method(&self, call: &MethodCall) -> bool {
        self.calls(&call.receiver_type, &call.callee_name).is_some()
    }

    /// Distinct call targets in first-seen order.
    pub fn call_targets(&self) -> IndexSet<&MethodCall> {
        self.all_calls().map(|(_, _, call)| call).collect()
    }

    /// Fold another graph into this one. Classes keep their first-seen
    /// position; a method present in both takes the incoming call list.
    pub fn merge(&mut self, other: ProjectCallGraph) {
        for (class, methods) in other.classes {
            let entry = self.classes.entry(class).or_default();
            for (method, calls) in methods {
                entry.insert(method, calls);
            }
        }
    }
}

/// Per-class method and attribute counts, built alongside the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerClassCounters {
    pub method_counts: IndexMap<String, usize>,
    pub attribute_counts: IndexMap<String, usize>,
}

impl PerClassCounters {
    /// Give `class` an entry in both maps, defaulting to zero.
    pub fn register(&mut self, class: &str) {
        self.method_counts.entry(class.to_string()).or_insert(0);
        self.attribute_counts.entry(class.to_string()).or_insert(0);
    }

    pub fn add_methods(&mut self, class: &str, count: usize) {
        *self.method_counts.entry(class.to_string()).or_insert(0) += count;
    }

    pub fn add_attributes(&mut self, class: &str, count: usize) {
        *self.attribute_counts.entry(class.to_string()).or_insert(0) += count;
    }

    pub fn merge(&mut self, other: PerClassCounters) {
        for (class, count) in other.method_counts {
            self.add_methods(&class, count);
        }
        for (class, count) in other.attribute_counts {
            self.add_attributes(&class, count);
        }
    }
}
