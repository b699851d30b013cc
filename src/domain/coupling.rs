//! Directed inter-class coupling.
//!
//! `coupling(A, B)` is the share of all inter-class calls in the project that
//! go from A to B. The denominator needs every edge counted first, so the
//! graph is scanned twice and must be complete before either pass starts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::domain::callgraph::ProjectCallGraph;

/// Source class -> target class -> ratio. Absent pairs are zero.
pub type CouplingMap = IndexMap<String, IndexMap<String, f64>>;

/// Extensions stripped from a receiver label before comparing it to the caller.
pub const SOURCE_EXTENSIONS: &[&str] = &["java", "rs", "py", "kt", "scala", "cs", "go", "js", "ts"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CouplingReport {
    pub total_inter_class_calls: usize,
    pub map: CouplingMap,
}

/// One row of the flattened coupling matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingEntry {
    pub source: String,
    pub target: String,
    pub value: f64,
}

/// Lower-cased receiver label without a trailing source-file extension.
pub fn normalize_label(label: &str) -> String {
    let lower = label.to_lowercase();
    match lower.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && SOURCE_EXTENSIONS.contains(&ext) => {
            stem.to_string()
        }
        _ => lower,
    }
}

/// Whether a call recorded in `source` with `receiver_type` leaves the class.
pub fn is_inter_class(source: &str, receiver_type: &str) -> bool {
    normalize_label(receiver_type) != source.to_lowercase()
}

/// Compute the coupling map of a finished call graph.
pub fn analyze(graph: &ProjectCallGraph) -> CouplingReport {
    let span = info_span!("coupling", classes = graph.class_count());
    let _guard = span.enter();

    let total = graph
        .all_calls()
        .filter(|(class, _, call)| is_inter_class(class, &call.receiver_type))
        .count();

    if total == 0 {
        debug!("no inter-class calls observed");
        return CouplingReport::default();
    }

    let mut raw: IndexMap<String, IndexMap<String, usize>> = IndexMap::new();
    for (class, _, call) in graph.all_calls() {
        if is_inter_class(class, &call.receiver_type) {
            *raw.entry(class.to_string())
                .or_default()
                .entry(call.receiver_type.clone())
                .or_insert(0) += 1;
        }
    }

    let denominator = total as f64;
    let map: CouplingMap = raw
        .into_iter()
        .map(|(source, targets)| {
            let ratios = targets
                .into_iter()
                .map(|(target, count)| (target, count as f64 / denominator))
                .collect();
            (source, ratios)
        })
        .collect();

    debug!(total, pairs = map.values().map(IndexMap::len).sum::<usize>(), "coupling normalized");

    CouplingReport {
        total_inter_class_calls: total,
        map,
    }
}

impl CouplingReport {
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Coupling from `source` to `target`; 0.0 when no call was observed.
    pub fn between(&self, source: &str, target: &str) -> f64 {
        self.map
            .get(source)
            .and_then(|targets| targets.get(target))
            .copied()
            .unwrap_or(0.0)
    }

    /// Flat `{source, target, value}` rows in map order.
    pub fn matrix(&self) -> Vec<CouplingEntry> {
        self.map
            .iter()
            .flat_map(|(source, targets)| {
                targets.iter().map(move |(target, value)| CouplingEntry {
                    source: source.clone(),
                    target: target.clone(),
                    value: *value,
                })
            })
            .collect()
    }

    /// Mean coupling value over observed pairs.
    pub fn mean(&self) -> f64 {
        let rows = self.matrix();
        if rows.is_empty() {
            return 0.0;
        }
        rows.iter().map(|row| row.value).sum::<f64>() / rows.len() as f64
    }

    pub fn sum(&self) -> f64 {
        self.map.values().flat_map(|t| t.values()).sum()
    }
}
