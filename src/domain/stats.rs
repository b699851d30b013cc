//! Project-wide volume and density metrics.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::builder::BuildScope;
use crate::domain::classifier::top_ten_percent;
use crate::domain::declarations::ProjectDeclarations;

/// Package label for units that declare none.
pub const DEFAULT_PACKAGE: &str = "default";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total_units: usize,
    pub skipped_units: usize,
    pub total_classes: usize,
    pub total_interfaces: usize,
    pub total_methods: usize,
    pub total_attributes: usize,
    pub total_lines: usize,
    /// Distinct packages, parents included.
    pub total_packages: usize,
    pub avg_methods_per_class: f64,
    pub avg_attributes_per_class: f64,
    pub avg_lines_per_method: f64,
    pub max_parameters: usize,
    /// Per class, the top 10% of its methods by line count.
    pub longest_methods: IndexMap<String, Vec<String>>,
}

impl ProjectStats {
    pub fn collect(declarations: &ProjectDeclarations, scope: &BuildScope) -> Self {
        let mut stats = ProjectStats::default();
        let mut packages: HashSet<String> = HashSet::new();
        let mut method_lines: IndexMap<String, IndexMap<String, usize>> = IndexMap::new();
        let mut lines_in_methods = 0usize;
        // Repeated names are one class, as in the call graph; value is "is interface".
        let mut kinds: IndexMap<String, bool> = IndexMap::new();

        for unit in &declarations.units {
            let unit = match unit {
                Ok(unit) => unit,
                Err(_) => {
                    stats.skipped_units += 1;
                    continue;
                }
            };
            stats.total_units += 1;
            stats.total_lines += unit.line_count;
            add_package_with_parents(&mut packages, unit.package.as_deref());

            for decl in unit.types.iter().filter(|t| scope.includes(&t.name)) {
                *kinds.entry(decl.name.clone()).or_default() |= decl.is_interface;
                stats.total_attributes += decl.fields.len();

                let lines = method_lines.entry(decl.name.clone()).or_default();
                for method in &decl.methods {
                    stats.total_methods += 1;
                    lines_in_methods += method.line_count;
                    stats.max_parameters = stats.max_parameters.max(method.parameter_count);
                    lines.insert(method.name.clone(), method.line_count);
                }
            }
        }

        stats.total_interfaces = kinds.values().filter(|is_interface| **is_interface).count();
        stats.total_classes = kinds.len() - stats.total_interfaces;
        let total_types = kinds.len();
        stats.avg_methods_per_class = ratio(stats.total_methods, total_types);
        stats.avg_attributes_per_class = ratio(stats.total_attributes, total_types);
        stats.avg_lines_per_method = ratio(lines_in_methods, stats.total_methods);
        stats.total_packages = packages.len();
        stats.longest_methods = method_lines
            .into_iter()
            .map(|(class, lines)| (class, top_ten_percent(&lines)))
            .collect();

        stats
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// `a::b::c` (or `a.b.c`) contributes `a`, `a::b` and `a::b::c`.
fn add_package_with_parents(packages: &mut HashSet<String>, package: Option<&str>) {
    let Some(package) = package.map(str::trim).filter(|p| !p.is_empty()) else {
        packages.insert(DEFAULT_PACKAGE.to_string());
        return;
    };
    let normalized = package.replace("::", ".");
    let mut prefix = String::new();
    for segment in normalized.split('.').filter(|s| !s.is_empty()) {
        if !prefix.is_empty() {
            prefix.push_str("::");
        }
        prefix.push_str(segment);
        packages.insert(prefix.clone());
    }
}
