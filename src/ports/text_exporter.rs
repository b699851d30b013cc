//! Plain-text summary of a report.

use std::fmt::Write;

use crate::application::AnalysisReport;
use crate::ports::OutputExporter;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextExporter;

impl OutputExporter for TextExporter {
    fn render(&self, report: &AnalysisReport) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = Self::write_report(&mut out, report);
        out
    }
}

impl TextExporter {
    fn write_report(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
        let stats = &report.stats;
        writeln!(out, "== Project statistics ==")?;
        writeln!(out, "Units analyzed:           {}", stats.total_units)?;
        writeln!(out, "Units skipped:            {}", stats.skipped_units)?;
        writeln!(out, "Classes:                  {}", stats.total_classes)?;
        writeln!(out, "Interfaces:               {}", stats.total_interfaces)?;
        writeln!(out, "Methods:                  {}", stats.total_methods)?;
        writeln!(out, "Attributes:               {}", stats.total_attributes)?;
        writeln!(out, "Lines:                    {}", stats.total_lines)?;
        writeln!(out, "Packages:                 {}", stats.total_packages)?;
        writeln!(out, "Avg methods per class:    {:.2}", stats.avg_methods_per_class)?;
        writeln!(out, "Avg attributes per class: {:.2}", stats.avg_attributes_per_class)?;
        writeln!(out, "Avg lines per method:     {:.2}", stats.avg_lines_per_method)?;
        writeln!(out, "Max parameters:           {}", stats.max_parameters)?;
        writeln!(out)?;

        writeln!(out, "== Rankings ==")?;
        writeln!(out, "Top 10% by methods:       {}", report.top_by_methods.join(", "))?;
        writeln!(out, "Top 10% by attributes:    {}", report.top_by_attributes.join(", "))?;
        writeln!(out, "In both:                  {}", report.top_intersection.join(", "))?;
        writeln!(
            out,
            "More than {} methods:      {}",
            report.method_threshold,
            report.over_threshold.join(", ")
        )?;
        writeln!(out)?;

        writeln!(out, "== Call graph ==")?;
        for (class, methods) in report.call_graph.iter() {
            writeln!(out, "{class}")?;
            if methods.is_empty() {
                writeln!(out, "  (no methods)")?;
            }
            for (method, calls) in methods {
                writeln!(out, "  {method}")?;
                for call in calls {
                    writeln!(out, "    -> {} ({})", call.callee_name, call.receiver_type)?;
                }
            }
        }

        if report.coupling_enabled {
            writeln!(out)?;
            writeln!(out, "== Coupling ==")?;
            if report.coupling.is_empty() {
                writeln!(out, "No inter-class calls.")?;
            }
            for row in report.coupling.matrix() {
                writeln!(out, "{} -> {}: {:.4}", row.source, row.target, row.value)?;
            }
        }

        for skipped in &report.skipped_units {
            writeln!(out, "skipped {}: {}", skipped.unit, skipped.reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{analyze, AnalyzeOptions};
    use crate::domain::declarations::{
        CompilationUnit, Invocation, MethodDeclaration, ProjectDeclarations, TypeDeclaration,
    };

    #[test]
    fn test_summary_lists_graph_and_coupling() {
        let decls = ProjectDeclarations::from_units([CompilationUnit::new("Foo.java").with_type(
            TypeDeclaration::class("Foo")
                .with_method(MethodDeclaration::new("bar").calls(Invocation::new("baz"))),
        )]);
        let text = TextExporter.render(&analyze(&decls, &AnalyzeOptions::new(2)));

        assert!(text.contains("Classes:                  1"));
        assert!(text.contains("Top 10% by methods:       Foo"));
        assert!(text.contains("Avg attributes per class: 0.00"));
        assert!(text.contains("    -> baz (Foo)"));
        assert!(text.contains("No inter-class calls."));
    }
}
