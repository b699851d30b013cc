use crate::application::AnalysisReport;
use crate::domain::declarations::ProjectDeclarations;
use crate::infrastructure::config::OutputFormat;
use crate::infrastructure::project_loader::SourceFile;

pub mod dot_exporter;
pub mod json_exporter;
pub mod text_exporter;

/// Turns project files into the declaration stream.
pub trait DeclarationSource {
    fn declarations(&self, sources: &[SourceFile]) -> ProjectDeclarations;
}

pub trait OutputExporter {
    fn render(&self, report: &AnalysisReport) -> String;

    fn export(&self, report: &AnalysisReport, path: &str) -> std::io::Result<()> {
        std::fs::write(path, self.render(report))
    }
}

pub fn exporter_for(format: OutputFormat) -> Box<dyn OutputExporter> {
    match format {
        OutputFormat::Dot => Box::new(dot_exporter::DotExporter),
        OutputFormat::Json => Box::new(json_exporter::ReportJsonExporter),
        OutputFormat::GraphJson => Box::new(json_exporter::GraphJsonExporter),
        OutputFormat::CouplingJson => Box::new(json_exporter::CouplingJsonExporter),
        OutputFormat::Text => Box::new(text_exporter::TextExporter),
    }
}
