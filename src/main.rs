// Command-line entry point for hotgraph.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hotgraph::api::server;
use hotgraph::application::{AnalyzeOptions, AnalyzeUsecase};
use hotgraph::domain::builder::BuildScope;
use hotgraph::error::Error;
use hotgraph::infrastructure::concurrency::init_thread_pool;
use hotgraph::infrastructure::config::{AnalysisConfig, OutputFormat};
use hotgraph::infrastructure::project_loader::{ProjectLoader, SourceFile};
use hotgraph::infrastructure::ProjectSource;
use hotgraph::ports::exporter_for;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input source file path (can specify multiple)
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Input source folder(s)
    #[arg(short = 'd', long)]
    folder: Vec<PathBuf>,

    /// Workspace Cargo.toml
    #[arg(long)]
    workspace: Option<String>,

    /// JSON declaration dump(s) written by an external parser
    #[arg(long)]
    declarations: Vec<PathBuf>,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Only analyze the class with this name
    #[arg(long)]
    class: Option<String>,

    /// Report classes with strictly more methods than this
    #[arg(short, long, allow_negative_numbers = true)]
    threshold: Option<i64>,

    /// Skip the coupling analysis
    #[arg(long)]
    no_coupling: bool,

    /// Config file (default: ./hotgraph.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads (default: half the cores)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Serve the JSON command protocol on this port instead of analyzing once
    #[arg(long)]
    serve: Option<u16>,
}

impl Cli {
    /// File values first, flags on top.
    fn merge_into(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(threshold) = self.threshold {
            config.method_threshold = threshold;
        }
        if self.no_coupling {
            config.coupling = false;
        }
        if self.jobs.is_some() {
            config.jobs = self.jobs;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        config
    }

    fn has_input(&self) -> bool {
        !self.input.is_empty()
            || !self.folder.is_empty()
            || self.workspace.is_some()
            || !self.declarations.is_empty()
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn collect_sources(cli: &Cli, loader: &ProjectLoader) -> Result<Vec<SourceFile>> {
    let mut sources = loader.load_files(&cli.input)?;

    for folder in &cli.folder {
        sources.extend(loader.load_folder(folder)?);
    }

    if let Some(cargo_toml) = &cli.workspace {
        let ws_sources = loader.load_workspace(cargo_toml)?;
        info!(files = ws_sources.len(), "workspace collected");
        sources.extend(ws_sources);
    }

    sources.extend(loader.load_files(&cli.declarations)?);

    for source in sources.iter().filter(|s| s.format().is_none()) {
        warn!(file = %source.path, "unsupported file type, ignored");
    }
    Ok(sources)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.merge_into(AnalysisConfig::resolve(cli.config.clone())?);
    init_thread_pool(config.jobs)?;

    if let Some(port) = cli.serve {
        return server::start_server(port, config);
    }

    if !cli.has_input() {
        return Err(Error::NoInput.into());
    }

    let loader = ProjectLoader::new(config.exclude_dirs.clone());
    let sources = collect_sources(&cli, &loader)?;

    let mut options = AnalyzeOptions::from(&config);
    if let Some(class) = &cli.class {
        options = options.with_scope(BuildScope::Class(class.clone()));
    }

    let exporter = exporter_for(config.format);
    let usecase = AnalyzeUsecase {
        source: &ProjectSource,
        exporter: exporter.as_ref(),
    };

    match &cli.output {
        Some(output) => {
            let report = usecase.run(&sources, &options, output)?;
            info!(
                output = %Path::new(output).display(),
                classes = report.call_graph.class_count(),
                "analysis written"
            );
        }
        None => {
            let report = usecase.analyze(&sources, &options);
            println!("{}", exporter.render(&report));
        }
    }

    Ok(())
}
