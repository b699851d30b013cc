use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::thread;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::application::{analyze, AnalyzeOptions};
use crate::domain::builder::BuildScope;
use crate::domain::coupling;
use crate::domain::declarations::ProjectDeclarations;
use crate::infrastructure::config::AnalysisConfig;
use crate::infrastructure::project_loader::ProjectLoader;
use crate::infrastructure::ProjectSource;
use crate::ports::DeclarationSource;

#[derive(Debug, Deserialize)]
struct CommandReq {
    command: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    path: String,
    threshold: Option<i64>,
    coupling: Option<bool>,
    class: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CouplingParams {
    path: String,
    source: String,
    target: String,
}

/// Serve line-delimited JSON commands on `127.0.0.1:port`, one thread per
/// connection. Requests are analyzed with `config` as the base settings.
pub fn start_server(port: u16, config: AnalysisConfig) -> Result<()> {
    let address = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("Failed to bind to {}", address))?;

    info!(%address, "API server listening");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let config = config.clone();
                thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, &config) {
                        warn!(error = %e, "connection error");
                    }
                });
            }
            Err(e) => error!(error = %e, "accept error"),
        }
    }

    Ok(())
}

fn handle_connection(mut stream: TcpStream, config: &AnalysisConfig) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break; // Connection closed
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request = serde_json::from_str::<CommandReq>(trimmed).context("Invalid JSON format");
        let shutdown = matches!(&request, Ok(req) if req.command == "SHUTDOWN");

        let response = match request.and_then(|req| process_command(req, config)) {
            Ok(data) => json!({
                "status": "success",
                "data": data
            }),
            Err(e) => json!({
                "status": "error",
                "message": format!("{:#}", e)
            }),
        };

        let response_str = serde_json::to_string(&response)?;
        stream.write_all(response_str.as_bytes())?;
        stream.write_all(b"\n")?;

        if shutdown {
            info!("shutdown requested");
            std::process::exit(0);
        }
    }
    Ok(())
}

fn process_command(req: CommandReq, config: &AnalysisConfig) -> Result<serde_json::Value> {
    match req.command.as_str() {
        "PING" => Ok(json!("PONG")),
        "ANALYZE" => handle_analyze(params(req.params, "ANALYZE")?, config),
        "COUPLING" => handle_coupling(params(req.params, "COUPLING")?, config),
        "SHUTDOWN" => Ok(json!("Shutting down...")),
        _ => anyhow::bail!("Unknown command: {}", req.command),
    }
}

fn params<T: for<'de> Deserialize<'de>>(params: Option<serde_json::Value>, command: &str) -> Result<T> {
    let params = params.ok_or_else(|| anyhow::anyhow!("Missing params for {}", command))?;
    serde_json::from_value(params).with_context(|| format!("Invalid params for {}", command))
}

fn load_declarations(path: &str, config: &AnalysisConfig) -> Result<ProjectDeclarations> {
    let path = Path::new(path);
    if !path.exists() {
        anyhow::bail!("Project path not found: {}", path.display());
    }

    let loader = ProjectLoader::new(config.exclude_dirs.clone());
    let sources = if path.is_dir() {
        loader.load_folder(path)?
    } else if path.file_name().is_some_and(|name| name == "Cargo.toml") {
        loader.load_workspace(&path.display().to_string())?
    } else {
        loader.load_files(&[path])?
    };

    info!(path = %path.display(), files = sources.len(), "analyzing");
    Ok(ProjectSource.declarations(&sources))
}

fn handle_analyze(params: AnalyzeParams, config: &AnalysisConfig) -> Result<serde_json::Value> {
    let declarations = load_declarations(&params.path, config)?;

    let mut options = AnalyzeOptions::from(config);
    if let Some(threshold) = params.threshold {
        options.method_threshold = threshold;
    }
    if let Some(enabled) = params.coupling {
        options.coupling_enabled = enabled;
    }
    if let Some(class) = params.class {
        options.scope = BuildScope::Class(class);
    }

    let report = analyze(&declarations, &options);
    Ok(serde_json::to_value(report)?)
}

fn handle_coupling(params: CouplingParams, config: &AnalysisConfig) -> Result<serde_json::Value> {
    let declarations = load_declarations(&params.path, config)?;
    let options = AnalyzeOptions::from(config).with_coupling(true);
    let report = analyze(&declarations, &options);

    Ok(json!({
        "source_to_target": report.coupling.between(&params.source, &params.target),
        "target_to_source": report.coupling.between(&params.target, &params.source),
        "total_inter_class_calls": report.coupling.total_inter_class_calls,
    }))
}
