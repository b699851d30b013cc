use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "hotgraph.toml";

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "HOTGRAPH_CONFIG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Graphviz call graph
    Dot,
    /// Full analysis report
    #[default]
    Json,
    /// Call graph as JSON nodes and edges
    GraphJson,
    /// Coupling graph as JSON nodes and weighted edges
    CouplingJson,
    /// Human readable summary
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub coupling: bool,
    pub method_threshold: i64,
    /// Worker threads; unset means half the cores.
    pub jobs: Option<usize>,
    pub exclude_dirs: Vec<String>,
    pub format: OutputFormat,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            coupling: true,
            method_threshold: 2,
            jobs: None,
            exclude_dirs: Vec::new(),
            format: OutputFormat::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Explicit path, then `$HOTGRAPH_CONFIG`, then `./hotgraph.toml`, then defaults.
    pub fn resolve(cli_config: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = cli_config {
            return Self::load_from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from_file(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load_from_file(local);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert!(config.coupling);
        assert_eq!(config.method_threshold, 2);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            method_threshold = 5
            exclude_dirs = ["vendor"]
            format = "graph-json"
            "#,
        )
        .unwrap();
        assert!(config.coupling);
        assert_eq!(config.method_threshold, 5);
        assert_eq!(config.exclude_dirs, vec!["vendor"]);
        assert_eq!(config.format, OutputFormat::GraphJson);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let err = AnalysisConfig::from_toml_str("coupling = \"maybe\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "coupling = false\njobs = 3\n").unwrap();

        let config = AnalysisConfig::load_from_file(&path).unwrap();
        assert!(!config.coupling);
        assert_eq!(config.jobs, Some(3));

        let missing = AnalysisConfig::load_from_file(dir.path().join("none.toml"));
        assert!(matches!(missing, Err(Error::Io { .. })));
    }
}
