use anyhow::{Context, Result};
use cargo_metadata::MetadataCommand;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::domain::format::InputFormat;
use crate::error::Error;

/// Directory names never descended into.
pub const ALWAYS_EXCLUDED: &[&str] = &["target", ".git"];

/// One project file handed to a declaration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub crate_name: String,
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(
        crate_name: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            crate_name: crate_name.into(),
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn format(&self) -> Option<InputFormat> {
        InputFormat::from_path(Path::new(&self.path))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectLoader {
    exclude_dirs: Vec<String>,
}

impl ProjectLoader {
    pub fn new(exclude_dirs: Vec<String>) -> Self {
        Self { exclude_dirs }
    }

    /// Load all source files from a Cargo workspace manifest.
    pub fn load_workspace(&self, manifest_path: &str) -> Result<Vec<SourceFile>> {
        let metadata = MetadataCommand::new()
            .manifest_path(manifest_path)
            .no_deps()
            .exec()
            .map_err(|e| Error::Workspace(e.to_string()))
            .with_context(|| format!("Failed to read workspace {manifest_path}"))?;

        let mut files = Vec::new();

        for package_id in &metadata.workspace_members {
            let Some(package) = metadata.packages.iter().find(|p| &p.id == package_id) else {
                continue;
            };
            let crate_name = package.name.replace('-', "_");

            for target in &package.targets {
                // Only code that belongs to the crate itself; tests and benches are skipped.
                if !target.kind.iter().any(|k| k == "lib" || k == "bin" || k == "proc-macro") {
                    continue;
                }
                let src_path = &target.src_path;
                let src_dir = src_path.parent().unwrap_or(src_path);
                self.collect_recursive(src_dir.as_std_path(), &crate_name, &mut files)?;
            }
        }

        Ok(Self::finish(files))
    }

    /// Load every supported file under `dir`. The crate name is the folder name.
    pub fn load_folder(&self, dir: &Path) -> Result<Vec<SourceFile>> {
        if !dir.is_dir() {
            anyhow::bail!("{} is not a directory", dir.display());
        }
        let crate_name = crate_name_for(dir);
        let mut files = Vec::new();
        self.collect_recursive(dir, &crate_name, &mut files)?;
        Ok(Self::finish(files))
    }

    /// Load explicitly named files, in the order given.
    pub fn load_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<SourceFile>> {
        paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let crate_name = path
                    .parent()
                    .and_then(|p| p.parent().filter(|_| p.ends_with("src")).or(Some(p)))
                    .map(crate_name_for)
                    .unwrap_or_default();
                read_source(path, &crate_name)
            })
            .collect()
    }

    fn collect_recursive(&self, dir: &Path, crate_name: &str, out: &mut Vec<SourceFile>) -> Result<()> {
        if dir.is_file() {
            if InputFormat::from_path(dir).is_some() {
                out.push(read_source(dir, crate_name)?);
            }
            return Ok(());
        }
        if self.is_excluded(dir) || !dir.exists() {
            debug!(dir = %dir.display(), "skipping directory");
            return Ok(());
        }

        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                self.collect_recursive(&path, crate_name, out)?;
            } else if InputFormat::from_path(&path).is_some() {
                out.push(read_source(&path, crate_name)?);
            }
        }
        Ok(())
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        ALWAYS_EXCLUDED.contains(&name) || self.exclude_dirs.iter().any(|d| d == name)
    }

    // Sorted and deduplicated so that several targets sharing a directory load it once.
    fn finish(mut files: Vec<SourceFile>) -> Vec<SourceFile> {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);
        files
    }
}

// Only I/O failures are fatal; undecodable bytes are replaced and the file is still analyzed.
fn read_source(path: &Path, crate_name: &str) -> Result<SourceFile> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read file {}", path.display()))?;
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e.utf8_error(), "file is not valid UTF-8, reading lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(SourceFile::new(crate_name, path.display().to_string(), content))
}

fn crate_name_for(dir: &Path) -> String {
    dir.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.replace('-', "_"))
        .unwrap_or_default()
}
