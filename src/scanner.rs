// SPDX-License-Identifier: PMPL-1.0-or-later
//! Directory scanner for linting every stylesheet in a project.
//!
//! Walks directory trees, picks stylesheet files, and lints each one. A
//! file that fails to parse is recorded and the scan carries on.

use crate::config::{Config, LintConfig};
use crate::error::ParseError;
use crate::lint::{LintReport, Linter};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Result of linting one file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum FileOutcome {
    Linted(LintReport),
    Failed(ParseError),
}

/// A lint outcome tied to the file it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn report(&self) -> Option<&LintReport> {
        match &self.outcome {
            FileOutcome::Linted(report) => Some(report),
            FileOutcome::Failed(_) => None,
        }
    }

    /// Failed to parse, or has at least one rule below the threshold
    pub fn has_errors(&self) -> bool {
        match &self.outcome {
            FileOutcome::Linted(report) => !report.all_accessible,
            FileOutcome::Failed(_) => true,
        }
    }
}

/// Lint text that came from `path`
pub fn lint_source(path: &Path, content: &str, linter: &Linter) -> FileReport {
    let outcome = match linter.lint(content) {
        Ok(report) => FileOutcome::Linted(report),
        Err(err) => {
            info!("Could not parse {}: {}", path.display(), err);
            FileOutcome::Failed(err)
        }
    };
    FileReport { path: path.to_path_buf(), outcome }
}

/// Scan a directory for stylesheets and lint each of them
pub fn scan_directory(dir: &Path, config: &Config) -> anyhow::Result<Vec<FileReport>> {
    let linter = Linter::new(config.lint);
    let mut reports = Vec::new();

    info!("Scanning directory: {}", dir.display());

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Skip hidden and excluded directories
            let name = e.file_name().to_str().unwrap_or("");
            if e.file_type().is_dir() && e.depth() > 0 {
                return !config.exclude.iter().any(|x| x == name) && !name.starts_with('.');
            }
            true
        })
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !config.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)) {
            continue;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                info!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        reports.push(lint_source(path, &content, &linter));
    }

    let failing = reports.iter().filter(|r| r.has_errors()).count();
    info!("Scanned {} stylesheet(s), {} with problems", reports.len(), failing);

    Ok(reports)
}

/// Lint a single stylesheet file
pub fn scan_file(path: &Path, config: &LintConfig) -> anyhow::Result<FileReport> {
    let content = std::fs::read_to_string(path)?;
    Ok(lint_source(path, &content, &Linter::new(*config)))
}
