//! Compile report persistence.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::trajectory::Simulation;

/// Metadata describing a stored report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Absolute path to the report on disk.
    pub path: PathBuf,
    /// Name of the compiled environment.
    pub instance: String,
    /// When the report was written.
    pub saved_at: DateTime<Utc>,
}

/// Serialized representation of one compile run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileReport {
    /// Name of the compiled environment.
    pub instance: String,
    /// When the report was written.
    pub saved_at: DateTime<Utc>,
    /// The compiled trajectory table.
    pub simulation: Simulation,
}

/// Reads and writes compile reports beneath a root directory.
pub struct ReportStore {
    root: PathBuf,
}

impl ReportStore {
    /// Create a store rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return all readable reports, most recent first.
    pub fn entries(&self) -> Result<Vec<ReportEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root).context("failed to read report directory")? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.path().extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            match read_report(&entry.path()) {
                Ok(report) => entries.push(ReportEntry {
                    path: entry.path(),
                    instance: report.instance,
                    saved_at: report.saved_at,
                }),
                Err(err) => {
                    warn!("Failed to read report {:?}: {err}", entry.path());
                }
            }
        }

        entries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(entries)
    }

    /// Persist `simulation` for `instance` and return the new entry.
    pub fn save(&self, instance: &str, simulation: &Simulation) -> Result<ReportEntry> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;

        let report = CompileReport {
            instance: instance.to_string(),
            saved_at: Utc::now(),
            simulation: simulation.clone(),
        };
        let file_name = format!(
            "{}_{}.json",
            sanitize_component(&report.instance),
            report.saved_at.format("%Y%m%d%H%M%S%3f")
        );
        let path = self.root.join(file_name);
        let serialised = serde_json::to_vec_pretty(&report)?;
        fs::write(&path, serialised)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(ReportEntry {
            path,
            instance: report.instance,
            saved_at: report.saved_at,
        })
    }

    /// Load the report behind `entry`.
    pub fn load(&self, entry: &ReportEntry) -> Result<CompileReport> {
        read_report(&entry.path)
    }

    /// Most recent report, if any.
    pub fn latest(&self) -> Result<Option<ReportEntry>> {
        Ok(self.entries()?.into_iter().next())
    }
}

fn read_report(path: &Path) -> Result<CompileReport> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn sanitize_component(input: &str) -> String {
    let result: String = input
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
        .collect();
    if result.is_empty() {
        "report".to_string()
    } else {
        result
    }
}
