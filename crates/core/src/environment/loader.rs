use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::{
    error::EnvironmentError,
    parser::FactParser,
    validator::{EnvironmentValidator, Validated},
};

/// Default extension of fact files.
pub const DEFAULT_EXTENSION: &str = "lp";

/// Loads environments from fact text and discovers fact files on disk.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    root: PathBuf,
    extension: String,
}

impl EnvironmentLoader {
    /// Build a loader that discovers files with `extension` beneath `root`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Directory scanned by [`discover`](Self::discover).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parse and validate fact text.
    pub fn load_str(text: &str) -> Result<Validated, EnvironmentError> {
        let facts = FactParser::parse(text)?;
        let validated = EnvironmentValidator::validate(facts)?;
        info!(
            trains = validated.environment.trains.len(),
            width = validated.environment.grid.width(),
            height = validated.environment.grid.height(),
            warnings = validated.warnings.len(),
            "Environment loaded"
        );
        Ok(validated)
    }

    /// Read, parse and validate the fact file at `path`.
    ///
    /// Validation failures keep their [`EnvironmentError`] so callers can
    /// downcast for a kind-specific message.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Validated> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let validated = Self::load_str(&text)
            .with_context(|| format!("failed to load environment {}", path.display()))?;
        Ok(validated)
    }

    /// All fact files beneath the root, sorted by path.
    ///
    /// A root that is itself a file is returned as the only entry.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }
        if !self.root.is_dir() {
            anyhow::bail!("{} is neither a file nor a directory", self.root.display());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|ext| ext.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            files.push(entry.into_path());
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn discovers_fact_files_recursively() -> Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("set_b"))?;
        fs::write(root.join("b.lp"), "cell((0,0),0).")?;
        fs::write(root.join("set_b/a.lp"), "cell((0,0),0).")?;
        fs::write(root.join("notes.txt"), "not facts")?;

        let loader = EnvironmentLoader::new(root, DEFAULT_EXTENSION);
        let files = loader.discover()?;
        assert_eq!(files, vec![root.join("b.lp"), root.join("set_b/a.lp")]);

        let single = EnvironmentLoader::new(root.join("b.lp"), DEFAULT_EXTENSION);
        assert_eq!(single.discover()?, vec![root.join("b.lp")]);
        Ok(())
    }

    #[test]
    fn dead_end_track_fails_the_load() {
        let err = EnvironmentLoader::load_str(
            "cell((0,0),1025). cell((0,1),8192).\n\
             train(0). start(0,(0,0),0,e). end(0,(0,1),4).",
        )
        .unwrap_err();
        assert_eq!(
            err,
            EnvironmentError::DeadEndTrack {
                line: 1,
                at: crate::models::Coord::new(1, 0),
                track: 8192
            }
        );
    }

    #[test]
    fn load_path_keeps_the_error_kind() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("broken.lp");
        fs::write(&path, "cell((-1,0),1025).")?;

        let err = EnvironmentLoader::load_path(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EnvironmentError>(),
            Some(EnvironmentError::NegativeCoordinate { .. })
        ));
        Ok(())
    }
}
