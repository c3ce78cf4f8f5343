// Artifact storage: finished reports land as files under one root directory.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use provcmp_recon::{ReconError, ReportArtifact};

/// Directory that receives report artifacts. Never overwrites an existing file.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write the artifact under its own file name and return the full path.
    pub fn save(&self, artifact: &ReportArtifact) -> Result<PathBuf, ReconError> {
        self.save_as(artifact, &artifact.file_name)
    }

    /// Write the artifact under `file_name` (a bare name, no directories).
    pub fn save_as(&self, artifact: &ReportArtifact, file_name: &str) -> Result<PathBuf, ReconError> {
        if file_name.is_empty() || file_name.contains(|c| c == '/' || c == '\\') || file_name == ".." {
            return Err(ReconError::Io(format!("invalid artifact file name '{}'", file_name)));
        }

        fs::create_dir_all(&self.root)
            .map_err(|e| ReconError::Io(format!("cannot create {}: {}", self.root.display(), e)))?;

        let path = self.root.join(file_name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| ReconError::Io(format!("cannot create {}: {}", path.display(), e)))?;
        file.write_all(&artifact.bytes)
            .and_then(|_| file.sync_all())
            .map_err(|e| ReconError::Io(format!("cannot write {}: {}", path.display(), e)))?;

        log::info!("saved {} ({} bytes)", path.display(), artifact.bytes.len());
        Ok(path)
    }
}
