//! Artifact persistence
//!
//! Each script is written by its own task. File names are unique within a
//! batch, so the writes never contend for a path.

use crate::render::LaunchArtifact;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;

/// Mode of generated scripts on Unix
#[cfg(unix)]
const SCRIPT_MODE: u32 = 0o755;

/// Writes launch scripts into an output directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if needed
    pub async fn prepare(&self) -> Result<(), WriteError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| WriteError::Io {
                path: self.output_dir.clone(),
                source: e,
            })
    }

    /// Write a single artifact, replacing any existing file
    pub async fn write(&self, artifact: &LaunchArtifact) -> Result<PathBuf, WriteError> {
        write_script(self.output_dir.join(&artifact.file_name), artifact.content.clone()).await
    }

    /// Write all artifacts concurrently.
    ///
    /// Returns one outcome per artifact, in input order; a failed write does
    /// not stop the others.
    pub async fn write_all(&self, artifacts: &[LaunchArtifact]) -> Vec<Result<PathBuf, WriteError>> {
        let paths: Vec<PathBuf> = artifacts
            .iter()
            .map(|artifact| self.output_dir.join(&artifact.file_name))
            .collect();

        let mut tasks = JoinSet::new();
        for (index, (path, artifact)) in paths.iter().zip(artifacts).enumerate() {
            let path = path.clone();
            let content = artifact.content.clone();
            tasks.spawn(async move { (index, write_script(path, content).await) });
        }

        let mut outcomes: Vec<Option<Result<PathBuf, WriteError>>> =
            std::iter::repeat_with(|| None).take(artifacts.len()).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => log::error!("Write task failed: {}", e),
            }
        }

        // A slot left empty belongs to a task that panicked or was cancelled
        outcomes
            .into_iter()
            .zip(paths)
            .map(|(outcome, path)| {
                outcome.unwrap_or_else(|| {
                    Err(WriteError::Task {
                        path,
                        message: "task did not complete".to_string(),
                    })
                })
            })
            .collect()
    }
}

async fn write_script(path: PathBuf, content: String) -> Result<PathBuf, WriteError> {
    let io_error = |e| WriteError::Io {
        path: path.clone(),
        source: e,
    };

    tokio::fs::write(&path, content).await.map_err(io_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(SCRIPT_MODE);
        tokio::fs::set_permissions(&path, permissions)
            .await
            .map_err(io_error)?;
    }

    log::debug!("Wrote {}", path.display());
    Ok(path)
}

/// Errors that can occur when persisting scripts
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Write task for '{}' failed: {message}", path.display())]
    Task { path: PathBuf, message: String },
}
