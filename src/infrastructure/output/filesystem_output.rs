//! Filesystem-based output service implementation

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::{ApplicationError, OutputService};
use crate::generation::Artifact;

/// Writes artifacts below an output directory, creating parents as needed
pub struct FileSystemOutputService;

impl FileSystemOutputService {
    pub fn new() -> Self {
        Self
    }
}

fn output_error(action: &str, path: &Path, e: std::io::Error) -> ApplicationError {
    ApplicationError::OutputError(format!("Failed to {} {}: {}", action, path.display(), e))
}

#[async_trait]
impl OutputService for FileSystemOutputService {
    async fn write_artifacts(
        &self,
        output_dir: &Path,
        artifacts: &[Artifact],
    ) -> Result<usize, ApplicationError> {
        for artifact in artifacts {
            if artifact.path.is_absolute() {
                return Err(ApplicationError::OutputError(format!(
                    "Artifact path {} must be relative to the output directory",
                    artifact.path.display()
                )));
            }
            let target = output_dir.join(&artifact.path);

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| output_error("create directory", parent, e))?;
            }

            let mut file = fs::File::create(&target)
                .await
                .map_err(|e| output_error("create file", &target, e))?;
            file.write_all(artifact.content.as_bytes())
                .await
                .map_err(|e| output_error("write file", &target, e))?;
            file.flush()
                .await
                .map_err(|e| output_error("flush file", &target, e))?;

            tracing::debug!(path = %target.display(), bytes = artifact.content.len(), "Wrote artifact");
        }

        Ok(artifacts.len())
    }

    async fn ensure_directory(&self, path: &Path) -> Result<(), ApplicationError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| output_error("create directory", path, e))
    }

    async fn write_if_absent(
        &self,
        path: &Path,
        content: &str,
    ) -> Result<bool, ApplicationError> {
        if fs::try_exists(path)
            .await
            .map_err(|e| output_error("inspect", path, e))?
        {
            return Ok(false);
        }
        fs::write(path, content)
            .await
            .map_err(|e| output_error("write file", path, e))?;
        Ok(true)
    }
}

impl Default for FileSystemOutputService {
    fn default() -> Self {
        Self::new()
    }
}
