//! Port interfaces for the application layer

use async_trait::async_trait;
use std::path::Path;

/// Service for writing generated artifacts to the output destination
#[async_trait]
pub trait OutputService: Send + Sync {
    /// Write all artifacts below `output_dir`, returning how many were written
    async fn write_artifacts(
        &self,
        output_dir: &Path,
        artifacts: &[crate::generation::Artifact],
    ) -> Result<usize, crate::application::ApplicationError>;

    /// Ensure a directory exists
    async fn ensure_directory(
        &self,
        path: &Path,
    ) -> Result<(), crate::application::ApplicationError>;

    /// Write `content` to `path` unless the file already exists.
    /// Returns whether the file was written.
    async fn write_if_absent(
        &self,
        path: &Path,
        content: &str,
    ) -> Result<bool, crate::application::ApplicationError>;
}
