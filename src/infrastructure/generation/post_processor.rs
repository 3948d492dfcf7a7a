//! Formatter post-processing

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::generation::{Artifact, GenerationError, PostProcessor};
use crate::infrastructure::shell::CommandExecutor;

/// Formatter run when none is configured
pub const DEFAULT_FORMAT_COMMAND: &str = "gofmt -w .";

/// Runs the source formatter over the written output
///
/// A failing or missing formatter is logged and otherwise ignored; the
/// unformatted output is still valid.
pub struct FormatterPostProcessor {
    executor: Arc<dyn CommandExecutor>,
    command: Option<String>,
}

impl FormatterPostProcessor {
    pub fn new(executor: Arc<dyn CommandExecutor>, command: Option<String>) -> Self {
        Self { executor, command }
    }
}

#[async_trait]
impl PostProcessor for FormatterPostProcessor {
    async fn process(
        &self,
        artifacts: Vec<Artifact>,
        output_dir: &Path,
    ) -> Result<Vec<Artifact>, GenerationError> {
        let Some(command) = self.command.as_deref().filter(|c| !c.trim().is_empty()) else {
            tracing::debug!("No formatter configured, skipping");
            return Ok(artifacts);
        };

        tracing::info!(
            command = %command,
            output_dir = %output_dir.display(),
            "Running formatter"
        );

        match self.executor.execute(command, output_dir).await {
            Ok(result) if result.is_success() => {
                tracing::debug!(command = %command, "Formatter completed successfully");
            }
            Ok(result) => {
                tracing::error!(
                    command = %command,
                    exit_code = result.exit_code,
                    stderr = %result.stderr.trim(),
                    "Formatter failed"
                );
            }
            Err(e) => {
                tracing::error!(
                    command = %command,
                    error = %e,
                    "Failed to execute formatter"
                );
            }
        }

        Ok(artifacts)
    }
}
