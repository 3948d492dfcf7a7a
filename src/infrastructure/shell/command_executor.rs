//! Runs external tools (the source formatter) in the output directory

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::generation::GenerationError;

/// Executes a command line in a working directory
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        command_line: &str,
        working_dir: &Path,
    ) -> Result<CommandResult, GenerationError>;
}

/// Result of command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Splits the command line on whitespace and spawns the program directly,
/// without a shell
pub struct ProcessCommandExecutor;

impl ProcessCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProcessCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn execute(
        &self,
        command_line: &str,
        working_dir: &Path,
    ) -> Result<CommandResult, GenerationError> {
        let mut words = command_line.split_whitespace();
        let program = words.next().ok_or_else(|| {
            GenerationError::PostProcessingError("Empty command line".to_string())
        })?;

        let output = Command::new(program)
            .args(words)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                GenerationError::PostProcessingError(format!(
                    "Failed to execute command '{command_line}': {e}"
                ))
            })?;

        Ok(CommandResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Canned results keyed by command line, for tests
#[cfg(test)]
#[derive(Default)]
pub struct MockCommandExecutor {
    pub results: std::collections::HashMap<String, CommandResult>,
    pub calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, command_line: &str, exit_code: i32, stderr: &str) -> Self {
        self.results.insert(
            command_line.to_string(),
            CommandResult {
                exit_code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
        self
    }
}

#[cfg(test)]
#[async_trait]
impl CommandExecutor for MockCommandExecutor {
    async fn execute(
        &self,
        command_line: &str,
        _working_dir: &Path,
    ) -> Result<CommandResult, GenerationError> {
        self.calls.lock().unwrap().push(command_line.to_string());
        self.results.get(command_line).cloned().ok_or_else(|| {
            GenerationError::PostProcessingError(format!(
                "Mock executor has no result for command: {command_line}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_process_executor_success() {
        let executor = ProcessCommandExecutor::new();
        let dir = tempdir().unwrap();

        let result = executor.execute("echo hello", dir.path()).await.unwrap();

        assert!(result.is_success());
        assert!(result.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_process_executor_failure() {
        let executor = ProcessCommandExecutor::new();
        let dir = tempdir().unwrap();

        let result = executor.execute("false", dir.path()).await.unwrap();
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_missing_program_and_empty_line() {
        let executor = ProcessCommandExecutor::new();
        let dir = tempdir().unwrap();

        let missing = executor
            .execute("definitely-not-a-formatter --write", dir.path())
            .await;
        assert!(matches!(missing, Err(GenerationError::PostProcessingError(_))));

        let empty = executor.execute("   ", dir.path()).await;
        assert!(empty.is_err());
    }
}
