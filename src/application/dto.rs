//! Data Transfer Objects for application layer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::ValidationError;
use crate::generation::GenerationConfig;
use crate::generation::utils::{is_identifier, to_proper_case};
use crate::infrastructure::generation::DEFAULT_FORMAT_COMMAND;

/// Request to generate a client SDK
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateSdkRequest {
    pub spec_path: String,
    pub output_dir: PathBuf,
    /// Module path written to `go.mod`, e.g. `example.com/petstore`
    pub module: String,
    pub package: String,
    /// Client name; derived from the package when absent
    pub name: Option<String>,
    pub format_command: Option<String>,
    #[serde(default)]
    pub skip_format: bool,
}

impl GenerateSdkRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.spec_path.trim().is_empty() {
            return Err(ValidationError::MissingField("spec path".to_string()));
        }
        if self.module.trim().is_empty() {
            return Err(ValidationError::MissingField("module".to_string()));
        }
        if self.package.is_empty() {
            return Err(ValidationError::EmptyPackageName);
        }
        if !is_identifier(&self.package) {
            return Err(ValidationError::InvalidPackageName(self.package.clone()));
        }
        if let Some(name) = &self.name {
            if !is_identifier(name) {
                return Err(ValidationError::InvalidClientName(name.clone()));
            }
        }
        Ok(())
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            package_name: self.package.clone(),
            service_name: self
                .name
                .clone()
                .unwrap_or_else(|| to_proper_case(&self.package)),
        }
    }

    /// Formatter to run after writing, `None` when formatting is off
    pub fn effective_format_command(&self) -> Option<String> {
        if self.skip_format {
            return None;
        }
        Some(
            self.format_command
                .clone()
                .unwrap_or_else(|| DEFAULT_FORMAT_COMMAND.to_string()),
        )
    }
}

/// Response from SDK generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerateSdkResponse {
    pub artifacts_count: usize,
    pub output_path: PathBuf,
    pub groupings: Vec<String>,
    pub diagnostics_count: usize,
    /// Whether `go.mod` was created by this run
    pub module_created: bool,
}
