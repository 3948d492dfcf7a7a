//! Generation context - the input aggregate for one generation run

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::generation::GenerationError;
use crate::generation::utils::is_identifier;
use crate::infrastructure::openapi::ApiDocument;

/// Names the core stamps onto the generated package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Package name of the emitted client, e.g. `petstore`
    pub package_name: String,
    /// Proper-cased name of the top-level client type
    pub service_name: String,
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.package_name.is_empty() {
            return Err(GenerationError::ValidationError(
                "Package name is required".to_string(),
            ));
        }
        if !is_identifier(&self.package_name) {
            return Err(GenerationError::ValidationError(format!(
                "Package name '{}' is not a valid identifier",
                self.package_name
            )));
        }
        if !is_identifier(&self.service_name) {
            return Err(GenerationError::ValidationError(format!(
                "Service name '{}' is not a valid identifier",
                self.service_name
            )));
        }
        Ok(())
    }
}

/// Everything the orchestrator needs for one run
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub config: GenerationConfig,
    pub document: ApiDocument,
    /// Module path used in import statements and `go.mod`
    pub module_path: String,
    pub variables: HashMap<String, JsonValue>,
}

impl GenerationContext {
    pub fn new(config: GenerationConfig, document: ApiDocument, module_path: impl Into<String>) -> Self {
        Self {
            config,
            document,
            module_path: module_path.into(),
            variables: HashMap::new(),
        }
    }

    /// Add a variable passed through to the templates
    pub fn add_variable(&mut self, key: String, value: JsonValue) {
        self.variables.insert(key, value);
    }

    /// Validate the context has all required data
    pub fn validate(&self) -> Result<(), GenerationError> {
        self.config.validate()?;

        if self.module_path.trim().is_empty() {
            return Err(GenerationError::ValidationError(
                "Module path is required".to_string(),
            ));
        }

        Ok(())
    }
}

/// Render context used for template rendering
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub data: JsonValue,
    pub variables: HashMap<String, JsonValue>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            data: JsonValue::Object(serde_json::Map::new()),
            variables: HashMap::new(),
        }
    }

    /// Add a variable to the render context
    pub fn add_variable(&mut self, key: &str, value: JsonValue) {
        self.variables.insert(key.to_string(), value.clone());

        if let Some(obj) = self.data.as_object_mut() {
            obj.insert(key.to_string(), value);
        }
    }

    pub fn has_variable(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}
