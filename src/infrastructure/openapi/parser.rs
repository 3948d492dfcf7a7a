//! Turns raw JSON/YAML values into an [`ApiDocument`]
//!
//! The parser checks only what the generator cannot work without (a 3.x
//! version and the info block); everything else is left to deserialization.

use serde_json::Value as JsonValue;

use super::types::ApiDocument;
use crate::generation::GenerationError;

/// API document parser
pub struct OpenApiParser {
    /// The raw JSON value of the document
    pub json: JsonValue,
}

impl OpenApiParser {
    pub fn new(json: JsonValue) -> Self {
        Self { json }
    }

    /// Parse text that is either JSON or YAML
    ///
    /// `hint` is the file extension, if any. Without a recognised hint JSON is
    /// tried first, then YAML.
    pub fn from_str(content: &str, hint: Option<&str>) -> Result<Self, GenerationError> {
        let json = match hint {
            Some("json") => serde_json::from_str(content)?,
            Some("yaml" | "yml") => serde_yaml::from_str(content)
                .map_err(|e| GenerationError::LoadError(format!("Failed to parse YAML: {e}")))?,
            _ => serde_json::from_str(content)
                .or_else(|_| serde_yaml::from_str(content))
                .map_err(|e| {
                    GenerationError::LoadError(format!("Failed to parse API document: {e}"))
                })?,
        };
        Ok(Self::new(json))
    }

    pub fn version(&self) -> Option<&str> {
        self.json.get("openapi").and_then(JsonValue::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.json
            .get("info")
            .and_then(|info| info.get("title"))
            .and_then(JsonValue::as_str)
    }

    /// Parse the document into the domain model
    pub fn parse(self) -> Result<ApiDocument, GenerationError> {
        let version = self
            .version()
            .ok_or_else(|| GenerationError::ValidationError("Missing OpenAPI version".to_string()))?;
        if !version.starts_with("3.") {
            return Err(GenerationError::ValidationError(format!(
                "Unsupported OpenAPI version {version}, expected 3.x"
            )));
        }
        if self.title().is_none() {
            return Err(GenerationError::ValidationError(
                "Missing info.title".to_string(),
            ));
        }

        let mut json = self.json;
        normalize_info_version(&mut json)?;

        let document: ApiDocument = serde_json::from_value(json)
            .map_err(|e| GenerationError::LoadError(format!("Invalid API document: {e}")))?;

        tracing::debug!(
            title = %document.info.title,
            version = %document.info.version,
            paths = document.paths.len(),
            schemas = document.components.schemas.len(),
            "Parsed API document"
        );

        Ok(document)
    }
}

/// YAML reads `version: 1.0` as a number; keep it as written
fn normalize_info_version(json: &mut JsonValue) -> Result<(), GenerationError> {
    let version = json
        .get_mut("info")
        .and_then(|info| info.get_mut("version"))
        .ok_or_else(|| GenerationError::ValidationError("Missing info.version".to_string()))?;
    if let JsonValue::Number(number) = version {
        *version = JsonValue::String(number.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_document() {
        let content = r#"{
            "openapi": "3.0.3",
            "info": { "title": "Pets", "version": "1.0.0" },
            "paths": {
                "/pets": { "get": { "responses": { "200": { "description": "ok" } } } }
            }
        }"#;
        let document = OpenApiParser::from_str(content, Some("json"))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(document.info.title, "Pets");
        assert!(document.paths.contains_key("/pets"));
    }

    #[test]
    fn test_parse_yaml_without_hint() {
        let content = "openapi: 3.1.0\ninfo:\n  title: Pets\n  version: 1.0\npaths: {}\n";
        let document = OpenApiParser::from_str(content, None).unwrap().parse().unwrap();
        assert_eq!(document.openapi, "3.1.0");
        assert_eq!(document.info.version, "1.0");
    }

    #[test]
    fn test_rejects_swagger_and_missing_info() {
        let swagger = OpenApiParser::new(json!({
            "swagger": "2.0",
            "info": { "title": "Old", "version": "1" }
        }));
        assert!(matches!(
            swagger.parse(),
            Err(GenerationError::ValidationError(_))
        ));

        let untitled = OpenApiParser::new(json!({
            "openapi": "3.0.0",
            "info": { "version": "1" }
        }));
        assert!(untitled.parse().is_err());

        let unversioned = OpenApiParser::new(json!({
            "openapi": "3.0.0",
            "info": { "title": "Pets" }
        }));
        assert!(unversioned.parse().is_err());
    }

    #[test]
    fn test_invalid_text() {
        let result = OpenApiParser::from_str("{ not: [valid", None);
        assert!(matches!(result, Err(GenerationError::LoadError(_))));
    }
}
