//! API document model and loading

pub mod file_loader;
pub mod parser;
pub mod types;

pub use file_loader::FileSpecLoader;
pub use parser::OpenApiParser;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationError, SpecLoader};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[tokio::test]
    async fn test_file_loader_json() {
        let loader = FileSpecLoader::new();

        let mut temp_file = Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("Failed to create temp file");
        let spec_json = r#"{
            "openapi": "3.0.0",
            "info": {
                "title": "Test API",
                "version": "1.0.0"
            },
            "paths": {}
        }"#;
        temp_file
            .write_all(spec_json.as_bytes())
            .expect("Failed to write temp file");
        temp_file.flush().expect("Failed to flush temp file");

        let document = loader
            .load(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(document.openapi, "3.0.0");
        assert_eq!(document.info.title, "Test API");
        assert_eq!(document.info.version, "1.0.0");
    }

    #[tokio::test]
    async fn test_file_loader_yaml_without_extension() {
        let loader = FileSpecLoader::new();

        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let spec_yaml = r#"openapi: 3.0.0
info:
  title: Test API
  version: 1.0.0
paths:
  /pets:
    get:
      tags: [pets]
      responses:
        200:
          description: ok"#;
        temp_file
            .write_all(spec_yaml.as_bytes())
            .expect("Failed to write temp file");
        temp_file.flush().expect("Failed to flush temp file");

        let document = loader
            .load(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(document.info.title, "Test API");
        let operation = document.paths["/pets"].get.as_ref().unwrap();
        assert!(operation.responses.contains_key("200"));
    }

    #[tokio::test]
    async fn test_file_loader_not_found() {
        let loader = FileSpecLoader::new();

        let result = loader.load("/nonexistent/file.yaml").await;
        assert!(matches!(result, Err(GenerationError::LoadError(_))));
    }
}
