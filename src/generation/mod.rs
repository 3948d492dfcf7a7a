//! Generation domain module - turns an API document into a client model
//!
//! Schema resolution, composition handling and operation mapping all run in
//! one synchronous pass ([`ModelBuilder`]). The async [`GenerationOrchestrator`]
//! wraps that pass with the context-building and rendering ports.

pub mod builder;
pub mod composition;
pub mod context;
pub mod diagnostics;
pub mod errors;
pub mod operations;
pub mod orchestrator;
pub mod query;
pub mod registry;
pub mod resolver;
pub mod sanitizers;
pub mod traits;
pub mod type_mapper;
pub mod types;
pub mod utils;

pub use builder::*;
pub use context::*;
pub use diagnostics::*;
pub use errors::*;
pub use orchestrator::*;
pub use traits::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::openapi::ApiDocument;
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Arc;

    struct MockContextBuilder;

    #[async_trait]
    impl ContextBuilder for MockContextBuilder {
        async fn build(
            &self,
            model: &ApiModel,
            context: &GenerationContext,
        ) -> Result<RenderContext, GenerationError> {
            let mut render_context = RenderContext::new();
            render_context.add_variable("package", json!(model.package));
            render_context.add_variable("module", json!(context.module_path));
            Ok(render_context)
        }
    }

    struct MockRenderer;

    #[async_trait]
    impl Renderer for MockRenderer {
        async fn render(
            &self,
            context: &RenderContext,
            model: &ApiModel,
        ) -> Result<Vec<Artifact>, GenerationError> {
            Ok(model
                .grouping_names
                .iter()
                .map(|name| Artifact {
                    path: PathBuf::from(format!("{}.go", utils::to_snake_case(name))),
                    content: format!("package {}", context.data["package"].as_str().unwrap_or("")),
                })
                .collect())
        }
    }

    fn context() -> GenerationContext {
        let document: ApiDocument = serde_json::from_value(json!({
            "openapi": "3.0.3",
            "info": { "title": "Pets", "version": "1.0.0" },
            "paths": {
                "/pets": {
                    "get": {
                        "operationId": "listPets",
                        "tags": ["pets"],
                        "responses": { "200": { "description": "ok" } }
                    }
                },
                "/stores": {
                    "get": {
                        "operationId": "listStores",
                        "tags": ["store"],
                        "responses": { "200": { "description": "ok" } }
                    }
                }
            }
        }))
        .unwrap();
        GenerationContext::new(
            GenerationConfig {
                package_name: "petstore".to_string(),
                service_name: "Petstore".to_string(),
            },
            document,
            "example.com/petstore",
        )
    }

    #[test]
    fn test_generation_context_add_variable() {
        let mut context = context();
        context.add_variable("user_agent".to_string(), json!("petstore-go"));
        assert_eq!(context.variables["user_agent"], "petstore-go");
    }

    #[test]
    fn test_generation_context_validation() {
        assert!(context().validate().is_ok());

        let mut bad_package = context();
        bad_package.config.package_name = "pet-store".to_string();
        assert!(matches!(
            bad_package.validate(),
            Err(GenerationError::ValidationError(_))
        ));

        let mut no_module = context();
        no_module.module_path = " ".to_string();
        assert!(no_module.validate().is_err());
    }

    #[test]
    fn test_render_context_variables() {
        let mut render_context = RenderContext::default();
        render_context.add_variable("package", json!("petstore"));
        assert!(render_context.has_variable("package"));
        assert_eq!(render_context.data["package"], "petstore");
    }

    #[tokio::test]
    async fn test_orchestrator_renders_every_grouping() {
        let orchestrator =
            GenerationOrchestrator::new(Arc::new(MockContextBuilder), Arc::new(MockRenderer));

        let result = orchestrator.generate(context()).await.unwrap();

        let paths: Vec<_> = result.artifacts.iter().map(|a| a.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("pets.go"), PathBuf::from("store.go")]);
        assert!(result.artifacts.iter().all(|a| a.content == "package petstore"));
        assert_eq!(result.model.grouping_names, vec!["Pets", "Store"]);
        assert!(result.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_orchestrator_rejects_invalid_context() {
        let orchestrator =
            GenerationOrchestrator::new(Arc::new(MockContextBuilder), Arc::new(MockRenderer));
        let mut context = context();
        context.config.package_name.clear();

        let result = orchestrator.generate(context).await;
        assert!(matches!(result, Err(GenerationError::ValidationError(_))));
    }
}
