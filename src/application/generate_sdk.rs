//! Use case for generating a client SDK

use std::sync::Arc;

use crate::application::{ApplicationError, GenerateSdkRequest, GenerateSdkResponse, OutputService};
use crate::generation::{GenerationContext, GenerationOrchestrator, PostProcessor, SpecLoader};

/// Use case for generating a client SDK from an API document
pub struct GenerateSdkUseCase {
    spec_loader: Arc<dyn SpecLoader>,
    generation_orchestrator: Arc<GenerationOrchestrator>,
    output_service: Arc<dyn OutputService>,
    post_processor: Arc<dyn PostProcessor>,
}

impl GenerateSdkUseCase {
    pub fn new(
        spec_loader: Arc<dyn SpecLoader>,
        generation_orchestrator: Arc<GenerationOrchestrator>,
        output_service: Arc<dyn OutputService>,
        post_processor: Arc<dyn PostProcessor>,
    ) -> Self {
        Self {
            spec_loader,
            generation_orchestrator,
            output_service,
            post_processor,
        }
    }

    pub async fn execute(
        &self,
        request: GenerateSdkRequest,
    ) -> Result<GenerateSdkResponse, ApplicationError> {
        // 1. Validate request
        request.validate()?;

        // 2. Load the API document
        let document = self.spec_loader.load(&request.spec_path).await?;
        tracing::info!(
            title = %document.info.title,
            version = %document.info.version,
            paths = document.paths.len(),
            "Loaded API document"
        );

        // 3. Ensure output directory exists
        self.output_service
            .ensure_directory(&request.output_dir)
            .await?;

        // 4. Bootstrap the module if the output is not one yet
        let module_created = self
            .output_service
            .write_if_absent(
                &request.output_dir.join("go.mod"),
                &go_mod(&request.module),
            )
            .await?;
        if module_created {
            tracing::info!(module = %request.module, "Created go.mod");
        }

        // 5. Generate code
        let context =
            GenerationContext::new(request.generation_config(), document, request.module.clone());
        let result = self.generation_orchestrator.generate(context).await?;

        // 6. Write artifacts
        let artifacts_count = self
            .output_service
            .write_artifacts(&request.output_dir, &result.artifacts)
            .await?;

        // 7. Post-process the written output
        self.post_processor
            .process(result.artifacts, &request.output_dir)
            .await?;

        if !result.diagnostics.is_empty() {
            tracing::warn!(
                count = result.diagnostics.len(),
                "Generation completed with diagnostics"
            );
        }
        tracing::info!(
            artifacts = artifacts_count,
            output_dir = %request.output_dir.display(),
            "SDK generated"
        );

        Ok(GenerateSdkResponse {
            artifacts_count,
            output_path: request.output_dir,
            groupings: result.model.grouping_names,
            diagnostics_count: result.diagnostics.len(),
            module_created,
        })
    }
}

fn go_mod(module: &str) -> String {
    format!("module {}\n\ngo 1.21\n", module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{Artifact, GenerationError};
    use crate::infrastructure::generation::{GoContextBuilder, TeraTemplateRenderer};
    use crate::infrastructure::openapi::ApiDocument;
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct MockSpecLoader;

    #[async_trait::async_trait]
    impl SpecLoader for MockSpecLoader {
        async fn load(&self, source: &str) -> Result<ApiDocument, GenerationError> {
            if source != "petstore.json" {
                return Err(GenerationError::LoadError(format!("{} not found", source)));
            }
            serde_json::from_value(json!({
                "openapi": "3.0.3",
                "info": {"title": "Petstore", "version": "1.0.0"},
                "paths": {
                    "/pets": {
                        "get": {
                            "operationId": "listPets",
                            "tags": ["pets"],
                            "responses": {"200": {"description": "ok"}}
                        }
                    }
                }
            }))
            .map_err(GenerationError::from)
        }
    }

    #[derive(Default)]
    struct MockOutputService {
        files: Mutex<HashMap<PathBuf, String>>,
    }

    #[async_trait::async_trait]
    impl OutputService for MockOutputService {
        async fn write_artifacts(
            &self,
            output_dir: &Path,
            artifacts: &[Artifact],
        ) -> Result<usize, ApplicationError> {
            let mut files = self.files.lock().unwrap();
            for artifact in artifacts {
                files.insert(output_dir.join(&artifact.path), artifact.content.clone());
            }
            Ok(artifacts.len())
        }

        async fn ensure_directory(&self, _path: &Path) -> Result<(), ApplicationError> {
            Ok(())
        }

        async fn write_if_absent(
            &self,
            path: &Path,
            content: &str,
        ) -> Result<bool, ApplicationError> {
            let mut files = self.files.lock().unwrap();
            if files.contains_key(path) {
                return Ok(false);
            }
            files.insert(path.to_path_buf(), content.to_string());
            Ok(true)
        }
    }

    #[derive(Default)]
    struct MockPostProcessor {
        processed: Mutex<Vec<PathBuf>>,
    }

    #[async_trait::async_trait]
    impl PostProcessor for MockPostProcessor {
        async fn process(
            &self,
            artifacts: Vec<Artifact>,
            output_dir: &Path,
        ) -> Result<Vec<Artifact>, GenerationError> {
            self.processed
                .lock()
                .unwrap()
                .extend(artifacts.iter().map(|a| output_dir.join(&a.path)));
            Ok(artifacts)
        }
    }

    fn use_case(
        output: Arc<MockOutputService>,
        post_processor: Arc<MockPostProcessor>,
    ) -> GenerateSdkUseCase {
        let orchestrator = GenerationOrchestrator::new(
            Arc::new(GoContextBuilder::new()),
            Arc::new(TeraTemplateRenderer::new().unwrap()),
        );
        GenerateSdkUseCase::new(
            Arc::new(MockSpecLoader),
            Arc::new(orchestrator),
            output,
            post_processor,
        )
    }

    fn request() -> GenerateSdkRequest {
        GenerateSdkRequest {
            spec_path: "petstore.json".to_string(),
            output_dir: PathBuf::from("/out"),
            module: "example.com/petstore".to_string(),
            package: "petstore".to_string(),
            name: None,
            format_command: None,
            skip_format: true,
        }
    }

    #[tokio::test]
    async fn test_execute_writes_module_and_sources() {
        let output = Arc::new(MockOutputService::default());
        let post_processor = Arc::new(MockPostProcessor::default());
        let use_case = use_case(output.clone(), post_processor.clone());

        let response = use_case.execute(request()).await.unwrap();

        assert_eq!(response.artifacts_count, 3);
        assert_eq!(response.groupings, vec!["Pets".to_string()]);
        assert_eq!(response.diagnostics_count, 0);
        assert!(response.module_created);

        let files = output.files.lock().unwrap();
        assert_eq!(
            files.get(Path::new("/out/go.mod")).map(String::as_str),
            Some("module example.com/petstore\n\ngo 1.21\n")
        );
        assert!(files.contains_key(Path::new("/out/client.go")));
        assert!(files.contains_key(Path::new("/out/types.go")));
        assert!(files.contains_key(Path::new("/out/pets_api.go")));
        assert_eq!(post_processor.processed.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_execute_keeps_existing_module() {
        let output = Arc::new(MockOutputService::default());
        output.files.lock().unwrap().insert(
            PathBuf::from("/out/go.mod"),
            "module example.com/custom\n".to_string(),
        );
        let use_case = use_case(output.clone(), Arc::new(MockPostProcessor::default()));

        let response = use_case.execute(request()).await.unwrap();

        assert!(!response.module_created);
        assert_eq!(
            output.files.lock().unwrap()[Path::new("/out/go.mod")],
            "module example.com/custom\n"
        );
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_request_before_loading() {
        let output = Arc::new(MockOutputService::default());
        let use_case = use_case(output.clone(), Arc::new(MockPostProcessor::default()));

        let mut invalid = request();
        invalid.package = "pet-store".to_string();

        let result = use_case.execute(invalid).await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
        assert!(output.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_reports_load_failure() {
        let output = Arc::new(MockOutputService::default());
        let use_case = use_case(output.clone(), Arc::new(MockPostProcessor::default()));

        let mut missing = request();
        missing.spec_path = "missing.json".to_string();

        let result = use_case.execute(missing).await;
        assert!(matches!(
            result,
            Err(ApplicationError::GenerationError(GenerationError::LoadError(_)))
        ));
        assert!(output.files.lock().unwrap().is_empty());
    }
}
