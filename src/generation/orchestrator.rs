//! Generation orchestration - coordinates the generation workflow

use crate::generation::{
    ContextBuilder, GenerationContext, GenerationError, GenerationResult, ModelBuilder, Renderer,
};
use std::sync::Arc;

/// Orchestrates model building, context building and rendering
pub struct GenerationOrchestrator {
    context_builder: Arc<dyn ContextBuilder>,
    renderer: Arc<dyn Renderer>,
}

impl GenerationOrchestrator {
    pub fn new(context_builder: Arc<dyn ContextBuilder>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            context_builder,
            renderer,
        }
    }

    /// Execute the generation workflow
    pub async fn generate(
        &self,
        context: GenerationContext,
    ) -> Result<GenerationResult, GenerationError> {
        // 1. Validate context
        context.validate()?;

        tracing::debug!(
            package = %context.config.package_name,
            paths = context.document.paths.len(),
            schemas = context.document.components.schemas.len(),
            "Orchestrator starting generation"
        );

        // 2. Build the model; this is the only pass over the document
        let output = ModelBuilder::new(&context.document, &context.config).build()?;

        // 3. Build render context from the model
        let render_context = self.context_builder.build(&output.model, &context).await?;

        // 4. Render
        let artifacts = self.renderer.render(&render_context, &output.model).await?;

        tracing::debug!(
            artifacts = artifacts.len(),
            diagnostics = output.diagnostics.len(),
            "Orchestrator finished generation"
        );

        // 5. Return result
        Ok(GenerationResult {
            artifacts,
            model: output.model,
            diagnostics: output.diagnostics,
        })
    }
}
