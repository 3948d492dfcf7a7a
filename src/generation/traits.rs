//! Port interfaces for the generation domain

use crate::generation::{ApiModel, Artifact, GenerationContext, GenerationError, RenderContext};
use crate::infrastructure::openapi::ApiDocument;
use async_trait::async_trait;
use std::path::Path;

/// Builds the target-language render context from the model
#[async_trait]
pub trait ContextBuilder: Send + Sync {
    async fn build(
        &self,
        model: &ApiModel,
        context: &GenerationContext,
    ) -> Result<RenderContext, GenerationError>;
}

/// Turns a render context into source files
///
/// Renderers never inspect the raw document; the model and the context
/// built from it carry everything they may emit.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        context: &RenderContext,
        model: &ApiModel,
    ) -> Result<Vec<Artifact>, GenerationError>;
}

/// Runs after artifacts have been written to `output_dir`
#[async_trait]
pub trait PostProcessor: Send + Sync {
    async fn process(
        &self,
        artifacts: Vec<Artifact>,
        output_dir: &Path,
    ) -> Result<Vec<Artifact>, GenerationError>;
}

/// Loads API documents
#[async_trait]
pub trait SpecLoader: Send + Sync {
    /// Load a document from a source, usually a file path
    async fn load(&self, source: &str) -> Result<ApiDocument, GenerationError>;
}
