//! File-based document loader
//!
//! This loader handles only file I/O. The actual parsing is done by the OpenApiParser.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use super::parser::OpenApiParser;
use super::types::ApiDocument;
use crate::generation::{GenerationError, SpecLoader};

/// Loads API documents from local files
pub struct FileSpecLoader;

impl FileSpecLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSpecLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpecLoader for FileSpecLoader {
    async fn load(&self, source: &str) -> Result<ApiDocument, GenerationError> {
        let content = fs::read_to_string(source).await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to read {source}: {e}"))
        })?;

        let extension = Path::new(source)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        tracing::debug!(source = %source, bytes = content.len(), "Loaded document");

        OpenApiParser::from_str(&content, extension.as_deref())?.parse()
    }
}
