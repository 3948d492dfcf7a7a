//! Tera-based renderer for the Go client package

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use tera::{Context, Tera};

use crate::generation::{ApiModel, Artifact, GenerationError, RenderContext, Renderer};

const CLIENT_TEMPLATE: &str = "client.go.tera";
const TYPES_TEMPLATE: &str = "types.go.tera";
const GROUPING_TEMPLATE: &str = "grouping.go.tera";
const DECLARATIONS_TEMPLATE: &str = "declarations.go.tera";

/// Renders `client.go`, `types.go` and one file per grouping
pub struct TeraTemplateRenderer {
    tera: Tera,
}

impl TeraTemplateRenderer {
    /// Load the built-in Go templates
    pub fn new() -> Result<Self, GenerationError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (
                DECLARATIONS_TEMPLATE,
                include_str!("../../../templates/go/declarations.go.tera"),
            ),
            (CLIENT_TEMPLATE, include_str!("../../../templates/go/client.go.tera")),
            (TYPES_TEMPLATE, include_str!("../../../templates/go/types.go.tera")),
            (
                GROUPING_TEMPLATE,
                include_str!("../../../templates/go/grouping.go.tera"),
            ),
        ])
        .map_err(|e| GenerationError::RenderError(format!("Failed to add templates: {e}")))?;
        Ok(Self { tera })
    }

    fn render_file(
        &self,
        template_name: &str,
        base: &Context,
        file: Option<&JsonValue>,
        path: &str,
    ) -> Result<Artifact, GenerationError> {
        let mut context = base.clone();
        if let Some(file) = file {
            context.insert("file", file);
        }

        let content = self.tera.render(template_name, &context).map_err(|e| {
            GenerationError::RenderError(format!("Failed to render {path}: {e:?}"))
        })?;

        Ok(Artifact {
            path: PathBuf::from(path),
            content,
        })
    }
}

#[async_trait]
impl Renderer for TeraTemplateRenderer {
    async fn render(
        &self,
        context: &RenderContext,
        model: &ApiModel,
    ) -> Result<Vec<Artifact>, GenerationError> {
        let base = Context::from_value(context.data.clone())
            .map_err(|e| GenerationError::RenderError(format!("Invalid render context: {e}")))?;

        let mut artifacts = Vec::with_capacity(model.groupings.len() + 2);
        artifacts.push(self.render_file(CLIENT_TEMPLATE, &base, None, "client.go")?);
        artifacts.push(self.render_file(
            TYPES_TEMPLATE,
            &base,
            context.data.get("shared"),
            "types.go",
        )?);

        let files = context
            .data
            .get("groupings")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| {
                GenerationError::RenderError("Render context has no groupings".to_string())
            })?;
        for file in files {
            let path = file
                .get("file_name")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| {
                    GenerationError::RenderError("Grouping file has no name".to_string())
                })?;
            artifacts.push(self.render_file(GROUPING_TEMPLATE, &base, Some(file), path)?);
        }

        tracing::debug!(
            artifacts = artifacts.len(),
            groupings = model.grouping_names.len(),
            "Rendered Go package"
        );

        Ok(artifacts)
    }
}
