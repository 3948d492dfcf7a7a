//! Generation infrastructure implementations

pub mod context_builders;
pub mod post_processor;
pub mod template_renderer;

pub use context_builders::GoContextBuilder;
pub use post_processor::{DEFAULT_FORMAT_COMMAND, FormatterPostProcessor};
pub use template_renderer::TeraTemplateRenderer;
