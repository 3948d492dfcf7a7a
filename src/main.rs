//! sdkgen CLI entrypoint
//! Parses command-line arguments and dispatches to the generate use case.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use sdkgen::application::{GenerateSdkRequest, GenerateSdkUseCase};
use sdkgen::generation::GenerationOrchestrator;
use sdkgen::infrastructure::generation::{
    FormatterPostProcessor, GoContextBuilder, TeraTemplateRenderer,
};
use sdkgen::infrastructure::openapi::FileSpecLoader;
use sdkgen::infrastructure::output::FileSystemOutputService;
use sdkgen::infrastructure::shell::ProcessCommandExecutor;
use std::path::PathBuf;
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdkgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate a Go client package from an OpenAPI document
    Generate {
        /// Path to the OpenAPI document (YAML or JSON)
        spec: String,
        /// Output directory for generated code
        #[arg(long)]
        out: PathBuf,
        /// Module path written to go.mod when the output has none
        #[arg(long)]
        module: String,
        /// Package name of the generated code
        #[arg(long)]
        package: String,
        /// Name of the client; derived from the package when omitted
        #[arg(long)]
        name: Option<String>,
        /// Formatter run in the output directory after writing
        #[arg(long)]
        format_command: Option<String>,
        /// Do not run the formatter
        #[arg(long)]
        skip_format: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            spec,
            out,
            module,
            package,
            name,
            format_command,
            skip_format,
        } => {
            generate(GenerateSdkRequest {
                spec_path: spec,
                output_dir: out,
                module,
                package,
                name,
                format_command,
                skip_format,
            })
            .await?
        }
    }
    Ok(())
}

async fn generate(request: GenerateSdkRequest) -> anyhow::Result<()> {
    info!(spec = %request.spec_path, "Generating SDK");

    let renderer = TeraTemplateRenderer::new().context("Failed to load Go templates")?;
    let orchestrator =
        GenerationOrchestrator::new(Arc::new(GoContextBuilder::new()), Arc::new(renderer));
    let post_processor = FormatterPostProcessor::new(
        Arc::new(ProcessCommandExecutor::new()),
        request.effective_format_command(),
    );
    let use_case = GenerateSdkUseCase::new(
        Arc::new(FileSpecLoader::new()),
        Arc::new(orchestrator),
        Arc::new(FileSystemOutputService::new()),
        Arc::new(post_processor),
    );

    let spec_path = request.spec_path.clone();
    let response = use_case
        .execute(request)
        .await
        .with_context(|| format!("Failed to generate SDK from {}", spec_path))?;

    info!(
        files = response.artifacts_count,
        groupings = response.groupings.len(),
        diagnostics = response.diagnostics_count,
        output = %response.output_path.display(),
        "Generation finished"
    );
    Ok(())
}
