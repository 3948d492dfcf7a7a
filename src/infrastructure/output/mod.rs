//! Output service implementations

pub mod filesystem_output;

pub use filesystem_output::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ApplicationError, OutputService};
    use crate::generation::Artifact;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_filesystem_output_write_artifacts() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new();

        let artifacts = vec![
            Artifact {
                path: PathBuf::from("client.go"),
                content: "package petstore\n".to_string(),
            },
            Artifact {
                path: PathBuf::from("internal/pets_api.go"),
                content: "package internal\n".to_string(),
            },
        ];

        let written = output_service
            .write_artifacts(temp_dir.path(), &artifacts)
            .await
            .unwrap();
        assert_eq!(written, 2);

        let client = std::fs::read_to_string(temp_dir.path().join("client.go"))
            .expect("Failed to read client.go");
        assert_eq!(client, "package petstore\n");
        assert!(temp_dir.path().join("internal/pets_api.go").exists());
    }

    #[tokio::test]
    async fn test_filesystem_output_rejects_absolute_paths() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new();

        let artifact = Artifact {
            path: temp_dir.path().join("client.go"),
            content: String::new(),
        };

        let result = output_service
            .write_artifacts(temp_dir.path(), &[artifact])
            .await;
        assert!(matches!(result, Err(ApplicationError::OutputError(_))));
    }

    #[tokio::test]
    async fn test_filesystem_output_ensure_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new();

        let nested_path = temp_dir.path().join("deeply/nested/directory");

        let result = output_service.ensure_directory(&nested_path).await;
        assert!(result.is_ok());
        assert!(nested_path.is_dir());
    }

    #[tokio::test]
    async fn test_filesystem_output_write_if_absent_keeps_existing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new();
        let go_mod = temp_dir.path().join("go.mod");

        assert!(
            output_service
                .write_if_absent(&go_mod, "module first\n")
                .await
                .unwrap()
        );
        assert!(
            !output_service
                .write_if_absent(&go_mod, "module second\n")
                .await
                .unwrap()
        );
        assert_eq!(std::fs::read_to_string(&go_mod).unwrap(), "module first\n");
    }
}
