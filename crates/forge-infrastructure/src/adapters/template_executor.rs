//! Reference `TemplateExecutor` adapter: no external scaffolding
//! service is wired into this workspace, so `LocalTemplateExecutor`
//! stands in for one, building a handful of project skeletons from
//! plain string templates and writing them under `target_dir`.

use async_trait::async_trait;
use forge_domain::entities::ScaffoldedFile;
use forge_domain::error::{Error, Result};
use forge_domain::ports::TemplateExecutor;
use tokio_util::sync::CancellationToken;

/// Returns the skeleton's `(path, content)` pairs for a known
/// `project_type`; unrecognized types fall back to `"generic"`.
fn template_files(project_type: &str) -> Vec<(&'static str, String)> {
    match project_type {
        "blazor" => vec![
            ("Program.cs", "var builder = WebApplication.CreateBuilder(args);\nvar app = builder.Build();\napp.Run();\n".to_owned()),
            ("App.razor", "<Router AppAssembly=\"@typeof(App).Assembly\" />\n".to_owned()),
            ("project.csproj", "<Project Sdk=\"Microsoft.NET.Sdk.BlazorWebAssembly\" />\n".to_owned()),
        ],
        "web-api" => vec![
            ("Program.cs", "var builder = WebApplication.CreateBuilder(args);\nvar app = builder.Build();\napp.MapGet(\"/\", () => \"ok\");\napp.Run();\n".to_owned()),
            ("project.csproj", "<Project Sdk=\"Microsoft.NET.Sdk.Web\" />\n".to_owned()),
        ],
        "console" => vec![("Program.cs", "Console.WriteLine(\"Hello, world!\");\n".to_owned())],
        _ => vec![("README.md", "# Project\n\nGenerated scaffold.\n".to_owned())],
    }
}

/// Writes each template file under `target_dir`, creating parent
/// directories as needed, then returns the same paths/contents as
/// [`ScaffoldedFile`]s.
pub struct LocalTemplateExecutor;

impl LocalTemplateExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalTemplateExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateExecutor for LocalTemplateExecutor {
    async fn scaffold(
        &self,
        project_type: &str,
        target_dir: &str,
        cancel_token: CancellationToken,
    ) -> Result<Vec<ScaffoldedFile>> {
        if cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let target = std::path::PathBuf::from(target_dir);
        let files = template_files(project_type);
        let mut scaffolded = Vec::with_capacity(files.len());

        for (path, content) in files {
            if cancel_token.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let full_path = target.join(path);
            if let Some(parent) = full_path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|err| Error::io_with_source(format!("creating '{}'", parent.display()), err))?;
            }
            tokio::fs::write(&full_path, &content)
                .await
                .map_err(|err| Error::io_with_source(format!("writing '{}'", full_path.display()), err))?;
            scaffolded.push(ScaffoldedFile { path: path.to_owned(), content });
        }

        Ok(scaffolded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scaffolds_web_api_files_onto_disk() {
        let dir = tempfile::tempdir().unwrap();
        let executor = LocalTemplateExecutor::new();
        let files = executor
            .scaffold("web-api", dir.path().to_str().unwrap(), CancellationToken::new())
            .await
            .unwrap();

        assert!(files.iter().any(|f| f.path == "Program.cs"));
        assert!(dir.path().join("Program.cs").exists());
    }

    #[tokio::test]
    async fn unknown_project_type_falls_back_to_generic() {
        let dir = tempfile::tempdir().unwrap();
        let executor = LocalTemplateExecutor::new();
        let files = executor
            .scaffold("unheard-of", dir.path().to_str().unwrap(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "README.md");
    }
}
