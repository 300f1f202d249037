/// PDF rendering through the WeasyPrint command-line tool
use crate::error::{ExportError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    weasyprint_path: PathBuf,
    extra_args: Vec<String>,
}

impl PdfRenderer {
    pub fn new(weasyprint_path: PathBuf) -> Self {
        Self {
            weasyprint_path,
            extra_args: Vec::new(),
        }
    }

    /// Additional arguments passed before the input and output paths.
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    pub fn args(&self, html_path: &Path, output: &Path, base_url: &Path) -> Vec<String> {
        let mut args = vec![
            "--presentational-hints".to_string(),
            "--base-url".to_string(),
            base_url.display().to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push(html_path.display().to_string());
        args.push(output.display().to_string());
        args
    }

    /// Render an HTML document to a PDF file
    pub async fn render(&self, html: &str, output: &Path, base_url: &Path) -> Result<()> {
        let mut staged = tempfile::Builder::new()
            .prefix("avalon-export-")
            .suffix(".html")
            .tempfile()?;
        staged.write_all(html.as_bytes())?;
        staged.flush()?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let args = self.args(staged.path(), output, base_url);
        debug!(program = %self.weasyprint_path.display(), args = ?args, "Rendering PDF");

        let result = Command::new(&self.weasyprint_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ExportError::Spawn {
                program: self.weasyprint_path.display().to_string(),
                source,
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ExportError::Renderer(format!(
                "WeasyPrint exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
