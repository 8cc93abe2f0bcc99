use std::path::{Path, PathBuf};

use report::ComposedReport;

use crate::error::PersistError;

/// Where the two report documents go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub markdown: PathBuf,
    pub html: PathBuf,
}

impl OutputPaths {
    pub fn new(markdown: impl Into<PathBuf>, html: impl Into<PathBuf>) -> Self {
        Self {
            markdown: markdown.into(),
            html: html.into(),
        }
    }

    /// `<dir>/<input stem>_report.md` and `.html`.
    pub fn for_input(out_dir: &Path, input: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "startup".to_string());

        Self {
            markdown: out_dir.join(format!("{}_report.md", stem)),
            html: out_dir.join(format!("{}_report.html", stem)),
        }
    }
}

async fn write_document(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await
}

/// Writes both documents. A failed write does not stop the other one; any
/// failure is returned together with what was written.
pub async fn persist(report: &ComposedReport, paths: &OutputPaths) -> Result<Vec<PathBuf>, PersistError> {
    let documents = [
        (&paths.markdown, report.markdown.as_str()),
        (&paths.html, report.html.as_str()),
    ];

    let mut written = Vec::new();
    let mut failures = Vec::new();
    for (path, contents) in documents {
        match write_document(path, contents).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), bytes = contents.len(), "report written");
                written.push(path.clone());
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "report write failed");
                failures.push((path.clone(), e));
            }
        }
    }

    if failures.is_empty() {
        Ok(written)
    } else {
        Err(PersistError { written, failures })
    }
}
