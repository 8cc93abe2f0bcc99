use std::path::PathBuf;

use llm::{ConfigError, LlmError, PayloadError};
use thiserror::Error;

/// The single top-level failure of an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("LLM call failed: {0}")]
    ExternalService(#[from] LlmError),

    #[error("structured response could not be parsed: {0}")]
    Parse(#[from] PayloadError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// At least one report document could not be written. `written` lists the
/// documents that did land on disk.
#[derive(Debug, Error)]
#[error("{}", describe(.failures, .written))]
pub struct PersistError {
    pub written: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, std::io::Error)>,
}

fn describe(failures: &[(PathBuf, std::io::Error)], written: &[PathBuf]) -> String {
    let failed = failures
        .iter()
        .map(|(path, e)| format!("{}: {}", path.display(), e))
        .collect::<Vec<_>>()
        .join("; ");

    if written.is_empty() {
        format!("failed to write report: {}", failed)
    } else {
        let done = written
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("failed to write report: {} (written: {})", failed, done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_persist_message_lists_both_sides() {
        let err = PersistError {
            written: vec![PathBuf::from("out/a_report.md")],
            failures: vec![(
                PathBuf::from("out/a_report.html"),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            )],
        };
        let message = err.to_string();
        assert!(message.contains("out/a_report.html: denied"));
        assert!(message.contains("written: out/a_report.md"));
    }

    #[test]
    fn test_missing_credential_message() {
        let err = AnalysisError::from(ConfigError::MissingCredential { variable: "OPENAI_API_KEY" });
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
