use avalon_client::validate_vtt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Outcome of checking one caption file.
#[derive(Debug, Clone)]
pub struct CaptionCheck {
    pub path: PathBuf,
    /// `None` when the file is valid WebVTT
    pub problem: Option<String>,
}

impl CaptionCheck {
    pub fn is_valid(&self) -> bool {
        self.problem.is_none()
    }
}

/// Check each file as WebVTT. Unreadable files count as invalid.
pub async fn validate_captions(paths: &[PathBuf]) -> Vec<CaptionCheck> {
    let mut checks = Vec::with_capacity(paths.len());

    for path in paths {
        let problem = match check_file(path).await {
            Ok(()) => None,
            Err(problem) => {
                warn!(path = %path.display(), problem = %problem, "Invalid captions");
                Some(problem)
            }
        };

        checks.push(CaptionCheck {
            path: path.clone(),
            problem,
        });
    }

    checks
}

async fn check_file(path: &Path) -> Result<(), String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("cannot read file: {}", e))?;
    validate_vtt(&text).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_mixed_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.vtt");
        let bad = dir.path().join("bad.vtt");
        std::fs::write(&good, "WEBVTT\n\n00:00.000 --> 00:02.500\nHello\n").unwrap();
        std::fs::write(&bad, "1\n00:00:00,000 --> 00:00:02,500\nHello\n").unwrap();
        let missing = dir.path().join("missing.vtt");

        let checks = validate_captions(&[good, bad, missing]).await;

        assert!(checks[0].is_valid());
        assert!(!checks[1].is_valid());
        assert!(checks[2].problem.as_deref().unwrap().starts_with("cannot read file"));
    }
}
