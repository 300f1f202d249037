/// Audio extraction from streaming derivatives - FFmpeg wrapper
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use avalon_client::ExtractionTarget;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Speech-oriented clean-up applied to every extraction.
pub const AUDIO_FILTERS: &str = "highpass=f=100, lowpass=f=8000, afftdn, loudnorm";

/// Turns a stream URL into a local audio file.
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn encode(&self, source: &str, output: &Path) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_path: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Arguments for a VBR MP3 of the audio track only.
    pub fn args(source: &str, output: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            source.to_string(),
            "-vn".to_string(),
            "-af".to_string(),
            AUDIO_FILTERS.to_string(),
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            "-q:a".to_string(),
            "2".to_string(),
            output.display().to_string(),
        ]
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(&self, source: &str, output: &Path) -> Result<()> {
        let output_result = Command::new(&self.ffmpeg_path)
            .args(Self::args(source, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ExportError::Spawn {
                program: self.ffmpeg_path.display().to_string(),
                source,
            })?;

        if !output_result.status.success() {
            let stderr = String::from_utf8_lossy(&output_result.stderr);
            return Err(ExportError::Encoder(format!(
                "FFmpeg failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// A target whose encoding failed.
#[derive(Debug, Clone)]
pub struct FailedExtraction {
    pub target: ExtractionTarget,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub extracted: Vec<PathBuf>,
    /// Outputs that already existed
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<FailedExtraction>,
}

impl ExtractionReport {
    pub fn total(&self) -> usize {
        self.extracted.len() + self.skipped.len() + self.failed.len()
    }
}

/// Progress information during an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub index: usize,
    pub total: usize,
    pub file_id: String,
}

pub struct AudioExtractor<E: Encoder> {
    encoder: E,
}

impl<E: Encoder> AudioExtractor<E> {
    pub fn new(encoder: E) -> Self {
        Self { encoder }
    }

    /// Extract every target into `output_dir`.
    ///
    /// Existing outputs are left alone. A failing target is recorded and the
    /// run moves on.
    pub async fn extract_all<F>(
        &self,
        targets: &[ExtractionTarget],
        output_dir: &Path,
        mut progress_callback: F,
    ) -> Result<ExtractionReport>
    where
        F: FnMut(ExtractionProgress),
    {
        tokio::fs::create_dir_all(output_dir).await?;

        let total = targets.len();
        let mut report = ExtractionReport::default();

        for (index, target) in targets.iter().enumerate() {
            progress_callback(ExtractionProgress {
                index,
                total,
                file_id: target.file_id.clone(),
            });

            if tokio::fs::try_exists(&target.output).await? {
                debug!(output = %target.output.display(), "Output exists, skipping");
                report.skipped.push(target.output.clone());
                continue;
            }

            match self.encoder.encode(&target.source, &target.output).await {
                Ok(()) => {
                    info!(
                        work_id = %target.work_id,
                        file_id = %target.file_id,
                        output = %target.output.display(),
                        "Audio extracted"
                    );
                    report.extracted.push(target.output.clone());
                }
                Err(e) => {
                    error!(
                        work_id = %target.work_id,
                        file_id = %target.file_id,
                        error = %e,
                        "Failed to extract audio"
                    );
                    report.failed.push(FailedExtraction {
                        target: target.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records calls and writes a stub file, failing for sources containing "broken".
    #[derive(Default)]
    struct RecordingEncoder {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Encoder for RecordingEncoder {
        async fn encode(&self, source: &str, output: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(source.to_string());
            if source.contains("broken") {
                return Err(ExportError::Encoder("FFmpeg failed: 404".into()));
            }
            tokio::fs::write(output, b"mp3").await?;
            Ok(())
        }
    }

    fn target(dir: &Path, work: &str, file: &str, source: &str) -> ExtractionTarget {
        ExtractionTarget {
            work_id: work.to_string(),
            file_id: file.to_string(),
            source: source.to_string(),
            output: avalon_client::output_path(dir, work, file),
        }
    }

    #[test]
    fn test_ffmpeg_args() {
        let args = FfmpegEncoder::args("https://s/low.m3u8", Path::new("/out/w_f.mp3"));
        assert_eq!(args[0], "-i");
        assert_eq!(args[1], "https://s/low.m3u8");
        assert_eq!(args[4], AUDIO_FILTERS);
        assert_eq!(args.last().unwrap(), "/out/w_f.mp3");
    }

    #[tokio::test]
    async fn test_existing_outputs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("audio");
        let targets = vec![
            target(&out, "w1", "f1", "https://s/one.m3u8"),
            target(&out, "w1", "f2", "https://s/two.m3u8"),
        ];

        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(&targets[0].output, b"already here").unwrap();

        let extractor = AudioExtractor::new(RecordingEncoder::default());
        let report = extractor.extract_all(&targets, &out, |_| {}).await.unwrap();

        assert_eq!(report.skipped, vec![targets[0].output.clone()]);
        assert_eq!(report.extracted, vec![targets[1].output.clone()]);
        assert_eq!(
            *extractor.encoder.calls.lock().unwrap(),
            vec!["https://s/two.m3u8".to_string()]
        );
        assert_eq!(std::fs::read(&targets[0].output).unwrap(), b"already here");
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let targets = vec![
            target(dir.path(), "w1", "f1", "https://s/broken.m3u8"),
            target(dir.path(), "w2", "f1", "https://s/fine.m3u8"),
        ];

        let mut seen = Vec::new();
        let extractor = AudioExtractor::new(RecordingEncoder::default());
        let report = extractor
            .extract_all(&targets, dir.path(), |p| seen.push((p.index, p.total)))
            .await
            .unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].target.work_id, "w1");
        assert_eq!(report.extracted.len(), 1);
        assert_eq!(report.total(), 2);
        assert_eq!(seen, vec![(0, 2), (1, 2)]);
    }

    #[tokio::test]
    async fn test_second_run_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let targets = vec![target(dir.path(), "w1", "f1", "https://s/one.m3u8")];
        let extractor = AudioExtractor::new(RecordingEncoder::default());

        extractor.extract_all(&targets, dir.path(), |_| {}).await.unwrap();
        let report = extractor.extract_all(&targets, dir.path(), |_| {}).await.unwrap();

        assert!(report.extracted.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(extractor.encoder.calls.lock().unwrap().len(), 1);
    }
}
