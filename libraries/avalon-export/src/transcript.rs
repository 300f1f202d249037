/// Transcript text extraction from caption files
use crate::error::Result;
use std::path::Path;

/// Header lines that never belong in a printed transcript.
const SKIP_PHRASES: [&str; 8] = [
    "WEBVTT",
    "Type:",
    "Language:",
    "Responsible Party:",
    "Originating File:",
    "File Creator:",
    "File Creation Date:",
    "Local Usage Element:",
];

/// Printable lines of a caption document.
///
/// Header lines are dropped, the rest are trimmed and blank lines removed.
/// Cue numbers and timings are kept so readers can find their place in
/// the recording.
pub fn transcript_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !SKIP_PHRASES.iter().any(|phrase| line.contains(phrase)))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a caption file into transcript lines, `None` when it does not exist.
pub async fn read_transcript(path: &Path) -> Result<Option<Vec<String>>> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }

    let text = tokio::fs::read_to_string(path).await?;
    Ok(Some(transcript_lines(&text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lines_dropped() {
        let text = "WEBVTT\nType: caption\nLanguage: eng\nResponsible Party: US, TxAM\n\n1\n00:00:00.000 --> 00:00:04.000\n  Hello there.  \n";
        assert_eq!(
            transcript_lines(text),
            vec!["1", "00:00:00.000 --> 00:00:04.000", "Hello there."]
        );
    }

    #[test]
    fn test_phrase_anywhere_in_line_drops_it() {
        let lines = transcript_lines("WEBVTT\nShe said Language: matters\nkept\n");
        assert_eq!(lines, vec!["kept"]);
    }

    #[test]
    fn test_empty_document() {
        assert!(transcript_lines("").is_empty());
        assert!(transcript_lines("WEBVTT\n\n   \n").is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let result = read_transcript(Path::new("/nonexistent/transcript.vtt"))
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
