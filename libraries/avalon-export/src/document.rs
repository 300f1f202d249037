/// Transcript export document (HTML, rendered to PDF)
use crate::error::Result;
use crate::pdf::PdfRenderer;
use avalon_client::MetadataElements;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_COLLECTION_TITLE: &str = "Unnamed Collection";
pub const DEFAULT_INSTITUTION: &str = "Texas A&M University Libraries";
pub const DEFAULT_LANGUAGE: &str = "en-US";

const DISCLAIMER: &str = "This transcript file was initially generated using artificial intelligence. \
It is possible that there are some inaccuracies that have not yet been corrected.";

const STYLESHEET: &str = r#"
        body { font-family: 'CrimsonText', serif; margin: 40px; }
        h1, h2 { text-align: center; font-family: 'Oswald', sans-serif; }
        h1 { color: #500000; }
        dl { margin-bottom: 20px; }
        dt { font-weight: bold; margin-top: 10px; }
        dd { margin-left: 20px; margin-bottom: 20px; }
        .warning { border-left: 4px solid #732F2F; padding-left: 10px; margin: 20px 0; }
        .transcript { margin-top: 30px; }
        .transcript p { margin: 2px 0; margin-bottom: 20px; }
        img { max-width: 30%; height: auto; display: block; margin: 10px auto; max-height: 100px; }
"#;

/// Printable description of a media object with its transcript.
#[derive(Debug, Clone)]
pub struct TranscriptDocument {
    pub collection_title: String,
    pub institution: String,
    pub logo: Option<PathBuf>,
    pub elements: MetadataElements,
    /// Show the machine-generated transcript disclaimer
    pub warning: bool,
    pub transcript_lines: Vec<String>,
}

impl Default for TranscriptDocument {
    fn default() -> Self {
        Self {
            collection_title: DEFAULT_COLLECTION_TITLE.to_string(),
            institution: DEFAULT_INSTITUTION.to_string(),
            logo: None,
            elements: MetadataElements::default(),
            warning: true,
            transcript_lines: Vec::new(),
        }
    }
}

impl TranscriptDocument {
    pub fn new(elements: MetadataElements) -> Self {
        Self {
            elements,
            ..Self::default()
        }
    }

    pub fn with_collection_title(mut self, title: impl Into<String>) -> Self {
        self.collection_title = title.into();
        self
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = institution.into();
        self
    }

    pub fn with_logo(mut self, logo: Option<PathBuf>) -> Self {
        self.logo = logo;
        self
    }

    pub fn with_warning(mut self, warning: bool) -> Self {
        self.warning = warning;
        self
    }

    pub fn with_transcript(mut self, lines: Vec<String>) -> Self {
        self.transcript_lines = lines;
        self
    }

    pub fn build_html(&self, title: &str, language: &str) -> String {
        let mut html = String::new();

        html.push_str(&format!(
            "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n",
            escape_html(language),
            escape_html(title),
            STYLESHEET
        ));

        if let Some(logo) = &self.logo {
            html.push_str(&format!(
                "<img src=\"{}\" alt=\"{} logo\"/>\n",
                escape_html(&logo.display().to_string()),
                escape_html(&self.institution)
            ));
        }

        html.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.institution)));
        html.push_str(&format!("<h2>{}</h2>\n", escape_html(&self.collection_title)));

        html.push_str("<dl>\n");
        for (element, value) in self.elements.iter() {
            if value.is_empty() {
                continue;
            }
            html.push_str(&format!(
                "<dt>{}</dt><dd>{}</dd>\n",
                escape_html(element),
                escape_html(value)
            ));
        }
        html.push_str("</dl>\n");

        if self.warning {
            html.push_str(&format!(
                "<div class=\"warning\"><strong>Disclaimer:</strong> {}</div>\n",
                DISCLAIMER
            ));
        }

        if !self.transcript_lines.is_empty() {
            html.push_str("<div class=\"transcript\"><h2>Transcript</h2>\n");
            for line in &self.transcript_lines {
                html.push_str(&format!("<p>{}</p>\n", escape_html(line)));
            }
            html.push_str("</div>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    /// Build the document and render it to `output`.
    ///
    /// Relative resources (logo, fonts) resolve against `base_url`.
    pub async fn save(
        &self,
        renderer: &PdfRenderer,
        title: &str,
        language: &str,
        output: &Path,
        base_url: &Path,
    ) -> Result<()> {
        let html = self.build_html(title, language);
        renderer.render(&html, output, base_url).await?;

        info!(
            output = %output.display(),
            lines = self.transcript_lines.len(),
            "Transcript PDF written"
        );
        Ok(())
    }
}

fn escape_html(input: &str) -> String {
    input
        .chars()
        .map(|ch| match ch {
            '<' => "&lt;".into(),
            '>' => "&gt;".into(),
            '&' => "&amp;".into(),
            '"' => "&quot;".into(),
            '\'' => "&#39;".into(),
            _ => ch.to_string(),
        })
        .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements() -> MetadataElements {
        MetadataElements(vec![
            (
                "Title".to_string(),
                "Interview with Linnea Glatt: Part 2".to_string(),
            ),
            ("Publisher".to_string(), "Art This Week Productions".to_string()),
            ("Subjects".to_string(), String::new()),
        ])
    }

    #[test]
    fn test_metadata_list_skips_empty_values() {
        let html = TranscriptDocument::new(elements()).build_html("Part 2", DEFAULT_LANGUAGE);

        assert!(html.contains("<dt>Title</dt><dd>Interview with Linnea Glatt: Part 2</dd>"));
        assert!(html.contains("<dt>Publisher</dt>"));
        assert!(!html.contains("<dt>Subjects</dt>"));
        assert!(html.contains("<html lang=\"en-US\">"));
        assert!(html.contains("<title>Part 2</title>"));
    }

    #[test]
    fn test_defaults() {
        let html = TranscriptDocument::default().build_html("t", DEFAULT_LANGUAGE);

        assert!(html.contains("<h1>Texas A&amp;M University Libraries</h1>"));
        assert!(html.contains("<h2>Unnamed Collection</h2>"));
        assert!(html.contains("class=\"warning\""));
        assert!(!html.contains("class=\"transcript\""));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_transcript_and_warning_toggle() {
        let html = TranscriptDocument::new(elements())
            .with_collection_title("DWG Project")
            .with_warning(false)
            .with_transcript(vec!["Q: <laughs>".to_string(), "A: Yes".to_string()])
            .build_html("Part 2", "en-US");

        assert!(!html.contains("Disclaimer"));
        assert!(html.contains("<h2>Transcript</h2>"));
        assert!(html.contains("<p>Q: &lt;laughs&gt;</p>"));
        assert!(html.contains("<p>A: Yes</p>"));
        assert!(html.contains("<h2>DWG Project</h2>"));
    }

    #[test]
    fn test_logo() {
        let html = TranscriptDocument::default()
            .with_logo(Some(PathBuf::from("assets/logo.png")))
            .build_html("t", DEFAULT_LANGUAGE);
        assert!(html.contains("<img src=\"assets/logo.png\""));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b <c> \"d\" 'e'"), "a &amp; b &lt;c&gt; &quot;d&quot; &#39;e&#39;");
    }
}
