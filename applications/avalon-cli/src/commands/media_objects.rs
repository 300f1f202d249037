use super::Session;
use crate::error::Result;
use crate::output;
use avalon_client::OffsetUpdate;
use avalon_export::{read_transcript, PdfRenderer, TranscriptDocument, DEFAULT_COLLECTION_TITLE};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A media object as the server sent it.
pub async fn media_object(session: &Session, media_object_id: &str) -> Result<serde_json::Value> {
    Ok(session.client.media_objects().get_raw(media_object_id).await?)
}

/// Write the media object exactly as the API returned it.
pub async fn export_media_object_json(session: &Session, media_object_id: &str, output: &Path) -> Result<()> {
    let raw = session.client.media_objects().get_raw(media_object_id).await?;
    output::write_json(output, &raw)?;

    info!(media_object_id = %media_object_id, output = %output.display(), "Media object exported");
    Ok(())
}

pub async fn update_offsets(session: &Session, media_object_id: &str, offset: u64) -> Result<OffsetUpdate> {
    Ok(session
        .client
        .media_objects()
        .update_offsets(media_object_id, offset)
        .await?)
}

/// Options for a transcript PDF export.
#[derive(Debug, Clone)]
pub struct TranscriptPdfOptions {
    pub media_object_id: String,
    pub vtt: PathBuf,
    pub output: PathBuf,
    /// Falls back to the media object's collection name
    pub collection_title: Option<String>,
    pub warning: bool,
}

/// Render a media object's metadata and caption text to PDF.
pub async fn export_transcript_pdf(session: &Session, options: &TranscriptPdfOptions) -> Result<()> {
    let elements = session
        .client
        .media_objects()
        .metadata_elements(&options.media_object_id)
        .await?;

    let lines = match read_transcript(&options.vtt).await? {
        Some(lines) => lines,
        None => {
            warn!(vtt = %options.vtt.display(), "Caption file not found, exporting metadata only");
            Vec::new()
        }
    };

    let collection_title = options
        .collection_title
        .clone()
        .or_else(|| {
            elements
                .get("Collection")
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_COLLECTION_TITLE.to_string());

    let title = elements
        .get("Title")
        .filter(|title| !title.is_empty())
        .unwrap_or(options.media_object_id.as_str())
        .to_string();

    let export = &session.config.export;
    let document = TranscriptDocument::new(elements)
        .with_collection_title(collection_title)
        .with_institution(export.institution.clone())
        .with_logo(export.logo.clone())
        .with_warning(options.warning)
        .with_transcript(lines);

    let tools = &session.config.tools;
    let renderer =
        PdfRenderer::new(tools.weasyprint_path.clone()).with_extra_args(tools.weasyprint_args.clone());

    let base_url = std::env::current_dir()?;
    document
        .save(&renderer, &title, &export.language, &options.output, &base_url)
        .await?;

    Ok(())
}
