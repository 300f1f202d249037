//! Supplemental file operations (PDFs, captions, transcripts).

use crate::error::{AvalonClientError, Result};
use crate::response::{self, require_id, API_KEY_HEADER};
use crate::types::{
    CreatedResponse, SupplementalFile, SupplementalKind, SupplementalMetadata, UploadOutcome,
};
use crate::vtt::validate_vtt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

const PDF_MIME: &str = "application/pdf";

/// Supplemental file client for one master file.
pub struct SupplementalFileClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    api_key: &'a str,
    master_file_id: &'a str,
}

impl<'a> SupplementalFileClient<'a> {
    pub(crate) fn new(
        http: &'a Client,
        base_url: &'a str,
        api_key: &'a str,
        master_file_id: &'a str,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            master_file_id,
        }
    }

    /// List the supplemental files of the master file.
    pub async fn list(&self) -> Result<Vec<SupplementalFile>> {
        let url = self.collection_url()?;
        debug!(url = %url, "Listing supplemental files");

        let response =
            response::send(self.http.get(&url).header(API_KEY_HEADER, self.api_key)).await?;
        response::json(response, &self.describe(None)).await
    }

    /// Get one supplemental file.
    pub async fn get(&self, file_id: &str) -> Result<SupplementalFile> {
        let url = self.file_url(file_id)?;
        debug!(url = %url, "Fetching supplemental file");

        let response =
            response::send(self.http.get(&url).header(API_KEY_HEADER, self.api_key)).await?;
        response::json(response, &self.describe(Some(file_id))).await
    }

    /// Get one supplemental file exactly as the server returns it.
    pub async fn get_raw(&self, file_id: &str) -> Result<serde_json::Value> {
        let url = self.file_url(file_id)?;
        debug!(url = %url, "Fetching raw supplemental file");

        let response =
            response::send(self.http.get(&url).header(API_KEY_HEADER, self.api_key)).await?;
        response::json(response, &self.describe(Some(file_id))).await
    }

    /// Apply metadata to an existing supplemental file.
    pub async fn update(&self, file_id: &str, metadata: &SupplementalMetadata) -> Result<()> {
        let url = self.file_url(file_id)?;
        debug!(url = %url, metadata = ?metadata, "Updating supplemental file");

        let response = response::send(
            self.http
                .put(&url)
                .header(API_KEY_HEADER, self.api_key)
                .json(metadata),
        )
        .await?;
        response::check_status(response, &self.describe(Some(file_id))).await?;

        Ok(())
    }

    /// Rename a supplemental file.
    pub async fn set_label(&self, file_id: &str, label: &str) -> Result<()> {
        self.update(file_id, &SupplementalMetadata::label(label))
            .await
    }

    /// Flag a supplemental file so Avalon shows it as a transcript.
    pub async fn treat_as_transcript(&self, file_id: &str) -> Result<()> {
        let url = self.file_url(file_id)?;
        debug!(url = %url, "Marking supplemental file as transcript");

        let response = response::send(
            self.http
                .put(&url)
                .header(API_KEY_HEADER, self.api_key)
                .json(&json!({ "treat_as_transcript": true })),
        )
        .await?;
        response::check_status(response, &self.describe(Some(file_id))).await?;

        info!(
            master_file_id = %self.master_file_id,
            file_id = %file_id,
            "Supplemental file treated as transcript"
        );
        Ok(())
    }

    /// Upload a file in a single request, guessing its MIME type.
    ///
    /// `label` becomes the uploaded file name; the file's own name is used
    /// when it is `None`.
    pub async fn upload(&self, file_path: &Path, label: Option<&str>) -> Result<String> {
        let file_name = match label {
            Some(label) => label.to_string(),
            None => file_name_of(file_path),
        };
        let mime = mime_guess::from_path(file_path)
            .first_raw()
            .unwrap_or("application/octet-stream");

        let form = Form::new().part("file", file_part(file_path, file_name, mime).await?);
        self.create(form).await
    }

    /// Attach a PDF, then label it.
    pub async fn add_pdf(&self, file_path: &Path, label: Option<&str>) -> Result<UploadOutcome> {
        let label = match label {
            Some(label) => label.to_string(),
            None => file_name_of(file_path),
        };
        let metadata = SupplementalMetadata::label(label.clone());

        self.create_and_update(file_path, label, PDF_MIME, metadata)
            .await
    }

    /// Attach a caption or transcript file, then apply its metadata.
    ///
    /// `.vtt` files must pass WebVTT validation before anything is sent.
    pub async fn add_caption_or_transcript(
        &self,
        file_path: &Path,
        kind: SupplementalKind,
        label: &str,
    ) -> Result<UploadOutcome> {
        let mime = caption_mime_type(file_path)?;

        if mime == "text/vtt" {
            ensure_exists(file_path)?;
            let text = tokio::fs::read_to_string(file_path).await?;
            validate_vtt(&text).map_err(|e| AvalonClientError::InvalidCaptions {
                path: file_path.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        let metadata = SupplementalMetadata::captions(kind, label);
        self.create_and_update(file_path, file_name_of(file_path), mime, metadata)
            .await
    }

    /// POST the file with its metadata, then PUT the metadata onto the new id.
    async fn create_and_update(
        &self,
        file_path: &Path,
        file_name: String,
        mime: &str,
        metadata: SupplementalMetadata,
    ) -> Result<UploadOutcome> {
        let meta_json = serde_json::to_string(&metadata)
            .map_err(|e| AvalonClientError::ParseError(e.to_string()))?;

        let form = Form::new()
            .part("file", file_part(file_path, file_name, mime).await?)
            .text("metadata", meta_json);

        let id = self.create(form).await?;
        self.update(&id, &metadata).await?;

        info!(
            master_file_id = %self.master_file_id,
            file_id = %id,
            label = ?metadata.label,
            kind = ?metadata.kind,
            "Supplemental file uploaded"
        );

        Ok(UploadOutcome { id, metadata })
    }

    async fn create(&self, form: Form) -> Result<String> {
        let url = self.collection_url()?;
        debug!(url = %url, "Creating supplemental file");

        let response = response::send(
            self.http
                .post(&url)
                .header(API_KEY_HEADER, self.api_key)
                .multipart(form),
        )
        .await?;
        let created: CreatedResponse = response::json(response, &self.describe(None)).await?;

        debug!(file_id = %created.id, "Supplemental file created");
        Ok(created.id)
    }

    fn collection_url(&self) -> Result<String> {
        let master_file_id = require_id(self.master_file_id, "master file")?;
        Ok(format!(
            "{}/master_files/{}/supplemental_files.json",
            self.base_url, master_file_id
        ))
    }

    fn file_url(&self, file_id: &str) -> Result<String> {
        let master_file_id = require_id(self.master_file_id, "master file")?;
        let file_id = require_id(file_id, "supplemental file")?;
        Ok(format!(
            "{}/master_files/{}/supplemental_files/{}.json",
            self.base_url, master_file_id, file_id
        ))
    }

    fn describe(&self, file_id: Option<&str>) -> String {
        match file_id {
            Some(id) => format!(
                "supplemental file {} of master file {}",
                id, self.master_file_id
            ),
            None => format!("supplemental files of master file {}", self.master_file_id),
        }
    }
}

/// MIME type for a caption or transcript upload.
pub fn caption_mime_type(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("vtt") => Ok("text/vtt"),
        Some("srt") => Ok("text/srt"),
        _ => Err(AvalonClientError::UnsupportedFileType(format!(
            "{} (expected .vtt or .srt)",
            path.display()
        ))),
    }
}

fn ensure_exists(file_path: &Path) -> Result<()> {
    if file_path.is_file() {
        Ok(())
    } else {
        Err(AvalonClientError::FileNotFound(
            file_path.display().to_string(),
        ))
    }
}

fn file_name_of(file_path: &Path) -> String {
    file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}

async fn file_part(file_path: &Path, file_name: String, mime: &str) -> Result<Part> {
    ensure_exists(file_path)?;

    let contents = tokio::fs::read(file_path).await?;
    debug!(file = %file_path.display(), size = contents.len(), mime = %mime, "Read upload");

    Ok(Part::bytes(contents).file_name(file_name).mime_str(mime)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_mime_types() {
        assert_eq!(caption_mime_type(Path::new("a.vtt")).unwrap(), "text/vtt");
        assert_eq!(caption_mime_type(Path::new("a.VTT")).unwrap(), "text/vtt");
        assert_eq!(caption_mime_type(Path::new("a.srt")).unwrap(), "text/srt");
        assert!(matches!(
            caption_mime_type(Path::new("a.txt")),
            Err(AvalonClientError::UnsupportedFileType(_))
        ));
        assert!(caption_mime_type(Path::new("captions")).is_err());
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of(Path::new("/tmp/part1.pdf")), "part1.pdf");
    }
}
