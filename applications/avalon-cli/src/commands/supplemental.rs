use super::Session;
use crate::error::Result;
use crate::manifest::{read_manifest, upload_manifest, ManifestSummary};
use crate::output;
use crate::progress;
use avalon_client::SupplementalFile;
use std::path::Path;
use tracing::info;

pub async fn list(session: &Session, master_file_id: &str) -> Result<Vec<SupplementalFile>> {
    Ok(session.client.supplemental_files(master_file_id).list().await?)
}

/// Fetch one supplemental file's raw JSON, writing it to `output` when given.
pub async fn get(
    session: &Session,
    master_file_id: &str,
    file_id: &str,
    output: Option<&Path>,
) -> Result<serde_json::Value> {
    let raw = session
        .client
        .supplemental_files(master_file_id)
        .get_raw(file_id)
        .await?;

    if let Some(output) = output {
        output::write_json(output, &raw)?;
        info!(file_id = %file_id, output = %output.display(), "Supplemental file exported");
    }

    Ok(raw)
}

pub async fn treat_as_transcript(session: &Session, master_file_id: &str, file_id: &str) -> Result<()> {
    session
        .client
        .supplemental_files(master_file_id)
        .treat_as_transcript(file_id)
        .await?;
    Ok(())
}

/// Upload every row of a CSV manifest to the session's instance.
pub async fn upload_from_manifest(session: &Session, manifest: &Path) -> Result<ManifestSummary> {
    let parsed = read_manifest(manifest)?;
    let total = parsed.rows.len() + parsed.invalid.len();
    info!(
        manifest = %manifest.display(),
        rows = total,
        instance = %session.instance,
        "Uploading supplemental files"
    );

    let bar = progress::bar("Uploading", session.quiet);
    bar.set_length(total as u64);

    let summary = upload_manifest(&session.client, &parsed, |row| {
        bar.set_position(row as u64);
    })
    .await;
    bar.finish_and_clear();

    Ok(summary)
}
