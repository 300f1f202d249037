/// Supplemental file upload manifests
///
/// A manifest is a CSV with the columns `id` (master file), `filename`,
/// `label` and `type` (`pdf`, `caption` or `transcript`).
use crate::error::Result;
use avalon_client::{AvalonClient, SupplementalKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestRow {
    /// 1-based data row number (header excluded)
    #[serde(skip)]
    pub number: usize,
    pub id: String,
    pub filename: PathBuf,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// One upload performed for a manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStep {
    Pdf { label: String },
    Captions { kind: SupplementalKind, label: String },
}

/// Uploads for a row, `None` when the type is not recognised.
///
/// A caption row is uploaded twice: once as captions and once as a
/// transcript labelled `"{label} - Transcripts"`.
pub fn plan_row(row: &ManifestRow) -> Option<Vec<UploadStep>> {
    let label = row.label.clone();

    match row.kind.trim().to_ascii_lowercase().as_str() {
        "pdf" => Some(vec![UploadStep::Pdf { label }]),
        "caption" => Some(vec![
            UploadStep::Captions {
                kind: SupplementalKind::Caption,
                label: label.clone(),
            },
            UploadStep::Captions {
                kind: SupplementalKind::Transcript,
                label: format!("{} - Transcripts", label),
            },
        ]),
        "transcript" => Some(vec![UploadStep::Captions {
            kind: SupplementalKind::Transcript,
            label,
        }]),
        _ => None,
    }
}

/// A parsed manifest. Records that could not be read are kept as failures
/// so the remaining rows can still be uploaded.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub rows: Vec<ManifestRow>,
    pub invalid: Vec<RowFailure>,
}

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let id_column = headers.iter().position(|name| name == "id");

    let mut manifest = Manifest::default();
    for (index, record) in reader.records().enumerate() {
        let number = index + 1;

        let parsed = match record {
            Ok(record) => {
                let master_file_id = id_column
                    .and_then(|column| record.get(column))
                    .unwrap_or_default()
                    .to_string();
                record
                    .deserialize::<ManifestRow>(Some(&headers))
                    .map_err(|e| (master_file_id, e))
            }
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => Err((String::new(), e)),
        };

        match parsed {
            Ok(mut row) => {
                row.number = number;
                manifest.rows.push(row);
            }
            Err((master_file_id, e)) => {
                warn!(row = number, error = %e, "Unreadable manifest row");
                manifest.invalid.push(RowFailure {
                    row: number,
                    master_file_id,
                    reason: format!("invalid manifest row: {}", e),
                });
            }
        }
    }
    Ok(manifest)
}

/// A row that could not be fully uploaded.
#[derive(Debug, Clone)]
pub struct RowFailure {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub master_file_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ManifestSummary {
    /// Supplemental files created
    pub uploaded: Vec<String>,
    /// Rows with an unrecognised type
    pub skipped: Vec<usize>,
    pub failed: Vec<RowFailure>,
}

impl ManifestSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Upload every row. Failures are recorded and the remaining rows still run.
///
/// Unreadable records of the manifest are reported as failed rows.
pub async fn upload_manifest<F>(
    client: &AvalonClient,
    manifest: &Manifest,
    mut on_row: F,
) -> ManifestSummary
where
    F: FnMut(usize),
{
    let mut summary = ManifestSummary {
        failed: manifest.invalid.clone(),
        ..ManifestSummary::default()
    };

    for row in &manifest.rows {
        let row_number = row.number;
        on_row(row_number);

        let Some(steps) = plan_row(row) else {
            warn!(row = row_number, kind = %row.kind, "Unknown upload type, skipping row");
            summary.skipped.push(row_number);
            continue;
        };

        let supplemental = client.supplemental_files(&row.id);

        for step in steps {
            let result = match &step {
                UploadStep::Pdf { label } => {
                    supplemental.add_pdf(&row.filename, Some(label.as_str())).await
                }
                UploadStep::Captions { kind, label } => {
                    supplemental
                        .add_caption_or_transcript(&row.filename, *kind, label)
                        .await
                }
            };

            match result {
                Ok(outcome) => {
                    info!(
                        row = row_number,
                        master_file_id = %row.id,
                        file_id = %outcome.id,
                        "Row uploaded"
                    );
                    summary.uploaded.push(outcome.id);
                }
                Err(e) => {
                    error!(row = row_number, master_file_id = %row.id, error = %e, "Upload failed");
                    summary.failed.push(RowFailure {
                        row: row_number,
                        master_file_id: row.id.clone(),
                        reason: e.to_string(),
                    });
                    // The second upload of a caption row depends on the same file.
                    break;
                }
            }
        }
    }

    summary.failed.sort_by_key(|failure| failure.row);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str) -> ManifestRow {
        ManifestRow {
            number: 1,
            id: "qv33rw73v".into(),
            filename: PathBuf::from("captions.vtt"),
            label: "Interview".into(),
            kind: kind.into(),
        }
    }

    #[test]
    fn test_plan_caption_row_uploads_twice() {
        assert_eq!(
            plan_row(&row("caption")).unwrap(),
            vec![
                UploadStep::Captions {
                    kind: SupplementalKind::Caption,
                    label: "Interview".into()
                },
                UploadStep::Captions {
                    kind: SupplementalKind::Transcript,
                    label: "Interview - Transcripts".into()
                },
            ]
        );
    }

    #[test]
    fn test_plan_other_rows() {
        assert_eq!(
            plan_row(&row(" PDF ")).unwrap(),
            vec![UploadStep::Pdf {
                label: "Interview".into()
            }]
        );
        assert_eq!(plan_row(&row("transcript")).unwrap().len(), 1);
        assert!(plan_row(&row("audio")).is_none());
        assert!(plan_row(&row("")).is_none());
    }

    #[test]
    fn test_read_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        std::fs::write(
            &path,
            "id,filename,label,type\nqv33rw73v, part1.pdf ,Part 1: PDF Transcript,pdf\nv118rd76r,part1.vtt,\"Captions, English\",caption\n",
        )
        .unwrap();

        let manifest = read_manifest(&path).unwrap();
        let rows = &manifest.rows;

        assert_eq!(rows.len(), 2);
        assert!(manifest.invalid.is_empty());
        assert_eq!(rows[1].number, 2);
        assert_eq!(rows[0].filename, PathBuf::from("part1.pdf"));
        assert_eq!(rows[1].label, "Captions, English");
        assert_eq!(rows[1].kind, "caption");
    }

    #[test]
    fn test_read_manifest_missing_type_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        std::fs::write(&path, "id,filename,label\nabc,a.pdf,A\n").unwrap();

        let rows = read_manifest(&path).unwrap().rows;
        assert_eq!(rows[0].kind, "");
        assert!(plan_row(&rows[0]).is_none());
    }

    #[test]
    fn test_unreadable_records_do_not_stop_the_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        std::fs::write(
            &path,
            "id,filename,label,type\nmf1,a.pdf,A,pdf\nmf2,b.pdf\nmf3,c.pdf,C,pdf,extra\nmf4,d.pdf,D,pdf\n",
        )
        .unwrap();

        let manifest = read_manifest(&path).unwrap();

        let numbers: Vec<usize> = manifest.rows.iter().map(|row| row.number).collect();
        assert_eq!(numbers, vec![1, 4]);
        let invalid: Vec<usize> = manifest.invalid.iter().map(|failure| failure.row).collect();
        assert_eq!(invalid, vec![2, 3]);
        assert!(manifest.invalid[0].reason.starts_with("invalid manifest row"));
    }
}
