//! Derivative selection and per-master-file reports.

use crate::types::{CollectionItems, Derivative, MasterFile};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Pick the derivative to work from.
///
/// The first derivative whose label mentions "low" wins, then the first
/// mentioning "medium", then whatever comes first.
pub fn select_best_derivative(derivatives: &[Derivative]) -> Option<&Derivative> {
    derivatives
        .iter()
        .find(|d| d.label.contains("low"))
        .or_else(|| derivatives.iter().find(|d| d.label.contains("medium")))
        .or_else(|| derivatives.first())
}

impl MasterFile {
    pub fn best_derivative(&self) -> Option<&Derivative> {
        select_best_derivative(&self.files)
    }
}

/// One master file in the file-id export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIdRow {
    pub id: String,
    pub label: String,
    #[serde(rename = "parent label")]
    pub parent_label: String,
    pub derivative: String,
}

/// List every master file of every media object, with its first derivative.
pub fn file_id_rows(items: &CollectionItems) -> Vec<FileIdRow> {
    items
        .values()
        .flat_map(|object| {
            object.files.iter().map(move |file| FileIdRow {
                id: file.id.clone(),
                label: file.label.clone(),
                parent_label: object.title.clone(),
                derivative: file
                    .files
                    .first()
                    .and_then(|d| d.derivative_file.clone())
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// One master file in the HLS report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HlsRow {
    #[serde(rename = "Parent work")]
    pub parent_work: String,
    #[serde(rename = "File id")]
    pub file_id: String,
    #[serde(rename = "HLS Path")]
    pub hls_path: String,
    #[serde(rename = "File duration")]
    pub duration: String,
    #[serde(rename = "Original file")]
    pub original_file: String,
    #[serde(rename = "File quality")]
    pub quality: String,
}

/// Describe the best derivative of each master file.
///
/// Master files without derivatives are left out.
pub fn hls_rows(items: &CollectionItems) -> Vec<HlsRow> {
    let mut rows = Vec::new();

    for object in items.values() {
        for file in &object.files {
            let Some(best) = file.best_derivative() else {
                continue;
            };

            rows.push(HlsRow {
                parent_work: object.id.clone(),
                file_id: file.id.clone(),
                hls_path: best.hls_url.clone().unwrap_or_default(),
                duration: best.duration.clone().unwrap_or_default(),
                original_file: best.original_file_name().unwrap_or_default().to_string(),
                quality: best.label.clone(),
            });
        }
    }

    rows
}

/// A master file whose best derivative should be turned into audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionTarget {
    pub work_id: String,
    pub file_id: String,
    /// HLS URL of the selected derivative
    pub source: String,
    /// `{output_dir}/{work_id}_{file_id}.mp3`
    pub output: PathBuf,
}

/// A master file that could not be planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDerivative {
    pub work_id: String,
    pub file_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionPlan {
    pub targets: Vec<ExtractionTarget>,
    /// Master files with no derivative or no HLS URL
    pub missing: Vec<MissingDerivative>,
}

/// Deterministic output path for a master file's audio.
pub fn output_path(output_dir: &Path, work_id: &str, file_id: &str) -> PathBuf {
    output_dir.join(format!("{}_{}.mp3", work_id, file_id))
}

/// Plan audio extraction for every master file in `items`.
pub fn extraction_plan(items: &CollectionItems, output_dir: &Path) -> ExtractionPlan {
    let mut plan = ExtractionPlan::default();

    for object in items.values() {
        for file in &object.files {
            let source = file
                .best_derivative()
                .and_then(|d| d.hls_url.clone())
                .filter(|url| !url.is_empty());

            match source {
                Some(source) => plan.targets.push(ExtractionTarget {
                    work_id: object.id.clone(),
                    file_id: file.id.clone(),
                    source,
                    output: output_path(output_dir, &object.id, &file.id),
                }),
                None => plan.missing.push(MissingDerivative {
                    work_id: object.id.clone(),
                    file_id: file.id.clone(),
                }),
            }
        }
    }

    plan
}
