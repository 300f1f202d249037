use super::Session;
use crate::error::Result;
use crate::output;
use crate::progress;
use avalon_client::{
    extraction_plan, file_id_rows, hls_rows, Collection, CollectionItems, RawCollectionItems,
};
use avalon_export::{AudioExtractor, Encoder, ExtractionReport};
use std::path::Path;
use tracing::{info, warn};

pub const FILE_ID_HEADERS: [&str; 4] = ["id", "label", "parent label", "derivative"];

pub const HLS_HEADERS: [&str; 6] = [
    "Parent work",
    "File id",
    "HLS Path",
    "File duration",
    "Original file",
    "File quality",
];

pub async fn all_collections(session: &Session) -> Result<Vec<Collection>> {
    Ok(session.client.collections().get_all_collections().await?)
}

pub async fn collection(session: &Session, collection_id: &str) -> Result<Collection> {
    Ok(session.client.collections().get_collection(collection_id).await?)
}

/// Every media object in a collection, with a page progress bar.
pub async fn collection_items(session: &Session, collection_id: &str) -> Result<CollectionItems> {
    let bar = progress::bar("Fetching pages", session.quiet);

    let items = session
        .client
        .collections()
        .page_items(collection_id, session.items_per_page(), |page| {
            progress::track_pages(&bar, &page);
        })
        .await?;

    bar.finish_and_clear();
    Ok(items)
}

/// Every media object in a collection as the server sent it.
pub async fn raw_collection_items(session: &Session, collection_id: &str) -> Result<RawCollectionItems> {
    let bar = progress::bar("Fetching pages", session.quiet);

    let items = session
        .client
        .collections()
        .page_items_raw(collection_id, session.items_per_page(), |page| {
            progress::track_pages(&bar, &page);
        })
        .await?;

    bar.finish_and_clear();
    Ok(items)
}

/// Write one CSV row per master file in the collection.
pub async fn export_file_ids(session: &Session, collection_id: &str, output: &Path) -> Result<usize> {
    let items = collection_items(session, collection_id).await?;
    let rows = file_id_rows(&items);

    output::write_csv(output, &FILE_ID_HEADERS, &rows)?;
    info!(output = %output.display(), rows = rows.len(), "File id report written");

    Ok(rows.len())
}

/// Write the HLS path of each master file's best derivative.
pub async fn write_hls_report(session: &Session, collection_id: &str, output: &Path) -> Result<usize> {
    let items = collection_items(session, collection_id).await?;
    let rows = hls_rows(&items);

    output::write_csv(output, &HLS_HEADERS, &rows)?;
    info!(output = %output.display(), rows = rows.len(), "HLS report written");

    Ok(rows.len())
}

/// Dump every media object of a collection as one JSON object keyed by id.
pub async fn export_collection_json(session: &Session, collection_id: &str, output: &Path) -> Result<usize> {
    let items = raw_collection_items(session, collection_id).await?;

    output::write_json(output, &items)?;
    info!(output = %output.display(), items = items.len(), "Collection exported");

    Ok(items.len())
}

/// Extract MP3 audio from the best derivative of every master file.
pub async fn download_best_files<E: Encoder>(
    session: &Session,
    collection_id: &str,
    output_dir: &Path,
    encoder: E,
) -> Result<ExtractionReport> {
    let items = collection_items(session, collection_id).await?;
    let plan = extraction_plan(&items, output_dir);

    for missing in &plan.missing {
        warn!(
            work_id = %missing.work_id,
            file_id = %missing.file_id,
            "No derivative to extract"
        );
    }

    let bar = progress::bar("Extracting audio", session.quiet);
    let extractor = AudioExtractor::new(encoder);
    let report = extractor
        .extract_all(&plan.targets, output_dir, |step| {
            progress::track_extraction(&bar, &step);
        })
        .await?;
    bar.finish_and_clear();

    info!(
        extracted = report.extracted.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "Audio extraction finished"
    );

    Ok(report)
}
