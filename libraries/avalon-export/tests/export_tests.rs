//! Export pipeline tests that do not need FFmpeg or WeasyPrint installed.

use avalon_client::{extraction_plan, CollectionItems, MediaObject, MetadataElements};
use avalon_export::{
    read_transcript, AudioExtractor, FfmpegEncoder, TranscriptDocument, DEFAULT_LANGUAGE,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to check if FFmpeg is available
async fn is_ffmpeg_available() -> bool {
    tokio::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
        .is_ok()
}

fn collection_items() -> CollectionItems {
    let object: MediaObject = serde_json::from_value(serde_json::json!({
        "id": "work1",
        "title": "Oral history",
        "files": [
            {
                "id": "mf1",
                "label": "Part 1",
                "files": [
                    { "label": "quality-medium", "hls_url": "http://127.0.0.1:9/medium.m3u8" },
                    { "label": "quality-low", "hls_url": "http://127.0.0.1:9/low.m3u8" }
                ]
            },
            { "id": "mf2", "label": "Part 2", "files": [] }
        ]
    }))
    .unwrap();

    let mut items = CollectionItems::new();
    items.insert(object.id.clone(), object);
    items
}

#[tokio::test]
async fn test_document_from_caption_file() {
    let temp_dir = TempDir::new().unwrap();
    let vtt = temp_dir.path().join("part2.vtt");
    std::fs::write(
        &vtt,
        "WEBVTT\nLanguage: eng\nFile Creator: Whisper\n\n00:00:00.000 --> 00:00:03.000\nWe started in 1972 & kept going.\n",
    )
    .unwrap();

    let lines = read_transcript(&vtt).await.unwrap().unwrap();
    assert_eq!(
        lines,
        vec!["00:00:00.000 --> 00:00:03.000", "We started in 1972 & kept going."]
    );

    let elements = MetadataElements(vec![(
        "Title".to_string(),
        "Interview with Linnea Glatt: Part 2".to_string(),
    )]);
    let html = TranscriptDocument::new(elements)
        .with_collection_title("DWG Project")
        .with_transcript(lines)
        .build_html("Interview with Linnea Glatt: Part 2", DEFAULT_LANGUAGE);

    assert!(html.contains("<p>We started in 1972 &amp; kept going.</p>"));
    assert!(!html.contains("Whisper"));
}

#[tokio::test]
async fn test_unreachable_stream_is_reported_not_fatal() {
    if !is_ffmpeg_available().await {
        eprintln!("Skipping test: FFmpeg not available");
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let plan = extraction_plan(&collection_items(), temp_dir.path());

    assert_eq!(plan.targets.len(), 1);
    assert!(plan.targets[0].source.ends_with("low.m3u8"));
    assert_eq!(plan.missing.len(), 1);

    let extractor = AudioExtractor::new(FfmpegEncoder::new(PathBuf::from("ffmpeg")));
    let report = extractor
        .extract_all(&plan.targets, temp_dir.path(), |_| {})
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(report.extracted.is_empty());
}

#[tokio::test]
async fn test_missing_ffmpeg_binary_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let plan = extraction_plan(&collection_items(), temp_dir.path());

    let extractor = AudioExtractor::new(FfmpegEncoder::new(PathBuf::from(
        "/nonexistent/bin/ffmpeg",
    )));
    let report = extractor
        .extract_all(&plan.targets, temp_dir.path(), |_| {})
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].reason.contains("/nonexistent/bin/ffmpeg"));
}
