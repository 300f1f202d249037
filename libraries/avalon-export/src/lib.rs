//! Avalon Export
//!
//! Local artifacts built from Avalon media objects:
//! transcript PDFs (metadata plus caption text, rendered with WeasyPrint)
//! and MP3 audio extracted from streaming derivatives with FFmpeg.

pub mod audio;
pub mod document;
pub mod error;
pub mod pdf;
pub mod transcript;

pub use audio::{
    AudioExtractor, Encoder, ExtractionProgress, ExtractionReport, FailedExtraction,
    FfmpegEncoder,
};
pub use document::{TranscriptDocument, DEFAULT_COLLECTION_TITLE, DEFAULT_INSTITUTION, DEFAULT_LANGUAGE};
pub use error::{ExportError, Result};
pub use pdf::PdfRenderer;
pub use transcript::{read_transcript, transcript_lines};
