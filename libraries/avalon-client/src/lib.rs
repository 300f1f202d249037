//! Avalon Client
//!
//! HTTP client library for the Avalon Media System REST API.
//!
//! # Features
//!
//! - **Collections**: List collections, page through their media objects
//! - **Media objects**: Fetch metadata, flatten it for exports, update offsets
//! - **Supplemental files**: Upload PDFs, captions and transcripts to master files
//! - **Derivatives**: Pick the best derivative of each master file
//!
//! # Example
//!
//! ```ignore
//! use avalon_client::{AvalonClient, ClientConfig, Instance};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::for_instance(Instance::Prod, std::env::var("AVALON_PROD")?);
//!     let client = AvalonClient::new(config)?;
//!
//!     let items = client.collections().page_items("4b29b610g", 10, |_| {}).await?;
//!     for row in avalon_client::hls_rows(&items) {
//!         println!("{} {} {}", row.parent_work, row.file_id, row.hls_path);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod collections;
mod derivatives;
mod error;
mod media_objects;
mod response;
mod supplemental;
mod types;
mod vtt;

// Re-export main types
pub use client::AvalonClient;
pub use error::{AvalonClientError, Result};
pub use types::{
    ClientConfig, Collection, CollectionItems, Derivative, DescriptiveFields, Instance,
    MasterFile, MediaObject, MetadataElements, ObjectCount, OffsetUpdate, PageProgress,
    PageRequest, RawCollectionItems, SupplementalFile, SupplementalKind, SupplementalMetadata,
    UploadOutcome, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS,
};

// Re-export sub-clients for direct use if needed
pub use collections::{page_count, CollectionClient, DEFAULT_ITEMS_PER_PAGE};
pub use media_objects::{metadata_elements, MediaObjectClient};
pub use supplemental::{caption_mime_type, SupplementalFileClient};

pub use derivatives::{
    extraction_plan, file_id_rows, hls_rows, output_path, select_best_derivative,
    ExtractionPlan, ExtractionTarget, FileIdRow, HlsRow, MissingDerivative,
};
pub use vtt::{is_valid_vtt, validate_vtt, VttError};
