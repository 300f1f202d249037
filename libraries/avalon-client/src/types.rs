//! Types for Avalon API requests and responses.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// An Avalon deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instance {
    Prod,
    #[default]
    Pre,
}

impl Instance {
    /// Resolve an instance name. Anything other than `prod` is pre-production.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("prod") {
            Instance::Prod
        } else {
            Instance::Pre
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Instance::Prod => "prod",
            Instance::Pre => "pre",
        }
    }

    pub fn default_url(&self) -> &'static str {
        match self {
            Instance::Prod => "https://avalon.library.tamu.edu",
            Instance::Pre => "https://avalon-pre.library.tamu.edu",
        }
    }

    /// Environment variable holding the API key for this instance.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Instance::Prod => "AVALON_PROD",
            Instance::Pre => "AVALON_PRE",
        }
    }
}

impl FromStr for Instance {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Instance::from_name(s))
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for connecting to an Avalon instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the instance (e.g., "https://avalon.example.edu")
    pub url: String,
    /// Value sent in the `Avalon-Api-Key` header
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Config pointing at the well-known URL of an instance.
    pub fn for_instance(instance: Instance, api_key: impl Into<String>) -> Self {
        Self::new(instance.default_url(), api_key)
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

// =============================================================================
// Collection Types
// =============================================================================

/// Item counts reported for a collection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObjectCount {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unpublished: u64,
}

/// A collection as returned by `/admin/collections`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Collection {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub object_count: ObjectCount,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Page size of a [`PageRequest`] built without an explicit size.
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// Page selection for collection item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Page `page` at [`DEFAULT_PAGE_SIZE`] items.
    pub fn page(page: u64) -> Self {
        Self::new(page, DEFAULT_PAGE_SIZE)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::page(1)
    }
}

/// Media objects of a collection keyed by id, in server order.
pub type CollectionItems = IndexMap<String, MediaObject>;

/// Collection items exactly as the server sent them, in server order.
pub type RawCollectionItems = IndexMap<String, serde_json::Value>;

/// Progress information while paging through a collection.
#[derive(Debug, Clone)]
pub struct PageProgress {
    pub page: u64,
    pub total_pages: u64,
    pub items_so_far: usize,
}

// =============================================================================
// Media Object Types
// =============================================================================

/// Descriptive metadata fields of a media object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DescriptiveFields {
    #[serde(default, deserialize_with = "null_as_default")]
    pub publisher: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: Vec<String>,
    #[serde(default)]
    pub terms_of_use: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A media object (a "title" or "work").
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaObject {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_contributors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: DescriptiveFields,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<MasterFile>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A master file (section) of a media object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MasterFile {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<Derivative>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An encoded rendition of a master file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Derivative {
    #[serde(default, deserialize_with = "string_or_number_opt")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub hls_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_number_opt")]
    pub duration: Option<String>,
    #[serde(default, rename = "derivativeFile")]
    pub derivative_file: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Derivative {
    /// File name of the original derivative (last path segment).
    pub fn original_file_name(&self) -> Option<&str> {
        self.derivative_file
            .as_deref()
            .and_then(|path| path.rsplit('/').next())
    }
}

/// Ordered `(label, value)` pairs describing a media object for export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataElements(pub Vec<(String, String)>);

impl MetadataElements {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of a media object offset update.
#[derive(Debug, Clone)]
pub struct OffsetUpdate {
    pub status: u16,
    pub body: String,
}

// =============================================================================
// Supplemental File Types
// =============================================================================

/// A supplemental file attached to a master file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupplementalFile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub treat_as_transcript: Option<bool>,
    #[serde(default)]
    pub machine_generated: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Supplemental file classification for captions and transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplementalKind {
    Caption,
    Transcript,
}

impl SupplementalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplementalKind::Caption => "caption",
            SupplementalKind::Transcript => "transcript",
        }
    }
}

/// Metadata sent when creating or updating a supplemental file.
///
/// Unset fields are omitted from the JSON body so a `PUT` only touches
/// what the caller supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementalMetadata {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SupplementalKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treat_as_transcript: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_generated: Option<bool>,
}

impl SupplementalMetadata {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Metadata for a machine-generated English caption or transcript.
    pub fn captions(kind: SupplementalKind, label: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            label: Some(label.into()),
            language: Some("English".to_string()),
            treat_as_transcript: match kind {
                SupplementalKind::Caption => Some(true),
                SupplementalKind::Transcript => None,
            },
            machine_generated: Some(true),
        }
    }
}

/// Response from the supplemental file creation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// Result of a completed two-step supplemental upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Id assigned by the server
    pub id: String,
    /// Metadata applied after creation
    pub metadata: SupplementalMetadata,
}

// =============================================================================
// Helpers
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn string_or_number_opt<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_instance_from_name() {
        assert_eq!(Instance::from_name("prod"), Instance::Prod);
        assert_eq!(Instance::from_name("PROD"), Instance::Prod);
        assert_eq!(Instance::from_name("pre"), Instance::Pre);
        assert_eq!(Instance::from_name("staging"), Instance::Pre);
        assert_eq!(Instance::Prod.api_key_env(), "AVALON_PROD");
        assert_eq!(
            Instance::Pre.default_url(),
            "https://avalon-pre.library.tamu.edu"
        );
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let object: MediaObject = serde_json::from_value(json!({
            "id": "w2",
            "title": null,
            "main_contributors": null,
            "fields": { "publisher": null, "subject": ["Art"] },
            "files": [
                { "id": "mf1", "label": null, "files": [{ "label": null }] }
            ]
        }))
        .unwrap();

        assert_eq!(object.title, "");
        assert!(object.main_contributors.is_empty());
        assert!(object.fields.publisher.is_empty());
        assert_eq!(object.fields.subject, vec!["Art"]);
        assert_eq!(object.files[0].label, "");
        assert_eq!(object.files[0].files[0].label, "");

        let object: MediaObject =
            serde_json::from_value(json!({ "id": "w3", "fields": null, "files": null })).unwrap();
        assert!(object.files.is_empty());

        let collection: Collection =
            serde_json::from_value(json!({ "id": "c1", "name": null, "object_count": null }))
                .unwrap();
        assert_eq!(collection.object_count.total, 0);
    }

    #[test]
    fn test_derivative_accepts_numeric_duration() {
        let derivative: Derivative = serde_json::from_value(json!({
            "id": 7,
            "label": "quality-low",
            "duration": 61234,
            "derivativeFile": "file:///srv/derivatives/abc/low.mp4"
        }))
        .unwrap();

        assert_eq!(derivative.id.as_deref(), Some("7"));
        assert_eq!(derivative.duration.as_deref(), Some("61234"));
        assert_eq!(derivative.original_file_name(), Some("low.mp4"));
    }

    #[test]
    fn test_caption_metadata_json() {
        let meta = SupplementalMetadata::captions(SupplementalKind::Caption, "Captions");
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            json!({
                "type": "caption",
                "label": "Captions",
                "language": "English",
                "treat_as_transcript": true,
                "machine_generated": true
            })
        );

        let meta = SupplementalMetadata::captions(SupplementalKind::Transcript, "Transcript");
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["type"], "transcript");
        assert!(value.get("treat_as_transcript").is_none());
    }

    #[test]
    fn test_label_only_metadata() {
        let meta = SupplementalMetadata::label("Part 1: PDF Transcript");
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            json!({ "label": "Part 1: PDF Transcript" })
        );
    }

    #[test]
    fn test_media_object_preserves_unknown_fields() {
        let object: MediaObject = serde_json::from_value(json!({
            "id": "n583xv11k",
            "title": "Oral history",
            "published": true,
            "fields": { "publisher": ["TAMU"], "genre": ["Interviews"] }
        }))
        .unwrap();

        assert_eq!(object.extra["published"], json!(true));
        assert_eq!(object.fields.publisher, vec!["TAMU"]);
        assert!(object.fields.extra.contains_key("genre"));
        assert!(object.files.is_empty());
    }
}
