//! Media object operations.

use crate::error::Result;
use crate::response::{self, require_id, API_KEY_HEADER};
use crate::types::{MediaObject, MetadataElements, OffsetUpdate};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

/// Separator used when flattening multi-valued fields.
const VALUE_SEPARATOR: &str = " | ";

/// Media object client for an Avalon instance.
pub struct MediaObjectClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    api_key: &'a str,
}

impl<'a> MediaObjectClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, api_key: &'a str) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// Get a media object.
    pub async fn get_object(&self, media_object_id: &str) -> Result<MediaObject> {
        let media_object_id = require_id(media_object_id, "media object")?;
        let url = self.object_url(media_object_id);
        debug!(url = %url, media_object_id = %media_object_id, "Fetching media object");

        let response =
            response::send(self.http.get(&url).header(API_KEY_HEADER, self.api_key)).await?;
        response::json(response, &format!("media object {}", media_object_id)).await
    }

    /// Get a media object exactly as the server returns it.
    pub async fn get_raw(&self, media_object_id: &str) -> Result<serde_json::Value> {
        let media_object_id = require_id(media_object_id, "media object")?;
        let url = self.object_url(media_object_id);
        debug!(url = %url, media_object_id = %media_object_id, "Fetching raw media object");

        let response =
            response::send(self.http.get(&url).header(API_KEY_HEADER, self.api_key)).await?;
        response::json(response, &format!("media object {}", media_object_id)).await
    }

    /// Fetch a media object and flatten it into export metadata.
    pub async fn metadata_elements(&self, media_object_id: &str) -> Result<MetadataElements> {
        let object = self.get_object(media_object_id).await?;
        Ok(metadata_elements(self.base_url, &object))
    }

    /// Set the thumbnail and poster offsets of a media object.
    ///
    /// The server answers some of these updates with a 5xx, so the raw
    /// status and body are returned instead of being mapped to an error.
    pub async fn update_offsets(&self, media_object_id: &str, offset: u64) -> Result<OffsetUpdate> {
        let media_object_id = require_id(media_object_id, "media object")?;
        let url = self.object_url(media_object_id);
        debug!(url = %url, media_object_id = %media_object_id, offset, "Updating offsets");

        let response = response::send(
            self.http
                .put(&url)
                .header(API_KEY_HEADER, self.api_key)
                .json(&json!({
                    "thumbnail_offset": offset,
                    "poster_offset": offset,
                })),
        )
        .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if (200..300).contains(&status) {
            info!(media_object_id = %media_object_id, offset, "Offsets updated");
        } else {
            warn!(media_object_id = %media_object_id, status, "Offset update rejected");
        }

        Ok(OffsetUpdate { status, body })
    }

    fn object_url(&self, media_object_id: &str) -> String {
        format!("{}/media_objects/{}.json", self.base_url, media_object_id)
    }
}

/// Flatten a media object into the labelled values used for exports.
pub fn metadata_elements(base_url: &str, object: &MediaObject) -> MetadataElements {
    MetadataElements(vec![
        ("Title".to_string(), object.title.clone()),
        (
            "Collection".to_string(),
            object.collection.clone().unwrap_or_default(),
        ),
        (
            "Contributors".to_string(),
            object.main_contributors.join(VALUE_SEPARATOR),
        ),
        (
            "Link to resource".to_string(),
            format!("{}/media_objects/{}", base_url, object.id),
        ),
        (
            "Publisher".to_string(),
            object.fields.publisher.join(VALUE_SEPARATOR),
        ),
        (
            "Subjects".to_string(),
            object.fields.subject.join(VALUE_SEPARATOR),
        ),
        (
            "Rights information".to_string(),
            object.fields.terms_of_use.clone().unwrap_or_default(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_elements_order_and_joins() {
        let object: MediaObject = serde_json::from_value(json!({
            "id": "n583xv11k",
            "title": "Interview with Linnea Glatt: Part 2",
            "collection": "DWG Project",
            "main_contributors": ["Glatt, Linnea", "Smith, Jo"],
            "fields": {
                "publisher": ["Art This Week Productions"],
                "subject": ["Art", "Sculpture"],
                "terms_of_use": "Educational use only"
            }
        }))
        .unwrap();

        let elements = metadata_elements("https://avalon.example.edu", &object);
        let labels: Vec<&str> = elements.iter().map(|(k, _)| k).collect();

        assert_eq!(
            labels,
            vec![
                "Title",
                "Collection",
                "Contributors",
                "Link to resource",
                "Publisher",
                "Subjects",
                "Rights information"
            ]
        );
        assert_eq!(elements.get("Contributors"), Some("Glatt, Linnea | Smith, Jo"));
        assert_eq!(elements.get("Subjects"), Some("Art | Sculpture"));
        assert_eq!(
            elements.get("Link to resource"),
            Some("https://avalon.example.edu/media_objects/n583xv11k")
        );
    }

    #[test]
    fn test_metadata_elements_missing_fields_are_empty() {
        let object: MediaObject = serde_json::from_value(json!({ "id": "abc" })).unwrap();
        let elements = metadata_elements("https://avalon.example.edu", &object);

        assert_eq!(elements.len(), 7);
        assert_eq!(elements.get("Publisher"), Some(""));
        assert_eq!(elements.get("Rights information"), Some(""));
    }
}
