//! Collection operations.

use crate::error::{AvalonClientError, Result};
use crate::response::{self, require_id, API_KEY_HEADER};
use crate::types::{Collection, CollectionItems, PageProgress, PageRequest, RawCollectionItems};
use indexmap::IndexMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

/// Page size used by [`CollectionClient::page_items`] callers that have no preference.
pub const DEFAULT_ITEMS_PER_PAGE: u64 = 10;

/// Collection client for an Avalon instance.
pub struct CollectionClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    api_key: &'a str,
}

impl<'a> CollectionClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, api_key: &'a str) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// List every collection in the repository.
    pub async fn get_all_collections(&self) -> Result<Vec<Collection>> {
        let url = format!("{}/admin/collections.json", self.base_url);
        debug!(url = %url, "Fetching all collections");

        let response =
            response::send(self.http.get(&url).header(API_KEY_HEADER, self.api_key)).await?;
        let collections: Vec<Collection> = response::json(response, "collections").await?;

        debug!(collections = collections.len(), "Fetched collections");
        Ok(collections)
    }

    /// Get a single collection.
    pub async fn get_collection(&self, collection_id: &str) -> Result<Collection> {
        let collection_id = require_id(collection_id, "collection")?;
        let url = format!("{}/admin/collections/{}.json", self.base_url, collection_id);
        debug!(url = %url, collection_id = %collection_id, "Fetching collection");

        let response =
            response::send(self.http.get(&url).header(API_KEY_HEADER, self.api_key)).await?;
        response::json(response, &format!("collection {}", collection_id)).await
    }

    /// Get the media objects of a collection.
    ///
    /// Without a page request the server decides how many items to return;
    /// [`PageRequest::page`] asks for a page of [`DEFAULT_PAGE_SIZE`](crate::DEFAULT_PAGE_SIZE) items.
    pub async fn get_items(
        &self,
        collection_id: &str,
        page: Option<PageRequest>,
    ) -> Result<CollectionItems> {
        self.fetch_items(collection_id, page).await
    }

    /// Get only the media object ids of a collection page.
    pub async fn get_item_ids(
        &self,
        collection_id: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<String>> {
        let items: RawCollectionItems = self.fetch_items(collection_id, page).await?;
        Ok(items.into_keys().collect())
    }

    /// Page through a collection until every media object has been fetched.
    ///
    /// The number of pages comes from the collection's `object_count.total`.
    /// Items are merged in page order; an id listed again on a later page
    /// keeps its first position and takes the later value.
    pub async fn page_items<F>(
        &self,
        collection_id: &str,
        per_page: u64,
        progress_callback: F,
    ) -> Result<CollectionItems>
    where
        F: FnMut(PageProgress),
    {
        self.page_all(collection_id, per_page, progress_callback).await
    }

    /// Like [`page_items`](Self::page_items), but keeps each media object as
    /// the JSON the server returned.
    pub async fn page_items_raw<F>(
        &self,
        collection_id: &str,
        per_page: u64,
        progress_callback: F,
    ) -> Result<RawCollectionItems>
    where
        F: FnMut(PageProgress),
    {
        self.page_all(collection_id, per_page, progress_callback).await
    }

    async fn page_all<T, F>(
        &self,
        collection_id: &str,
        per_page: u64,
        mut progress_callback: F,
    ) -> Result<IndexMap<String, T>>
    where
        T: DeserializeOwned,
        F: FnMut(PageProgress),
    {
        if per_page == 0 {
            return Err(AvalonClientError::InvalidArgument(
                "items per page must be at least 1".into(),
            ));
        }

        let collection = self.get_collection(collection_id).await?;
        let total = collection.object_count.total;
        let total_pages = page_count(total, per_page);

        debug!(
            collection_id = %collection_id,
            total_items = total,
            total_pages,
            per_page,
            "Paging collection items"
        );

        let mut all_items = IndexMap::new();

        for page in 1..=total_pages {
            let new_items: IndexMap<String, T> = self
                .fetch_items(collection_id, Some(PageRequest::new(page, per_page)))
                .await?;
            all_items.extend(new_items);

            progress_callback(PageProgress {
                page,
                total_pages,
                items_so_far: all_items.len(),
            });
        }

        info!(
            collection_id = %collection_id,
            items = all_items.len(),
            pages = total_pages,
            "Fetched collection items"
        );

        Ok(all_items)
    }

    async fn fetch_items<T: DeserializeOwned>(
        &self,
        collection_id: &str,
        page: Option<PageRequest>,
    ) -> Result<IndexMap<String, T>> {
        let collection_id = require_id(collection_id, "collection")?;
        let url = self.items_url(collection_id, page)?;
        debug!(url = %url, collection_id = %collection_id, "Fetching collection items");

        let response =
            response::send(self.http.get(url).header(API_KEY_HEADER, self.api_key)).await?;
        response::json(response, &format!("items of collection {}", collection_id)).await
    }

    fn items_url(&self, collection_id: &str, page: Option<PageRequest>) -> Result<Url> {
        let raw = format!(
            "{}/admin/collections/{}/items.json",
            self.base_url, collection_id
        );
        let mut url = Url::parse(&raw).map_err(|e| AvalonClientError::InvalidUrl(e.to_string()))?;

        if let Some(page) = page {
            url.query_pairs_mut()
                .append_pair("per_page", &page.per_page.to_string())
                .append_pair("page", &page.page.to_string());
        }

        Ok(url)
    }
}

/// Number of pages needed to cover `total` items.
pub fn page_count(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_PAGE_SIZE;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(25, 5), 5);
        assert_eq!(page_count(3, 0), 0);
    }

    #[test]
    fn test_default_page_request() {
        assert_eq!(PageRequest::page(2), PageRequest::new(2, DEFAULT_PAGE_SIZE));
        assert_eq!(PageRequest::default(), PageRequest::new(1, 5));
    }

    #[test]
    fn test_items_url_query_order() {
        let http = Client::new();
        let client = CollectionClient::new(&http, "https://avalon.example.edu", "key");

        let url = client
            .items_url("4b29b610g", Some(PageRequest::new(3, 10)))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://avalon.example.edu/admin/collections/4b29b610g/items.json?per_page=10&page=3"
        );

        let url = client.items_url("4b29b610g", None).unwrap();
        assert_eq!(url.query(), None);
    }
}
