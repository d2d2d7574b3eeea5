//! Blocking GraphQL client for a StashApp server.
//!
//! Every query aliases its root field to `page` and its list field to
//! `items`, so tags and performers decode through the same response types.

use super::{Catalog, CatalogItem, Category, Scene};
use crate::error::Error;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const FAVOURITE_TAGS: &str = r#"
query FindTags {
    page: findTags(filter: { per_page: -1 }) {
        items: tags { id name favorite }
    }
}"#;

const FAVOURITE_PERFORMERS: &str = r#"
query FindPerformers {
    page: findPerformers(filter: { per_page: -1 }) {
        items: performers { id name favorite }
    }
}"#;

const TAG_BY_NAME: &str = r#"
query FindTags($name: String!) {
    page: findTags(
        tag_filter: { name: { value: $name, modifier: EQUALS } }
        filter: { per_page: 1 }
    ) {
        items: tags { id name }
    }
}"#;

const PERFORMER_BY_NAME: &str = r#"
query FindPerformers($name: String!) {
    page: findPerformers(
        performer_filter: { name: { value: $name, modifier: EQUALS } }
        filter: { per_page: 1 }
    ) {
        items: performers { id name }
    }
}"#;

const SCENES_BY_TAG: &str = r#"
query FindScenes($id: ID!) {
    page: findScenes(
        scene_filter: { tags: { value: [$id], modifier: INCLUDES } }
        filter: { per_page: -1 }
    ) {
        items: scenes { id title files { path basename } }
    }
}"#;

const SCENES_BY_PERFORMER: &str = r#"
query FindScenes($id: ID!) {
    page: findScenes(
        scene_filter: { performers: { value: [$id], modifier: INCLUDES } }
        filter: { per_page: -1 }
    ) {
        items: scenes { id title files { path basename } }
    }
}"#;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PageData<T> {
    page: Page<T>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: String,
    name: String,
    #[serde(default)]
    favorite: bool,
}

impl From<RawItem> for CatalogItem {
    fn from(raw: RawItem) -> Self {
        CatalogItem {
            id: raw.id,
            name: raw.name,
        }
    }
}

pub struct StashClient {
    client: Client,
    url: String,
}

impl StashClient {
    pub fn new(url: &str, api_key: Option<&str>) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| Error::InvalidConfig("api_key contains invalid characters".into()))?;
            headers.insert("ApiKey", value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    fn execute<T: DeserializeOwned>(&self, query: &str, variables: Option<Value>) -> Result<T, Error> {
        let request = GraphQlRequest { query, variables };
        let body = self
            .client
            .post(&self.url)
            .json(&request)
            .send()?
            .error_for_status()?
            .text()?;
        decode(&body)
    }

    fn fetch_items<T: DeserializeOwned>(&self, query: &str, variables: Option<Value>) -> Result<Vec<T>, Error> {
        let data: PageData<T> = self.execute(query, variables)?;
        Ok(data.page.items)
    }
}

/// Decodes a GraphQL response body, turning reported errors into
/// [`Error::Catalog`].
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let response: GraphQlResponse<T> = serde_json::from_str(body)
        .map_err(|e| Error::Catalog(format!("malformed response: {}", e)))?;

    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(Error::Catalog(format!("GraphQL errors: {}", messages.join("; "))));
    }

    response
        .data
        .ok_or_else(|| Error::Catalog("response contained no data".into()))
}

impl Catalog for StashClient {
    fn list_favourites(&self, category: Category) -> Result<Vec<CatalogItem>, Error> {
        let query = match category {
            Category::Tag => FAVOURITE_TAGS,
            Category::Performer => FAVOURITE_PERFORMERS,
        };
        let items: Vec<RawItem> = self.fetch_items(query, None)?;
        let favourites: Vec<CatalogItem> = items
            .into_iter()
            .filter(|item| item.favorite)
            .map(CatalogItem::from)
            .collect();
        debug!("{} favourite {}s in catalog", favourites.len(), category);
        Ok(favourites)
    }

    fn find_by_name(&self, category: Category, name: &str) -> Result<Option<CatalogItem>, Error> {
        let query = match category {
            Category::Tag => TAG_BY_NAME,
            Category::Performer => PERFORMER_BY_NAME,
        };
        let items: Vec<RawItem> = self.fetch_items(query, Some(json!({ "name": name })))?;
        Ok(items.into_iter().next().map(CatalogItem::from))
    }

    fn list_scenes(&self, category: Category, id: &str) -> Result<Vec<Scene>, Error> {
        let query = match category {
            Category::Tag => SCENES_BY_TAG,
            Category::Performer => SCENES_BY_PERFORMER,
        };
        let scenes: Vec<Scene> = self.fetch_items(query, Some(json!({ "id": id })))?;
        debug!("{} scenes for {} {}", scenes.len(), category, id);
        Ok(scenes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_decode_scene_page() {
        let body = r#"{
            "data": {
                "page": {
                    "items": [
                        {"id": "1", "title": "First", "files": [{"path": "/media/a.mp4", "basename": "a.mp4"}]},
                        {"id": "2", "title": null, "files": []}
                    ]
                }
            }
        }"#;
        let data: PageData<Scene> = decode(body).unwrap();
        assert_eq!(data.page.items.len(), 2);
        assert_eq!(data.page.items[0].source_path(), Some(Path::new("/media/a.mp4")));
        assert!(data.page.items[1].title.is_none());
    }

    #[test]
    fn test_decode_reports_graphql_errors() {
        let body = r#"{"data": null, "errors": [{"message": "not authorized"}]}"#;
        let err = decode::<PageData<RawItem>>(body).unwrap_err();
        match err {
            Error::Catalog(msg) => assert!(msg.contains("not authorized")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode::<PageData<RawItem>>("<html>"), Err(Error::Catalog(_))));
    }

    #[test]
    fn test_favourite_flag_defaults_to_false() {
        let body = r#"{"data": {"page": {"items": [{"id": "3", "name": "Outdoor"}]}}}"#;
        let data: PageData<RawItem> = decode(body).unwrap();
        assert!(!data.page.items[0].favorite);
    }

    #[test]
    fn test_rejects_unprintable_api_key() {
        let result = StashClient::new("http://localhost:9999/graphql", Some("bad\nkey"));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
