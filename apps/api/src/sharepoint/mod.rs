//! SharePoint document library access over Microsoft Graph.
//!
//! Every artifact lives under `{root_folder}/{document_id}/` in the site's
//! default drive. Each operation makes exactly one attempt.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

pub mod auth;
pub mod handlers;

use auth::{is_valid_jwt, TokenProvider};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid access token format")]
    InvalidCredential,

    #[error("Token request failed: {0}")]
    Token(String),

    #[error("{operation} failed (status {status}): {detail}")]
    Operation {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid JSON content: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// An entry in a drive folder listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub folder: Option<Value>,
    #[serde(rename = "webUrl", default)]
    pub web_url: Option<String>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    value: Vec<DriveItem>,
}

/// Remote artifact storage used by the proposal pipeline and the read endpoints.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a folder under the root. Name collisions are renamed by the store.
    async fn create_folder(&self, name: &str) -> Result<(), StoreError>;

    /// Writes `content` to `folder/file_name`, overwriting any existing file.
    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Reads `folder/file_name` and parses it as JSON.
    async fn read_json(&self, folder: &str, file_name: &str) -> Result<Value, StoreError>;

    /// Lists the entries directly under the root folder.
    async fn list_children(&self) -> Result<Vec<DriveItem>, StoreError>;

    /// Deletes a file or folder given its path relative to the root.
    async fn delete_item(&self, path: &str) -> Result<(), StoreError>;
}

pub struct SharePointClient {
    http: Client,
    drive_root: String,
    root_folder: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SharePointClient {
    pub fn new(
        http: Client,
        graph_base_url: &str,
        site_id: &str,
        root_folder: String,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            drive_root: format!(
                "{}/sites/{site_id}/drive/root:",
                graph_base_url.trim_end_matches('/')
            ),
            root_folder,
            tokens,
        }
    }

    /// Acquires a token and rejects it before any request if it is not a JWT.
    async fn bearer(&self) -> Result<String, StoreError> {
        let token = self.tokens.access_token().await?;
        if !is_valid_jwt(&token) {
            return Err(StoreError::InvalidCredential);
        }
        Ok(token)
    }

    fn children_url(&self) -> String {
        format!("{}/{}:/children", self.drive_root, self.root_folder)
    }

    fn item_url(&self, path: &str) -> String {
        format!("{}/{}/{path}", self.drive_root, self.root_folder)
    }

    fn content_url(&self, folder: &str, file_name: &str) -> String {
        format!(
            "{}/{}/{folder}/{file_name}:/content",
            self.drive_root, self.root_folder
        )
    }
}

async fn ensure_success(operation: &'static str, response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(StoreError::Operation {
        operation,
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl DocumentStore for SharePointClient {
    async fn create_folder(&self, name: &str) -> Result<(), StoreError> {
        let token = self.bearer().await?;

        let response = self
            .http
            .post(self.children_url())
            .bearer_auth(token)
            .json(&json!({
                "name": name,
                "folder": {},
                "@microsoft.graph.conflictBehavior": "rename",
            }))
            .send()
            .await?;
        ensure_success("create folder", response).await?;

        info!("Created SharePoint folder {name}");
        Ok(())
    }

    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let token = self.bearer().await?;

        let response = self
            .http
            .put(self.content_url(folder, file_name))
            .bearer_auth(token)
            .header(CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await?;
        ensure_success("upload file", response).await?;

        info!("Uploaded {folder}/{file_name} to SharePoint");
        Ok(())
    }

    async fn read_json(&self, folder: &str, file_name: &str) -> Result<Value, StoreError> {
        let token = self.bearer().await?;

        let response = self
            .http
            .get(self.content_url(folder, file_name))
            .bearer_auth(token)
            .send()
            .await?;
        let body = ensure_success("read file", response).await?.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }

    async fn list_children(&self) -> Result<Vec<DriveItem>, StoreError> {
        let token = self.bearer().await?;

        let response = self
            .http
            .get(self.children_url())
            .bearer_auth(token)
            .send()
            .await?;
        let listing: ChildrenResponse = ensure_success("list folder", response).await?.json().await?;

        Ok(listing.value)
    }

    async fn delete_item(&self, path: &str) -> Result<(), StoreError> {
        let token = self.bearer().await?;

        let response = self
            .http
            .delete(self.item_url(path))
            .bearer_auth(token)
            .send()
            .await?;
        ensure_success("delete item", response).await?;

        info!("Deleted SharePoint item {path}");
        Ok(())
    }
}
