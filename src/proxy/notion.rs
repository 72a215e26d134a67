//! Minimal Notion REST client: query the task database, create a page,
//! update a page's properties.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value, json};
use thiserror::Error;

use crate::models::{CreateTaskRequest, DUE_DATE_PROPERTY, STATUS_PROPERTY, TITLE_PROPERTY};

pub const NOTION_API_BASE: &str = "https://api.notion.com";
pub const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub token: String,
    pub database_id: String,
    /// Defaults to [`NOTION_API_BASE`].
    pub base_url: String,
}

impl NotionConfig {
    pub fn new(token: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            database_id: database_id.into(),
            base_url: NOTION_API_BASE.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("notion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notion answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid page id: {0:?}")]
    InvalidPageId(String),
}

/// Page IDs go into the URL path, so only letters, digits and dashes are
/// accepted; Notion's UUIDs fit that.
fn is_page_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Debug, Clone)]
pub struct NotionClient {
    http: Client,
    config: NotionConfig,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Returns the raw query answer (`{"results": [...], ...}`).
    pub async fn query_database(&self) -> Result<Value, NotionError> {
        let url = self.endpoint(&format!("databases/{}/query", self.config.database_id));
        self.send(self.http.post(url).json(&json!({}))).await
    }

    pub async fn create_page(&self, task: &CreateTaskRequest) -> Result<Value, NotionError> {
        let body = json!({
            "parent": { "database_id": self.config.database_id },
            "properties": page_properties(task),
        });
        self.send(self.http.post(self.endpoint("pages")).json(&body))
            .await
    }

    pub async fn update_page(&self, page_id: &str, properties: &Value) -> Result<Value, NotionError> {
        if !is_page_id(page_id) {
            return Err(NotionError::InvalidPageId(page_id.to_string()));
        }
        let url = self.endpoint(&format!("pages/{page_id}"));
        self.send(self.http.patch(url).json(&json!({ "properties": properties })))
            .await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, NotionError> {
        let response = request
            .bearer_auth(&self.config.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotionError::Status { status, body });
        }
        Ok(response.json().await?)
    }
}

/// Database properties of a new task page.
pub fn page_properties(task: &CreateTaskRequest) -> Value {
    json!({
        TITLE_PROPERTY: { "title": [{ "text": { "content": task.title } }] },
        STATUS_PROPERTY: { "select": { "name": task.status.as_str() } },
        DUE_DATE_PROPERTY: { "date": { "start": task.due_date } },
    })
}
