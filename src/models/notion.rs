//! Wire shapes of the `/api/notion` route and the mapper from raw Notion
//! pages to [`Task`].

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use super::{NewTask, Task, TaskStatus};

pub const TITLE_PROPERTY: &str = "Title";
pub const STATUS_PROPERTY: &str = "Status";
pub const DUE_DATE_PROPERTY: &str = "Due Date";

/// Body of `GET /api/notion`: the database query answer, relayed as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: PageProperties,
}

/// Only the three properties the task list reads. Any of them may be absent
/// or empty in a real database; [`Task::try_from`] decides what that means.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageProperties {
    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleProperty>,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SelectProperty>,
    #[serde(rename = "Due Date", default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateProperty>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleProperty {
    #[serde(default)]
    pub title: Vec<RichText>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RichText {
    pub plain_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectProperty {
    pub select: Option<SelectOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateProperty {
    pub date: Option<DateValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("page {page_id}: missing {property}")]
    MissingProperty {
        page_id: String,
        property: &'static str,
    },
    #[error("page {page_id}: unknown status {name:?}")]
    UnknownStatus { page_id: String, name: String },
}

impl TryFrom<Page> for Task {
    type Error = MappingError;

    fn try_from(page: Page) -> Result<Self, Self::Error> {
        let missing = |property| MappingError::MissingProperty {
            page_id: page.id.clone(),
            property,
        };
        let props = &page.properties;

        let title = props
            .title
            .as_ref()
            .and_then(|t| t.title.first())
            .map(|text| text.plain_text.clone())
            .ok_or_else(|| missing(TITLE_PROPERTY))?;

        let status_name = props
            .status
            .as_ref()
            .and_then(|s| s.select.as_ref())
            .map(|option| option.name.as_str())
            .ok_or_else(|| missing(STATUS_PROPERTY))?;
        let status = TaskStatus::from_label(status_name).ok_or_else(|| {
            MappingError::UnknownStatus {
                page_id: page.id.clone(),
                name: status_name.to_string(),
            }
        })?;

        let due_date = props
            .due_date
            .as_ref()
            .and_then(|d| d.date.as_ref())
            .map(|date| date.start.clone())
            .ok_or_else(|| missing(DUE_DATE_PROPERTY))?;

        Ok(Task {
            id: page.id,
            title,
            status,
            due_date,
        })
    }
}

/// Maps every page of a query answer. A single incomplete page fails the
/// whole batch so the list is never partially represented.
pub fn map_tasks(response: QueryResponse) -> Result<Vec<Task>, MappingError> {
    response.results.into_iter().map(Task::try_from).collect()
}

/// Body of `POST /api/notion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub due_date: String,
    pub status: TaskStatus,
}

impl From<&NewTask> for CreateTaskRequest {
    fn from(task: &NewTask) -> Self {
        Self {
            title: task.title.clone(),
            due_date: task.due_date_string(),
            status: TaskStatus::NotStarted,
        }
    }
}

/// Body of `PATCH /api/notion`. `properties` is forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub page_id: String,
    pub properties: Value,
}

impl UpdateTaskRequest {
    pub fn status(page_id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            page_id: page_id.into(),
            properties: json!({
                STATUS_PROPERTY: { "select": { "name": status.as_str() } }
            }),
        }
    }
}

/// Builds a page in the shape Notion returns it, for tests and fakes.
#[cfg(test)]
pub fn page_json(id: &str, title: &str, status: &str, due_date: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "properties": {
            TITLE_PROPERTY: {
                "id": "title",
                "type": "title",
                "title": [{ "type": "text", "text": { "content": title }, "plain_text": title }]
            },
            STATUS_PROPERTY: {
                "id": "status",
                "type": "select",
                "select": { "id": "opt", "name": status, "color": "default" }
            },
            DUE_DATE_PROPERTY: {
                "id": "due",
                "type": "date",
                "date": { "start": due_date, "end": null, "time_zone": null }
            }
        }
    })
}
