//! HTTP client of the `/api/notion` proxy route.

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::models::{
    CreateTaskRequest, MappingError, NewTask, QueryResponse, Task, TaskStatus, UpdateTaskRequest,
    map_tasks,
};

pub const API_PATH: &str = "/api/notion";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

#[derive(Debug, Clone)]
pub struct TaskClient {
    http: Client,
    url: String,
}

impl TaskClient {
    /// `base_url` is the proxy's origin, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            url: format!("{}{API_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the whole collection and maps it to [`Task`]s.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|source| self.transport(source))?;
        let status = response.status();
        let body: QueryResponse = response.json().await.map_err(ApiError::Decode)?;
        let tasks = map_tasks(body)?;
        tracing::debug!(%status, count = tasks.len(), "tasks fetched");
        Ok(tasks)
    }

    /// Creates a task with status "Not Started". Only transport failures are
    /// errors; a non-success answer is logged and otherwise ignored.
    pub async fn create_task(&self, task: &NewTask) -> Result<StatusCode, ApiError> {
        let body = CreateTaskRequest::from(task);
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|source| self.transport(source))?;
        Ok(log_answer(response.status(), "create task"))
    }

    /// Sends a partial update carrying only the new status.
    pub async fn update_status(
        &self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<StatusCode, ApiError> {
        let body = UpdateTaskRequest::status(task_id, status);
        let response = self
            .http
            .patch(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|source| self.transport(source))?;
        Ok(log_answer(response.status(), "update task status"))
    }

    fn transport(&self, source: reqwest::Error) -> ApiError {
        ApiError::Transport {
            url: self.url.clone(),
            source,
        }
    }
}

fn log_answer(status: StatusCode, operation: &str) -> StatusCode {
    if !status.is_success() {
        tracing::warn!(%status, operation, "service answered with an error status");
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::page_json;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn buy_milk() -> NewTask {
        NewTask {
            title: "Buy milk".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn list_tasks_maps_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    page_json("p1", "Buy milk", "Not Started", "2024-01-01"),
                    page_json("p2", "Ship it", "Completed", "2024-03-01"),
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TaskClient::new(&server.uri());
        let tasks = client.list_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[1].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn list_tasks_twice_is_identical() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [page_json("p1", "Buy milk", "In Progress", "2024-01-01")]
            })))
            .mount(&server)
            .await;

        let client = TaskClient::new(&server.uri());
        let first = client.list_tasks().await.unwrap();
        let second = client.list_tasks().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn list_tasks_reports_shape_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "id": "p1", "properties": {} }]
            })))
            .mount(&server)
            .await;

        let err = TaskClient::new(&server.uri()).list_tasks().await.unwrap_err();
        assert!(matches!(err, ApiError::Mapping(_)));
    }

    #[tokio::test]
    async fn list_tasks_without_results_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = TaskClient::new(&server.uri()).list_tasks().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn create_task_posts_draft_with_not_started() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .and(body_json(json!({
                "title": "Buy milk",
                "dueDate": "2024-01-01",
                "status": "Not Started"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "p9" })))
            .expect(1)
            .mount(&server)
            .await;

        let status = TaskClient::new(&server.uri())
            .create_task(&buy_milk())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn create_task_error_status_is_not_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let status = TaskClient::new(&server.uri())
            .create_task(&buy_milk())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn update_status_patches_status_select() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(API_PATH))
            .and(body_json(json!({
                "pageId": "p1",
                "properties": { "Status": { "select": { "name": "Completed" } } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        TaskClient::new(&server.uri())
            .update_status("p1", TaskStatus::Completed)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = TaskClient::new(&uri).list_tasks().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }

    #[test]
    fn url_joins_base_and_route() {
        assert_eq!(
            TaskClient::new("http://localhost:3000/").url(),
            "http://localhost:3000/api/notion"
        );
    }
}
