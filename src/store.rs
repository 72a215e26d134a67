//! State container for the task screen.
//!
//! All mutation goes through [`TaskStore::dispatch`]. Dispatch never performs
//! I/O; it returns an [`Effect`] which the caller runs with [`execute`] and
//! whose outcome comes back as another [`Action`].

use crate::client::TaskClient;
use crate::models::{Draft, NewTask, Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadRequested,
    ListLoaded { generation: u64, tasks: Vec<Task> },
    ListFailed { generation: u64 },
    CreateRequested(NewTask),
    CreateCompleted,
    CreateFailed,
    StatusUpdateRequested { task_id: String, status: TaskStatus },
    StatusUpdateCompleted { task_id: String },
    StatusUpdateFailed { task_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch { generation: u64 },
    Create(NewTask),
    UpdateStatus { task_id: String, status: TaskStatus },
}

#[derive(Debug, Default)]
pub struct TaskStore {
    pub tasks: Vec<Task>,
    pub draft: Draft,
    pub loading: bool,
    /// Generation of the most recently issued fetch. Answers to older
    /// fetches are dropped.
    generation: u64,
    loaded_once: bool,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True until the first fetch has resolved, successfully or not.
    pub fn initial_load_pending(&self) -> bool {
        self.loading && !self.loaded_once
    }

    #[cfg(test)]
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn dispatch(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::LoadRequested => Some(self.begin_fetch()),
            Action::ListLoaded { generation, tasks } => {
                if !self.accept(generation) {
                    return None;
                }
                self.tasks = tasks;
                None
            }
            Action::ListFailed { generation } => {
                // Keep the stale list.
                self.accept(generation);
                None
            }
            Action::CreateRequested(new_task) => Some(Effect::Create(new_task)),
            Action::CreateCompleted => {
                self.draft.clear();
                Some(self.begin_fetch())
            }
            Action::CreateFailed => None,
            Action::StatusUpdateRequested { task_id, status } => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
                    task.status = status;
                }
                Some(Effect::UpdateStatus { task_id, status })
            }
            Action::StatusUpdateCompleted { .. } => Some(self.begin_fetch()),
            // The row keeps the attempted value until the next reload.
            Action::StatusUpdateFailed { .. } => None,
        }
    }

    fn begin_fetch(&mut self) -> Effect {
        self.generation += 1;
        self.loading = true;
        Effect::Fetch {
            generation: self.generation,
        }
    }

    fn accept(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                latest = self.generation,
                "dropping stale task list"
            );
            return false;
        }
        self.loading = false;
        self.loaded_once = true;
        true
    }
}

/// Runs an effect against the proxy route. Failures are logged here and
/// reported as failure actions; nothing propagates past this point.
pub async fn execute(client: &TaskClient, effect: Effect) -> Action {
    match effect {
        Effect::Fetch { generation } => match client.list_tasks().await {
            Ok(tasks) => Action::ListLoaded { generation, tasks },
            Err(e) => {
                tracing::error!(error = %e, "error fetching tasks");
                Action::ListFailed { generation }
            }
        },
        Effect::Create(new_task) => match client.create_task(&new_task).await {
            Ok(_) => Action::CreateCompleted,
            Err(e) => {
                tracing::error!(error = %e, title = %new_task.title, "error adding task");
                Action::CreateFailed
            }
        },
        Effect::UpdateStatus { task_id, status } => {
            match client.update_status(&task_id, status).await {
                Ok(_) => Action::StatusUpdateCompleted { task_id },
                Err(e) => {
                    tracing::error!(error = %e, task_id = %task_id, "error updating task");
                    Action::StatusUpdateFailed { task_id }
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeBackend;
    use super::*;
    use crate::models::page_json;
    use chrono::NaiveDate;

    fn task(id: &str, title: &str, status: TaskStatus) -> Task {
        Task {
            id: id.into(),
            title: title.into(),
            status,
            due_date: "2024-01-01".into(),
        }
    }

    fn buy_milk() -> NewTask {
        NewTask {
            title: "Buy milk".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    /// Dispatches `action` and executes follow-up effects one at a time until
    /// the store settles.
    async fn run_to_completion(store: &mut TaskStore, client: &TaskClient, action: Action) {
        let mut next = store.dispatch(action);
        while let Some(effect) = next {
            let outcome = execute(client, effect).await;
            next = store.dispatch(outcome);
        }
    }

    fn dead_client() -> TaskClient {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        TaskClient::new(&uri)
    }

    #[test]
    fn load_requested_sets_loading_and_issues_fetch() {
        let mut store = TaskStore::new();
        let effect = store.dispatch(Action::LoadRequested);
        assert_eq!(effect, Some(Effect::Fetch { generation: 1 }));
        assert!(store.loading);
        assert!(store.initial_load_pending());
    }

    #[test]
    fn list_loaded_replaces_tasks_and_clears_loading() {
        let mut store = TaskStore::new();
        store.dispatch(Action::LoadRequested);
        store.dispatch(Action::ListLoaded {
            generation: 1,
            tasks: vec![task("p1", "Buy milk", TaskStatus::NotStarted)],
        });
        assert!(!store.loading);
        assert!(!store.initial_load_pending());
        assert_eq!(store.tasks.len(), 1);
    }

    #[test]
    fn stale_list_does_not_overwrite_newer_request() {
        let mut store = TaskStore::new();
        store.dispatch(Action::LoadRequested);
        store.dispatch(Action::LoadRequested);

        store.dispatch(Action::ListLoaded {
            generation: 2,
            tasks: vec![task("p1", "New", TaskStatus::Completed)],
        });
        store.dispatch(Action::ListLoaded {
            generation: 1,
            tasks: vec![task("p1", "Old", TaskStatus::NotStarted)],
        });

        assert_eq!(store.tasks[0].title, "New");
        assert!(!store.loading);
    }

    #[test]
    fn stale_answer_keeps_loading_for_latest() {
        let mut store = TaskStore::new();
        store.dispatch(Action::LoadRequested);
        store.dispatch(Action::LoadRequested);
        store.dispatch(Action::ListLoaded {
            generation: 1,
            tasks: vec![],
        });
        assert!(store.loading);
    }

    #[test]
    fn list_failed_keeps_stale_list() {
        let mut store = TaskStore::new();
        store.dispatch(Action::LoadRequested);
        store.dispatch(Action::ListLoaded {
            generation: 1,
            tasks: vec![task("p1", "Buy milk", TaskStatus::NotStarted)],
        });
        store.dispatch(Action::LoadRequested);
        store.dispatch(Action::ListFailed { generation: 2 });

        assert!(!store.loading);
        assert_eq!(store.tasks.len(), 1);
    }

    #[test]
    fn create_completed_clears_draft_and_reloads() {
        let mut store = TaskStore::new();
        store.draft.title = "Buy milk".into();
        store.draft.due_date = "2024-01-01".into();

        let effect = store.dispatch(Action::CreateRequested(buy_milk()));
        assert_eq!(effect, Some(Effect::Create(buy_milk())));
        assert!(!store.draft.is_empty());

        let effect = store.dispatch(Action::CreateCompleted);
        assert!(store.draft.is_empty());
        assert!(matches!(effect, Some(Effect::Fetch { .. })));
    }

    #[test]
    fn create_failed_keeps_draft_and_does_not_reload() {
        let mut store = TaskStore::new();
        store.draft.title = "Buy milk".into();
        store.draft.due_date = "2024-01-01".into();
        store.dispatch(Action::CreateRequested(buy_milk()));

        assert_eq!(store.dispatch(Action::CreateFailed), None);
        assert_eq!(store.draft.title, "Buy milk");
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn status_update_patches_row_before_reload() {
        let mut store = TaskStore::new();
        store.tasks = vec![task("p1", "Buy milk", TaskStatus::NotStarted)];

        let effect = store.dispatch(Action::StatusUpdateRequested {
            task_id: "p1".into(),
            status: TaskStatus::Completed,
        });
        assert_eq!(store.task("p1").unwrap().status, TaskStatus::Completed);
        assert_eq!(
            effect,
            Some(Effect::UpdateStatus {
                task_id: "p1".into(),
                status: TaskStatus::Completed,
            })
        );

        let effect = store.dispatch(Action::StatusUpdateCompleted {
            task_id: "p1".into(),
        });
        assert!(matches!(effect, Some(Effect::Fetch { .. })));
    }

    #[test]
    fn status_update_failure_keeps_attempted_value() {
        let mut store = TaskStore::new();
        store.tasks = vec![task("p1", "Buy milk", TaskStatus::NotStarted)];
        store.dispatch(Action::StatusUpdateRequested {
            task_id: "p1".into(),
            status: TaskStatus::InProgress,
        });

        let effect = store.dispatch(Action::StatusUpdateFailed {
            task_id: "p1".into(),
        });
        assert_eq!(effect, None);
        assert_eq!(store.task("p1").unwrap().status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn fetch_failure_clears_loading_without_propagating() {
        let client = dead_client();
        let mut store = TaskStore::new();
        run_to_completion(&mut store, &client, Action::LoadRequested).await;

        assert!(!store.loading);
        assert!(store.tasks.is_empty());
    }

    #[tokio::test]
    async fn failed_create_leaves_draft_populated() {
        let client = dead_client();
        let mut store = TaskStore::new();
        store.draft.title = "Buy milk".into();
        store.draft.due_date = "2024-01-01".into();

        run_to_completion(&mut store, &client, Action::CreateRequested(buy_milk())).await;

        assert_eq!(store.draft.title, "Buy milk");
        assert_eq!(store.draft.due_date, "2024-01-01");
    }

    #[tokio::test]
    async fn created_task_appears_as_not_started() {
        let origin = FakeBackend::default().spawn().await;
        let client = TaskClient::new(&origin);
        let mut store = TaskStore::new();
        store.draft.title = "Buy milk".into();
        store.draft.due_date = "2024-01-01".into();

        run_to_completion(&mut store, &client, Action::CreateRequested(buy_milk())).await;

        assert!(store.draft.is_empty());
        assert!(!store.loading);
        let created = store.tasks.iter().find(|t| t.title == "Buy milk").unwrap();
        assert_eq!(created.status, TaskStatus::NotStarted);
        assert_eq!(created.due_date, "2024-01-01");
    }

    #[tokio::test]
    async fn completed_status_survives_reload() {
        let origin = FakeBackend::with_pages(vec![
            page_json("p1", "Buy milk", "Not Started", "2024-01-01"),
            page_json("p2", "Walk dog", "In Progress", "2024-01-02"),
        ])
        .spawn()
        .await;
        let client = TaskClient::new(&origin);
        let mut store = TaskStore::new();
        run_to_completion(&mut store, &client, Action::LoadRequested).await;

        run_to_completion(
            &mut store,
            &client,
            Action::StatusUpdateRequested {
                task_id: "p1".into(),
                status: TaskStatus::Completed,
            },
        )
        .await;

        assert_eq!(store.task("p1").unwrap().status, TaskStatus::Completed);
        assert_eq!(store.task("p2").unwrap().status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn reloading_unchanged_backend_is_idempotent() {
        let origin = FakeBackend::with_pages(vec![page_json(
            "p1",
            "Buy milk",
            "Not Started",
            "2024-01-01",
        )])
        .spawn()
        .await;
        let client = TaskClient::new(&origin);
        let mut store = TaskStore::new();

        run_to_completion(&mut store, &client, Action::LoadRequested).await;
        let first = store.tasks.clone();
        run_to_completion(&mut store, &client, Action::LoadRequested).await;

        assert_eq!(first, store.tasks);
    }
}
