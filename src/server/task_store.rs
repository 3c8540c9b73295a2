//! Task store — in-memory mapping from task id to task, with TTL
//! cleanup and basic pagination.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{A2AError, A2AResult};
use crate::types::{Task, TaskState, TaskStatus};

/// Parameters for listing tasks with optional filtering and pagination.
#[derive(Debug, Clone, Default)]
pub struct TaskListParams {
    pub context_id: Option<String>,
    pub status: Option<Vec<TaskState>>,
    pub page_size: Option<usize>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub next_page_token: Option<String>,
}

/// Trait for persisting and retrieving A2A tasks. Implementations must be
/// `Send + Sync`; all methods take `&self` and rely on interior mutability.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Creates a fresh task in the `submitted` state with a generated id.
    async fn create(&self, context_id: Option<String>) -> Task;

    async fn get(&self, task_id: &str) -> A2AResult<Option<Task>>;

    /// Overwrites the stored task. Bumps `updated_at` to now. Rejects the
    /// update when the currently-stored task is already terminal: once
    /// terminal, a task's state never changes again.
    async fn update(&self, task: Task) -> A2AResult<()>;

    /// Silently succeeds if the task does not exist.
    async fn delete(&self, task_id: &str) -> A2AResult<()>;

    async fn list(&self, params: &TaskListParams) -> A2AResult<TaskListResponse>;

    async fn count(&self) -> usize;

    /// Deletes every terminal task whose `updated_at` is older than
    /// `max_age`. Returns the number of tasks removed.
    async fn cleanup(&self, max_age: Duration) -> usize;
}

/// In-memory task store backed by a `HashMap`. All data is lost when the
/// process exits — persistence across restarts is a declared Non-goal.
#[derive(Debug)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
    insertion_order: Arc<RwLock<Vec<String>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            insertion_order: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, context_id: Option<String>) -> Task {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            context_id,
            status: TaskStatus::new(TaskState::Submitted),
            messages: vec![],
            artifacts: vec![],
            metadata: None,
            created_at: now,
            updated_at: now,
        };

        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id.clone(), task.clone());
        let mut order = self.insertion_order.write().await;
        order.push(task.id.clone());

        debug!(task_id = %task.id, "task created");
        task
    }

    async fn get(&self, task_id: &str) -> A2AResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        let task = tasks.get(task_id).cloned();
        debug!(task_id = %task_id, found = task.is_some(), "task lookup");
        Ok(task)
    }

    async fn update(&self, mut task: Task) -> A2AResult<()> {
        let mut tasks = self.tasks.write().await;
        if let Some(existing) = tasks.get(&task.id) {
            if existing.status.state.is_terminal() {
                return Err(A2AError::invalid_request(format!(
                    "task {} is already in a terminal state and cannot be updated",
                    task.id
                )));
            }
        }
        task.updated_at = Utc::now();
        let is_new = !tasks.contains_key(&task.id);
        let task_id = task.id.clone();
        tasks.insert(task_id.clone(), task);

        if is_new {
            let mut order = self.insertion_order.write().await;
            order.push(task_id.clone());
        }
        debug!(task_id = %task_id, "task updated");
        Ok(())
    }

    async fn delete(&self, task_id: &str) -> A2AResult<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.remove(task_id).is_some() {
            let mut order = self.insertion_order.write().await;
            order.retain(|id| id != task_id);
            debug!(task_id = %task_id, "task deleted");
        } else {
            warn!(task_id = %task_id, "attempted to delete non-existent task");
        }
        Ok(())
    }

    async fn list(&self, params: &TaskListParams) -> A2AResult<TaskListResponse> {
        let tasks = self.tasks.read().await;
        let order = self.insertion_order.read().await;

        let start_idx = if let Some(ref token) = params.page_token {
            match order.iter().position(|id| id == token) {
                Some(pos) => pos + 1,
                None => {
                    warn!(page_token = %token, "invalid page token, starting from beginning");
                    0
                }
            }
        } else {
            0
        };

        let page_size = params.page_size.unwrap_or(usize::MAX);
        let mut result_tasks = Vec::new();
        let mut last_id: Option<String> = None;

        for id in order.iter().skip(start_idx) {
            if result_tasks.len() >= page_size {
                break;
            }
            if let Some(task) = tasks.get(id) {
                if let Some(ref ctx_id) = params.context_id {
                    if task.context_id.as_deref() != Some(ctx_id.as_str()) {
                        continue;
                    }
                }
                if let Some(ref statuses) = params.status {
                    if !statuses.contains(&task.status.state) {
                        continue;
                    }
                }
                last_id = Some(id.clone());
                result_tasks.push(task.clone());
            }
        }

        let next_page_token = if result_tasks.len() == page_size {
            last_id.filter(|last| {
                order
                    .iter()
                    .position(|id| id == last)
                    .map(|pos| pos + 1 < order.len())
                    .unwrap_or(false)
            })
        } else {
            None
        };

        debug!(
            count = result_tasks.len(),
            has_more = next_page_token.is_some(),
            "listed tasks"
        );

        Ok(TaskListResponse {
            tasks: result_tasks,
            next_page_token,
        })
    }

    async fn count(&self) -> usize {
        self.tasks.read().await.len()
    }

    async fn cleanup(&self, max_age: Duration) -> usize {
        let cutoff: DateTime<Utc> = Utc::now() - max_age;
        let mut tasks = self.tasks.write().await;
        let to_remove: Vec<String> = tasks
            .values()
            .filter(|t| t.status.state.is_terminal() && t.updated_at < cutoff)
            .map(|t| t.id.clone())
            .collect();

        for id in &to_remove {
            tasks.remove(id);
        }
        drop(tasks);

        if !to_remove.is_empty() {
            let mut order = self.insertion_order.write().await;
            order.retain(|id| !to_remove.contains(id));
        }

        debug!(removed = to_remove.len(), "task store cleanup");
        to_remove.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[tokio::test]
    async fn create_assigns_submitted_state() {
        let store = InMemoryTaskStore::new();
        let task = store.create(Some("ctx-1".to_string())).await;
        assert_eq!(task.status.state, TaskState::Submitted);
        assert_eq!(task.context_id, Some("ctx-1".to_string()));
    }

    #[tokio::test]
    async fn update_rejects_mutation_of_terminal_task() {
        let store = InMemoryTaskStore::new();
        let mut task = store.create(None).await;
        task.status = TaskStatus::new(TaskState::Completed);
        store.update(task.clone()).await.unwrap();

        task.status = TaskStatus::new(TaskState::Working);
        let result = store.update(task).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn update_allows_non_terminal_transitions() {
        let store = InMemoryTaskStore::new();
        let mut task = store.create(None).await;
        task.status = TaskStatus::new(TaskState::Working);
        store.update(task.clone()).await.unwrap();

        task.messages.push(Message::agent_text("hi"));
        task.status = TaskStatus::new(TaskState::Completed);
        assert!(store.update(task).await.is_ok());
    }

    #[tokio::test]
    async fn list_filters_by_context_and_status() {
        let store = InMemoryTaskStore::new();
        let mut t1 = store.create(Some("ctx-a".to_string())).await;
        t1.status = TaskStatus::new(TaskState::Working);
        store.update(t1).await.unwrap();

        let t2 = store.create(Some("ctx-b".to_string())).await;
        let _ = t2;

        let result = store
            .list(&TaskListParams {
                context_id: Some("ctx-a".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].context_id, Some("ctx-a".to_string()));
    }

    #[tokio::test]
    async fn cleanup_only_removes_old_terminal_tasks() {
        let store = InMemoryTaskStore::new();
        let mut terminal = store.create(None).await;
        terminal.status = TaskStatus::new(TaskState::Completed);
        terminal.updated_at = Utc::now() - Duration::hours(2);
        store.tasks.write().await.insert(terminal.id.clone(), terminal);

        let active = store.create(None).await;
        let _ = active;

        let removed = store.cleanup(Duration::hours(1)).await;
        assert_eq!(removed, 1);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn count_reflects_store_size() {
        let store = InMemoryTaskStore::new();
        assert_eq!(store.count().await, 0);
        store.create(None).await;
        store.create(None).await;
        assert_eq!(store.count().await, 2);
    }
}
