//! JSON-RPC request dispatch — synchronous per-agent handler model.
//!
//! Replaces the async-executor-plus-event-queue design with a single
//! synchronous `(task, message) -> task` callback: this system's agents
//! never stream partial results, so there is nothing for an event queue
//! to carry.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{A2AError, A2AResult};
use crate::types::{
    CancelTaskParams, GetTaskParams, ListTasksParams, ListTasksResult, Message, SendMessageParams,
    SendMessageResult, Task, TaskState, TaskStatus,
};
use crate::utils::apply_history_length;

use super::task_store::{TaskListParams, TaskStore};

/// One registered agent's business logic. Receives the freshly-created (or
/// resumed) task plus the inbound message and returns the task reflecting
/// the result — completed, still working, or otherwise transitioned.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, task: Task, message: &Message) -> A2AResult<Task>;
}

/// Coordinates a [`TaskStore`] and an optional per-agent [`RequestHandler`]
/// across the four JSON-RPC methods this gateway exposes.
///
/// When no handler is registered, `message/send` falls back to the default
/// acknowledgment behavior: the task completes immediately with an
/// agent-role "Message received" reply.
pub struct DefaultRequestHandler {
    handler: Option<Arc<dyn RequestHandler>>,
    task_store: Arc<dyn TaskStore>,
}

impl DefaultRequestHandler {
    pub fn new(task_store: Arc<dyn TaskStore>) -> Self {
        DefaultRequestHandler {
            handler: None,
            task_store,
        }
    }

    pub fn with_handler(task_store: Arc<dyn TaskStore>, handler: Arc<dyn RequestHandler>) -> Self {
        DefaultRequestHandler {
            handler: Some(handler),
            task_store,
        }
    }

    pub async fn on_message_send(
        &self,
        params: SendMessageParams,
    ) -> A2AResult<SendMessageResult> {
        let mut task = self.task_store.create(params.context_id.clone()).await;
        task.messages.push(params.message.clone());

        let result_task = match &self.handler {
            Some(handler) => match handler.handle(task.clone(), &params.message).await {
                Ok(updated) => updated,
                Err(e) => {
                    debug!(task_id = %task.id, error = %e, "handler failed, marking task failed");
                    task.status =
                        TaskStatus::with_message(TaskState::Failed, Message::agent_text(e.to_string()));
                    task
                }
            },
            None => {
                task.status = TaskStatus::new(TaskState::Completed);
                task.messages.push(Message::agent_text("Message received"));
                task
            }
        };

        self.task_store.update(result_task.clone()).await?;
        Ok(SendMessageResult {
            task: result_task,
            message: None,
        })
    }

    pub async fn on_get_task(&self, params: GetTaskParams) -> A2AResult<Task> {
        let task = self
            .task_store
            .get(&params.id)
            .await?
            .ok_or_else(|| A2AError::task_not_found(params.id.clone()))?;
        Ok(apply_history_length(task, params.history_length))
    }

    pub async fn on_list_tasks(&self, params: ListTasksParams) -> A2AResult<ListTasksResult> {
        let store_params = TaskListParams {
            context_id: params.context_id,
            status: params.status,
            page_size: params.page_size,
            page_token: params.page_token,
        };
        let response = self.task_store.list(&store_params).await?;
        Ok(ListTasksResult {
            tasks: response.tasks,
            next_page_token: response.next_page_token,
        })
    }

    pub async fn on_cancel_task(&self, params: CancelTaskParams) -> A2AResult<Task> {
        let task = self
            .task_store
            .get(&params.id)
            .await?
            .ok_or_else(|| A2AError::task_not_found(params.id.clone()))?;

        if task.status.state.is_terminal() {
            return Err(A2AError::task_not_cancellable(params.id.clone()));
        }

        let mut cancelled = task;
        cancelled.status = TaskStatus::new(TaskState::Cancelled);
        self.task_store.update(cancelled.clone()).await?;
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::task_store::InMemoryTaskStore;
    use crate::types::{Part, Role};

    fn send_params(text: &str) -> SendMessageParams {
        SendMessageParams {
            message: Message {
                message_id: "msg-1".to_string(),
                role: Role::User,
                parts: vec![Part::text(text)],
                metadata: None,
            },
            context_id: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn default_acknowledgment_when_no_handler() {
        let store = Arc::new(InMemoryTaskStore::new());
        let handler = DefaultRequestHandler::new(store);
        let result = handler.on_message_send(send_params("hi")).await.unwrap();
        assert_eq!(result.task.status.state, TaskState::Completed);
        assert_eq!(result.task.messages.len(), 2);
    }

    struct EchoHandler;

    #[async_trait]
    impl RequestHandler for EchoHandler {
        async fn handle(&self, mut task: Task, message: &Message) -> A2AResult<Task> {
            task.status = TaskStatus::new(TaskState::Completed);
            task.messages.push(Message::agent_text(format!(
                "echo: {}",
                message.parts.first().map(|p| format!("{:?}", p)).unwrap_or_default()
            )));
            Ok(task)
        }
    }

    #[tokio::test]
    async fn registered_handler_is_invoked() {
        let store = Arc::new(InMemoryTaskStore::new());
        let handler = DefaultRequestHandler::with_handler(store, Arc::new(EchoHandler));
        let result = handler.on_message_send(send_params("hi")).await.unwrap();
        assert_eq!(result.task.status.state, TaskState::Completed);
    }

    struct FailingHandler;

    #[async_trait]
    impl RequestHandler for FailingHandler {
        async fn handle(&self, _task: Task, _message: &Message) -> A2AResult<Task> {
            Err(A2AError::internal_error("boom"))
        }
    }

    #[tokio::test]
    async fn handler_error_fails_task() {
        let store = Arc::new(InMemoryTaskStore::new());
        let handler = DefaultRequestHandler::with_handler(store, Arc::new(FailingHandler));
        let result = handler.on_message_send(send_params("hi")).await.unwrap();
        assert_eq!(result.task.status.state, TaskState::Failed);
        assert!(result.task.status.message.is_some());
    }

    #[tokio::test]
    async fn cancel_rejects_terminal_task() {
        let store = Arc::new(InMemoryTaskStore::new());
        let handler = DefaultRequestHandler::new(store);
        let sent = handler.on_message_send(send_params("hi")).await.unwrap();
        let result = handler
            .on_cancel_task(CancelTaskParams { id: sent.task.id })
            .await;
        assert!(result.is_err());
    }
}
