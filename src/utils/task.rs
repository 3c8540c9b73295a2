//! Utility functions for creating A2A Task objects.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{A2AError, A2AResult};
use crate::types::{Artifact, Message, Part, Task, TaskState, TaskStatus};

/// Creates a new Task object from an initial user message.
///
/// Generates a fresh task id; `context_id` is carried over from the
/// caller (e.g. `SendMessageParams::context_id`) rather than read off the
/// message itself, since `Message` no longer carries a context id.
///
/// # Errors
///
/// Returns an error if the message has no parts, or any text part is empty.
pub fn new_task(context_id: Option<String>, request: Message) -> A2AResult<Task> {
    if request.parts.is_empty() {
        return Err(A2AError::invalid_params("Message parts cannot be empty"));
    }

    for part in &request.parts {
        if let Part::Text { text, .. } = part {
            if text.is_empty() {
                return Err(A2AError::invalid_params("TextPart content cannot be empty"));
            }
        }
    }

    let now = Utc::now();
    Ok(Task {
        id: Uuid::new_v4().to_string(),
        context_id,
        status: TaskStatus::new(TaskState::Submitted),
        messages: vec![request],
        artifacts: vec![],
        metadata: None,
        created_at: now,
        updated_at: now,
    })
}

/// Creates a Task object in the 'completed' state.
///
/// # Errors
///
/// Returns an error if `artifacts` is empty.
pub fn completed_task(
    task_id: impl Into<String>,
    context_id: Option<String>,
    artifacts: Vec<Artifact>,
    messages: Vec<Message>,
) -> A2AResult<Task> {
    if artifacts.is_empty() {
        return Err(A2AError::invalid_params(
            "artifacts must be a non-empty list of Artifact objects",
        ));
    }

    let now = Utc::now();
    Ok(Task {
        id: task_id.into(),
        context_id,
        status: TaskStatus::new(TaskState::Completed),
        messages,
        artifacts,
        metadata: None,
        created_at: now,
        updated_at: now,
    })
}

/// Truncates a task's message history to the last `history_length` messages.
pub fn apply_history_length(mut task: Task, history_length: Option<usize>) -> Task {
    if let Some(length) = history_length {
        if length > 0 {
            let total = task.messages.len();
            if total > length {
                task.messages = task.messages.split_off(total - length);
            }
        }
    }
    task
}
