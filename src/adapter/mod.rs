//! A2A↔Tool adapter — exposes an A2A agent's skills as callable tools.
//!
//! An adapter wraps a single [`A2AClient`] and translates between the tool
//! invocation shape (`name`, `args`) and the agent's own `message/send` +
//! `tasks/get` lifecycle: calling a tool sends a message, then polls the
//! resulting task until it reaches a terminal state.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::client::A2AClient;
use crate::error::{A2AError, A2AResult};
use crate::types::{GetTaskParams, Message, Role, SendMessageParams, Task, TaskState};
use crate::utils::get_text_parts;

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const MAX_POLL_WAIT: Duration = Duration::from_secs(5 * 60);

/// A source of the current instant, injectable so poll-loop timeouts are
/// deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> std::time::Instant;
}

/// Real wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }
}

/// A callable tool derived from one agent skill.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

fn tool_input_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": { "message": { "type": "string" } },
        "required": ["message"],
    })
}

/// Result of invoking a tool: either the agent's terminal output, or an
/// error surfaced from a failed task.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub is_error: bool,
    pub content: String,
}

/// Wraps an [`A2AClient`] and exposes its agent's skills as [`Tool`]s.
pub struct ToolAdapter {
    client: A2AClient,
    tools: Vec<Tool>,
    clock: Box<dyn Clock>,
}

impl ToolAdapter {
    /// Fetch the agent's card and convert every skill into a tool. `client`
    /// must be constructed via [`A2AClient::from_url`] so a discovery URL is
    /// available to re-fetch the card from.
    pub async fn new(client: A2AClient) -> A2AResult<Self> {
        Self::with_clock(client, Box::new(SystemClock)).await
    }

    /// Same as [`ToolAdapter::new`] but with an injectable clock, for tests
    /// that need to control poll-loop timing.
    pub async fn with_clock(client: A2AClient, clock: Box<dyn Clock>) -> A2AResult<Self> {
        let card = client.fetch_agent_card().await?;
        let tools = card
            .skills
            .iter()
            .map(|skill| Tool {
                name: skill.id.clone(),
                title: skill.name.clone(),
                description: skill.description.clone(),
                input_schema: tool_input_schema(),
            })
            .collect();
        Ok(ToolAdapter { client, tools, clock })
    }

    /// Tools derived from the wrapped agent's skills.
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Invoke `name` with `args`, waiting (up to 5 minutes) for the
    /// resulting task to reach a terminal state.
    pub async fn call_tool(&self, name: &str, args: &Value) -> A2AResult<ToolResult> {
        if !self.tools.iter().any(|t| t.name == name) {
            return Err(A2AError::invalid_params(format!("unknown tool: {name}")));
        }

        let text = format!("Invoke skill '{name}' with arguments: {args}");
        let message = Message {
            message_id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            parts: vec![crate::types::Part::text(text)],
            metadata: Some(serde_json::json!({
                "skill_id": name,
                "arguments": args,
            })),
        };

        let sent = self
            .client
            .send_message(SendMessageParams {
                message,
                context_id: None,
                metadata: None,
            })
            .await?;

        let task = self.await_terminal(sent.task).await?;
        Ok(translate_task(&task))
    }

    async fn await_terminal(&self, mut task: Task) -> A2AResult<Task> {
        let deadline = self.clock.now() + MAX_POLL_WAIT;
        while !task.status.state.is_terminal() {
            if self.clock.now() >= deadline {
                return Err(A2AError::internal_error(format!(
                    "task {} did not reach a terminal state within 5 minutes",
                    task.id
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            task = self
                .client
                .get_task(GetTaskParams {
                    id: task.id.clone(),
                    history_length: None,
                })
                .await?;
        }
        Ok(task)
    }
}

fn translate_task(task: &Task) -> ToolResult {
    if task.status.state == TaskState::Failed {
        let message = task
            .status
            .message
            .as_ref()
            .map(|m| get_text_parts(&m.parts).join("\n"))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Task failed".to_string());
        return ToolResult {
            is_error: true,
            content: message,
        };
    }

    let mut texts: Vec<String> = task
        .messages
        .iter()
        .filter(|m| m.role == Role::Agent)
        .flat_map(|m| get_text_parts(&m.parts))
        .collect();
    texts.extend(task.artifacts.iter().flat_map(|a| get_text_parts(&a.parts)));

    let content = if texts.is_empty() {
        "Task completed".to_string()
    } else {
        texts.join("\n")
    };

    ToolResult {
        is_error: false,
        content,
    }
}
