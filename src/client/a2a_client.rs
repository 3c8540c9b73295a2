//! High-level A2A client for interacting with remote agents.
//!
//! Typed methods for every JSON-RPC method this gateway's handler exposes:
//! `message/send`, `tasks/get`, `tasks/list`, `tasks/cancel`.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::Serialize;

use crate::error::{A2AError, A2AResult};
use crate::stack::AuthType;
use crate::types::{
    AgentCard, CancelTaskParams, GetTaskParams, JsonRpcId, JsonRpcRequest, JsonRpcResponse,
    ListTasksParams, ListTasksResult, Message, Role, SendMessageParams, SendMessageResult, Task,
};

use super::card_resolver::CardResolver;
use super::transport::{JsonRpcTransport, Transport};

/// Client for interacting with A2A-compatible agents.
///
/// # Construction
///
/// ```no_run
/// use gridctl::client::A2AClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // From a base URL (resolves agent card, discovers endpoint):
/// let client = A2AClient::from_url("http://localhost:7420").await?;
///
/// // With custom transport:
/// use gridctl::client::JsonRpcTransport;
/// let transport = JsonRpcTransport::new("http://localhost:7420/a2a/echo");
/// let client = A2AClient::with_transport(Box::new(transport));
/// # Ok(())
/// # }
/// ```
pub struct A2AClient {
    transport: Box<dyn Transport>,
    agent_card: Option<AgentCard>,
    /// The URL RPC calls are sent to (the resolved card's `url`, or the
    /// endpoint passed directly). Kept alongside the transport so
    /// [`A2AClient::with_auth`] can rebuild a transport with an auth header.
    endpoint_url: String,
    /// The base URL agent-card discovery was rooted at, when known. Used by
    /// [`A2AClient::fetch_agent_card`] and [`A2AClient::ping`] to re-resolve
    /// the card on demand.
    discovery_url: Option<String>,
    /// Monotonic request-id counter, one per client instance. Avoids the
    /// randomness of a fresh UUID per call and makes request/response pairs
    /// trivially traceable in logs.
    next_id: AtomicI64,
    /// Advisory only: flipped to `false` on the first transport failure
    /// and back to `true` on the next success. Never consulted to block a
    /// call — callers may still retry at will.
    available: std::sync::atomic::AtomicBool,
}

impl std::fmt::Debug for A2AClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2AClient")
            .field("agent_card", &self.agent_card)
            .field("available", &self.is_available())
            .finish_non_exhaustive()
    }
}

impl A2AClient {
    /// Create a client from a base URL.
    ///
    /// Resolves the agent card from the well-known discovery path and
    /// targets the JSON-RPC endpoint named in it.
    pub async fn from_url(url: &str) -> A2AResult<Self> {
        let resolver = CardResolver::new();
        let card = resolver.resolve(url).await?;
        let mut client = Self::from_card(card)?;
        client.discovery_url = Some(url.to_string());
        Ok(client)
    }

    /// Create a client from an already-resolved agent card.
    pub fn from_card(card: AgentCard) -> A2AResult<Self> {
        let url = card.url.clone();
        let transport = JsonRpcTransport::new(url.clone());

        Ok(Self {
            transport: Box::new(transport),
            agent_card: Some(card),
            endpoint_url: url,
            discovery_url: None,
            next_id: AtomicI64::new(1),
            available: std::sync::atomic::AtomicBool::new(true),
        })
    }

    /// Create a client with a custom transport targeting `endpoint_url`.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self::with_transport_and_endpoint(transport, String::new())
    }

    fn with_transport_and_endpoint(transport: Box<dyn Transport>, endpoint_url: String) -> Self {
        Self {
            transport,
            agent_card: None,
            endpoint_url,
            discovery_url: None,
            next_id: AtomicI64::new(1),
            available: std::sync::atomic::AtomicBool::new(true),
        }
    }

    /// Create a client from a direct endpoint URL (skips agent card resolution).
    pub fn from_endpoint(url: &str) -> Self {
        let transport = JsonRpcTransport::new(url);
        Self::with_transport_and_endpoint(Box::new(transport), url.to_string())
    }

    /// Apply outbound auth to this client, rebuilding its transport with the
    /// derived header. `bearer` prepends `"Bearer "` to the token; `api_key`
    /// passes the token raw; `none` leaves the client untouched. The header
    /// name defaults to `"Authorization"`.
    pub fn with_auth(self, auth_type: AuthType, token: &str, header_name: Option<&str>) -> Self {
        let value = match auth_type {
            AuthType::None => return self,
            AuthType::Bearer => format!("Bearer {token}"),
            AuthType::ApiKey => token.to_string(),
        };
        let name = header_name.unwrap_or("Authorization");
        let transport = JsonRpcTransport::new(self.endpoint_url.clone()).with_header(name, &value);
        Self {
            transport: Box::new(transport),
            ..self
        }
    }

    /// Advisory availability bit: `false` after the most recent call failed
    /// at the transport layer, `true` after the most recent call succeeded.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Re-resolve the agent card from the original discovery URL, if this
    /// client was constructed via [`A2AClient::from_url`].
    pub async fn fetch_agent_card(&self) -> A2AResult<AgentCard> {
        let base = self.discovery_url.as_ref().ok_or_else(|| {
            A2AError::Transport(
                "no discovery URL configured; construct via A2AClient::from_url".to_string(),
            )
        })?;
        match CardResolver::new().resolve(base).await {
            Ok(card) => {
                self.available.store(true, Ordering::Relaxed);
                Ok(card)
            }
            Err(e) => {
                self.available.store(false, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Check reachability by re-fetching the agent card; updates the
    /// advisory availability bit as a side effect.
    pub async fn ping(&self) -> A2AResult<()> {
        self.fetch_agent_card().await.map(|_| ())
    }

    // ──────────────────────────────────────────────────
    // Core JSON-RPC Methods
    // ──────────────────────────────────────────────────

    /// Send a message to the agent (`message/send`).
    pub async fn send_message(&self, params: SendMessageParams) -> A2AResult<SendMessageResult> {
        self.call("message/send", &params).await
    }

    /// Get the current state of a task (`tasks/get`).
    pub async fn get_task(&self, params: GetTaskParams) -> A2AResult<Task> {
        self.call("tasks/get", &params).await
    }

    /// List tasks with optional filtering (`tasks/list`).
    pub async fn list_tasks(&self, params: ListTasksParams) -> A2AResult<ListTasksResult> {
        self.call("tasks/list", &params).await
    }

    /// Cancel a running task (`tasks/cancel`).
    pub async fn cancel_task(&self, params: CancelTaskParams) -> A2AResult<Task> {
        self.call("tasks/cancel", &params).await
    }

    /// Get the cached agent card, if one was resolved during construction.
    pub fn get_card(&self) -> A2AResult<&AgentCard> {
        self.agent_card.as_ref().ok_or_else(|| {
            A2AError::Transport(
                "no agent card available; use A2AClient::from_url() to auto-resolve".to_string(),
            )
        })
    }

    /// Close the client and release any held resources.
    pub async fn close(self) -> A2AResult<()> {
        self.transport.close().await
    }

    // ──────────────────────────────────────────────────
    // Convenience Helpers
    // ──────────────────────────────────────────────────

    /// Convenience: send a text message and get back the response.
    pub async fn send_text(&self, text: &str) -> A2AResult<SendMessageResult> {
        let params = build_text_message_params(text, None);
        self.send_message(params).await
    }

    /// Convenience: send a text message with a specific context ID.
    pub async fn send_text_in_context(
        &self,
        text: &str,
        context_id: &str,
    ) -> A2AResult<SendMessageResult> {
        let params = build_text_message_params(text, Some(context_id.to_string()));
        self.send_message(params).await
    }

    /// Convenience: get a task by ID with optional history length.
    pub async fn get_task_by_id(
        &self,
        task_id: &str,
        history_length: Option<usize>,
    ) -> A2AResult<Task> {
        self.get_task(GetTaskParams {
            id: task_id.to_string(),
            history_length,
        })
        .await
    }

    /// Convenience: cancel a task by ID.
    pub async fn cancel_task_by_id(&self, task_id: &str) -> A2AResult<Task> {
        self.cancel_task(CancelTaskParams {
            id: task_id.to_string(),
        })
        .await
    }

    // ──────────────────────────────────────────────────
    // Internal helpers
    // ──────────────────────────────────────────────────

    async fn call<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> A2AResult<R> {
        let request = self.build_request(method, params)?;
        match self.transport.send(&request).await {
            Ok(response) => {
                self.available.store(true, Ordering::Relaxed);
                parse_result(response)
            }
            Err(e) => {
                self.available.store(false, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    fn build_request(&self, method: &str, params: &impl Serialize) -> A2AResult<JsonRpcRequest> {
        let params_value = serde_json::to_value(params).map_err(|e| {
            A2AError::Transport(format!("failed to serialize request params: {e}"))
        })?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(JsonRpcId::Number(id)),
            method: method.to_string(),
            params: Some(params_value),
        })
    }
}

/// Parse the `result` field from a JSON-RPC response into the expected type.
fn parse_result<T: serde::de::DeserializeOwned>(response: JsonRpcResponse) -> A2AResult<T> {
    if let Some(error) = response.error {
        return Err(A2AError::JsonRpc {
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }

    let result = response.result.ok_or_else(|| {
        A2AError::InvalidJson("JSON-RPC response has neither 'result' nor 'error'".to_string())
    })?;

    serde_json::from_value(result)
        .map_err(|e| A2AError::InvalidJson(format!("failed to deserialize response result: {e}")))
}

fn build_text_message_params(text: &str, context_id: Option<String>) -> SendMessageParams {
    SendMessageParams {
        message: create_text_message(Role::User, text),
        context_id,
        metadata: None,
    }
}

/// Create a [`Message`] containing a single text part.
///
/// # Example
///
/// ```
/// use gridctl::client::create_text_message;
/// use gridctl::types::Role;
///
/// let msg = create_text_message(Role::User, "Hello, agent!");
/// assert_eq!(msg.role, Role::User);
/// assert_eq!(msg.parts.len(), 1);
/// ```
pub fn create_text_message(role: Role, content: &str) -> Message {
    match role {
        Role::User => Message::user_text(content),
        Role::Agent => Message::agent_text(content),
    }
}
