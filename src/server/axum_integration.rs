//! Axum integration — the gateway's public HTTP surface.
//!
//! Every local agent is reachable at its own path segment rather than one
//! shared endpoint, since this gateway can host many agents behind one
//! process:
//!
//! - `GET /.well-known/agent.json` — aggregate card discovery (`{agents: [...]}`)
//! - `GET /a2a/` — summary listing of every registered agent
//! - `GET /a2a/{agent}` — that agent's card, or 404
//! - `POST /a2a/{agent}` — JSON-RPC 2.0 dispatch for that agent
//!
//! # Example
//!
//! ```rust,ignore
//! use gridctl::server::{a2a_router, AgentEntry, DefaultRequestHandler, InMemoryTaskStore};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let mut agents = HashMap::new();
//! agents.insert("billing".to_string(), AgentEntry {
//!     card: billing_card,
//!     handler: Arc::new(DefaultRequestHandler::new(Arc::new(InMemoryTaskStore::new()))),
//! });
//! let app = a2a_router(agents);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, warn};

use crate::error::{self, A2AError};
use crate::types::{
    AgentCard, AgentSummary, CancelTaskParams, GetTaskParams, JsonRpcError as WireError,
    JsonRpcId, JsonRpcRequest, JsonRpcResponse, ListTasksParams, SendMessageParams,
};

use super::handler::DefaultRequestHandler;

/// Maximum JSON-RPC request body accepted on `POST /a2a/{agent}`.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// A single locally-hosted agent: its advertised card plus the handler that
/// serves its JSON-RPC traffic.
pub struct AgentEntry {
    pub card: AgentCard,
    pub handler: Arc<DefaultRequestHandler>,
}

struct AppState {
    agents: HashMap<String, AgentEntry>,
}

/// Build the router serving every agent in `agents`, keyed by path segment.
pub fn a2a_router(agents: HashMap<String, AgentEntry>) -> Router {
    let state = Arc::new(AppState { agents });

    Router::new()
        .route("/.well-known/agent.json", get(handle_agent_cards))
        .route("/a2a/", get(handle_agent_list))
        .route(
            "/a2a/{agent}",
            get(handle_agent_card).post(handle_jsonrpc),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn handle_agent_cards(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cards: Vec<&AgentCard> = state.agents.values().map(|e| &e.card).collect();
    Json(serde_json::json!({ "agents": cards }))
}

async fn handle_agent_list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let summaries: Vec<AgentSummary> = state
        .agents
        .iter()
        .map(|(name, entry)| AgentSummary {
            name: name.clone(),
            description: entry.card.description.clone(),
            url: entry.card.url.clone(),
            skill_count: entry.card.skills.len(),
        })
        .collect();
    Json(summaries)
}

async fn handle_agent_card(
    State(state): State<Arc<AppState>>,
    Path(agent): Path<String>,
) -> Response {
    match state.agents.get(&agent) {
        Some(entry) => Json(&entry.card).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            format!("Agent not found: {agent}"),
        )
            .into_response(),
    }
}

/// Main JSON-RPC dispatch handler for one agent's `/a2a/{agent}` endpoint.
async fn handle_jsonrpc(
    State(state): State<Arc<AppState>>,
    Path(agent): Path<String>,
    body: Bytes,
) -> Response {
    let entry = match state.agents.get(&agent) {
        Some(entry) => entry,
        None => {
            return (
                StatusCode::NOT_FOUND,
                format!("Agent not found: {agent}"),
            )
                .into_response()
        }
    };

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            return Json(rpc_error(
                None,
                error::PARSE_ERROR,
                format!("malformed JSON-RPC request: {e}"),
            ))
            .into_response();
        }
    };

    if request.jsonrpc != "2.0" {
        return Json(rpc_error(
            request.id,
            error::INVALID_REQUEST,
            "invalid JSON-RPC version — must be \"2.0\"".to_string(),
        ))
        .into_response();
    }

    debug!(agent = %agent, method = %request.method, "JSON-RPC request received");

    let params = request.params.clone().unwrap_or(serde_json::Value::Null);
    let result = match request.method.as_str() {
        "message/send" => dispatch(entry, params, |h, p: SendMessageParams| async move {
            h.on_message_send(p).await.and_then(|r| to_value(&r))
        })
        .await,
        "tasks/get" => dispatch(entry, params, |h, p: GetTaskParams| async move {
            h.on_get_task(p).await.and_then(|r| to_value(&r))
        })
        .await,
        "tasks/list" => dispatch(entry, params, |h, p: ListTasksParams| async move {
            h.on_list_tasks(p).await.and_then(|r| to_value(&r))
        })
        .await,
        "tasks/cancel" => dispatch(entry, params, |h, p: CancelTaskParams| async move {
            h.on_cancel_task(p).await.and_then(|r| to_value(&r))
        })
        .await,
        method => {
            warn!(agent = %agent, method = %method, "unknown JSON-RPC method");
            Err(A2AError::method_not_found(format!(
                "Method not found: {method}"
            )))
        }
    };

    match result {
        Ok(value) => Json(JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        })
        .into_response(),
        Err(e) => Json(rpc_error_from(request.id, e)).into_response(),
    }
}

async fn dispatch<'a, P, F, Fut>(
    entry: &'a AgentEntry,
    params: serde_json::Value,
    f: F,
) -> Result<serde_json::Value, A2AError>
where
    P: serde::de::DeserializeOwned,
    F: FnOnce(&'a DefaultRequestHandler, P) -> Fut,
    Fut: std::future::Future<Output = Result<serde_json::Value, A2AError>> + 'a,
{
    let parsed: P = serde_json::from_value(params)
        .map_err(|e| A2AError::invalid_params(format!("invalid params: {e}")))?;
    f(&entry.handler, parsed).await
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, A2AError> {
    serde_json::to_value(value)
        .map_err(|e| A2AError::internal_error(format!("failed to serialize response: {e}")))
}

fn rpc_error(id: Option<JsonRpcId>, code: i64, message: String) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(WireError {
            code,
            message,
            data: None,
        }),
    }
}

fn rpc_error_from(id: Option<JsonRpcId>, err: A2AError) -> JsonRpcResponse {
    let wire: WireError = err.into();
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(wire),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::task_store::InMemoryTaskStore;
    use crate::types::AgentCapabilities;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_card(name: &str) -> AgentCard {
        AgentCard {
            name: name.to_string(),
            description: Some("a test agent".to_string()),
            url: format!("http://localhost:7420/a2a/{name}"),
            version: Some("1.0".to_string()),
            provider: None,
            documentation_url: None,
            capabilities: AgentCapabilities::default(),
            skills: vec![],
            default_input_modes: vec![],
            default_output_modes: vec![],
        }
    }

    fn router_with_one_agent() -> Router {
        let mut agents = HashMap::new();
        agents.insert(
            "echo".to_string(),
            AgentEntry {
                card: test_card("echo"),
                handler: Arc::new(DefaultRequestHandler::new(Arc::new(
                    InMemoryTaskStore::new(),
                ))),
            },
        );
        a2a_router(agents)
    }

    #[tokio::test]
    async fn unknown_agent_card_is_404() {
        let app = router_with_one_agent();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/a2a/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn known_agent_card_is_200() {
        let app = router_with_one_agent();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/a2a/echo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn other_method_on_agent_path_is_405() {
        let app = router_with_one_agent();
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/a2a/echo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn message_send_round_trips_through_jsonrpc() {
        let app = router_with_one_agent();
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "message/send",
            "params": {
                "message": {
                    "messageId": "m1",
                    "role": "user",
                    "parts": [{"kind": "text", "text": "hi"}]
                }
            }
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/a2a/echo")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: JsonRpcResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.id, Some(JsonRpcId::Number(1)));
        assert!(parsed.result.is_some());
    }

    #[tokio::test]
    async fn malformed_json_returns_rpc_error() {
        let app = router_with_one_agent();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/a2a/echo")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: JsonRpcResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(parsed.error.is_some());
    }
}
