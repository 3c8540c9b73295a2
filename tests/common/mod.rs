//! Shared test utilities for integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use gridctl::builders::AgentCardBuilder;
use gridctl::server::{a2a_router, AgentEntry, DefaultRequestHandler, InMemoryTaskStore, TaskStore};
use gridctl::types::AgentCard;

/// Build a default agent card for testing.
pub fn test_agent_card(name: &str, url: &str) -> AgentCard {
    AgentCardBuilder::new(name, url)
        .description("An echo agent for testing")
        .version("0.1.0")
        .with_skill("echo", "Echo", "Echoes back messages", vec!["test".to_string()])
        .build()
}

/// Start a test server hosting a single agent under `name` on a random
/// port. Returns the base URL and a handle to its serve task.
pub async fn start_test_server(name: &str) -> (String, tokio::task::JoinHandle<()>) {
    start_test_server_with_store(name, Arc::new(InMemoryTaskStore::new())).await
}

/// Start a test server hosting a single agent backed by a specific task store.
pub async fn start_test_server_with_store(
    name: &str,
    store: Arc<dyn TaskStore>,
) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let card = test_agent_card(name, &format!("{base_url}/a2a/{name}"));
    let mut agents = HashMap::new();
    agents.insert(
        name.to_string(),
        AgentEntry {
            card,
            handler: Arc::new(DefaultRequestHandler::new(store)),
        },
    );
    let app = a2a_router(agents);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    (base_url, handle)
}

/// Build a JSON-RPC request body.
pub fn jsonrpc_request(
    id: serde_json::Value,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

/// Build a `message/send` request body.
pub fn message_send_request(id: i64, text: &str) -> serde_json::Value {
    jsonrpc_request(
        serde_json::json!(id),
        "message/send",
        serde_json::json!({
            "message": {
                "messageId": format!("test-msg-{id}"),
                "role": "user",
                "parts": [{"kind": "text", "text": text}]
            }
        }),
    )
}
