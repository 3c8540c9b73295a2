//! Federation gateway — composes locally-hosted agents and remote peers
//! into one addressable namespace.
//!
//! Mirrors the synchronous handler-dispatch design in [`crate::server`]:
//! no streaming, no background event queues — `SendMessage` either runs the
//! local handler inline or makes one outbound JSON-RPC call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::client::A2AClient;
use crate::error::{A2AError, A2AResult};
use crate::server::{DefaultRequestHandler, InMemoryTaskStore, RequestHandler, TaskStore};
use crate::stack::AuthType;
use crate::types::{
    AgentCard, AgentRole, AgentSkill, AgentStatus, CancelTaskParams, GetTaskParams,
    ListTasksParams, ListTasksResult, SendMessageParams, SendMessageResult, Task,
};

struct LocalAgent {
    card: AgentCard,
    handler: Arc<DefaultRequestHandler>,
    task_store: Arc<dyn TaskStore>,
}

struct RemoteAgent {
    card: AgentCard,
    client: A2AClient,
}

/// Composes local agents and remote peers into a single federation,
/// addressable by name and reachable through one `SendMessage` call.
pub struct Gateway {
    base_url: String,
    local: RwLock<HashMap<String, LocalAgent>>,
    remote: RwLock<HashMap<String, RemoteAgent>>,
}

impl Gateway {
    /// `base_url` is prefixed onto a local agent's path (`{base_url}/a2a/{name}`)
    /// when registering a card that doesn't already carry its own `url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Gateway {
            base_url: base_url.into(),
            local: RwLock::new(HashMap::new()),
            remote: RwLock::new(HashMap::new()),
        }
    }

    /// Register a locally-hosted agent. If `card.url` is empty, it is set to
    /// `{base_url}/a2a/{name}`. `handler` supplies the agent's business
    /// logic; omit it to fall back to the default "Message received"
    /// acknowledgment.
    pub async fn register_local_agent(
        &self,
        name: impl Into<String>,
        mut card: AgentCard,
        handler: Option<Arc<dyn RequestHandler>>,
    ) {
        let name = name.into();
        if card.url.is_empty() {
            card.url = format!("{}/a2a/{}", self.base_url.trim_end_matches('/'), name);
        }

        let task_store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
        let request_handler = Arc::new(match handler {
            Some(h) => DefaultRequestHandler::with_handler(task_store.clone(), h),
            None => DefaultRequestHandler::new(task_store.clone()),
        });

        info!(agent = %name, url = %card.url, "registered local agent");
        self.local.write().await.insert(
            name,
            LocalAgent {
                card,
                handler: request_handler,
                task_store,
            },
        );
    }

    /// Register a remote A2A peer. `endpoint` is the peer's discovery base
    /// URL (card is fetched from `{endpoint}/.well-known/agent.json`).
    /// Applies auth if given, then validates the peer by fetching its card.
    pub async fn register_remote_agent(
        &self,
        name: impl Into<String>,
        endpoint: impl Into<String>,
        auth_type: AuthType,
        auth_token: Option<&str>,
        auth_header: Option<&str>,
    ) -> A2AResult<()> {
        let name = name.into();
        let mut client = A2AClient::from_url(&endpoint.into()).await?;
        if !matches!(auth_type, AuthType::None) {
            let token = auth_token.ok_or_else(|| {
                A2AError::invalid_request("auth_token is required for a non-none auth_type")
            })?;
            client = client.with_auth(auth_type, token, auth_header);
        }

        let card = client.fetch_agent_card().await?;
        info!(agent = %name, url = %card.url, "registered remote agent");
        self.remote
            .write()
            .await
            .insert(name, RemoteAgent { card, client });
        Ok(())
    }

    /// Dispatch a message to `target`, local or remote.
    pub async fn send_message(
        &self,
        target: &str,
        params: SendMessageParams,
    ) -> A2AResult<SendMessageResult> {
        if let Some(agent) = self.local.read().await.get(target) {
            return agent.handler.on_message_send(params).await;
        }
        if let Some(agent) = self.remote.read().await.get(target) {
            return agent.client.send_message(params).await;
        }
        Err(A2AError::unknown_agent(format!("unknown agent: {target}")))
    }

    /// Get a task hosted by `target`.
    pub async fn get_task(&self, target: &str, params: GetTaskParams) -> A2AResult<Task> {
        if let Some(agent) = self.local.read().await.get(target) {
            return agent.handler.on_get_task(params).await;
        }
        if let Some(agent) = self.remote.read().await.get(target) {
            return agent.client.get_task(params).await;
        }
        Err(A2AError::unknown_agent(format!("unknown agent: {target}")))
    }

    /// List tasks hosted by `target`.
    pub async fn list_tasks(
        &self,
        target: &str,
        params: ListTasksParams,
    ) -> A2AResult<ListTasksResult> {
        if let Some(agent) = self.local.read().await.get(target) {
            return agent.handler.on_list_tasks(params).await;
        }
        if let Some(agent) = self.remote.read().await.get(target) {
            return agent.client.list_tasks(params).await;
        }
        Err(A2AError::unknown_agent(format!("unknown agent: {target}")))
    }

    /// Cancel a task hosted by `target`.
    pub async fn cancel_task(&self, target: &str, params: CancelTaskParams) -> A2AResult<Task> {
        if let Some(agent) = self.local.read().await.get(target) {
            return agent.handler.on_cancel_task(params).await;
        }
        if let Some(agent) = self.remote.read().await.get(target) {
            return agent.client.cancel_task(params).await;
        }
        Err(A2AError::unknown_agent(format!("unknown agent: {target}")))
    }

    /// Union of every registered agent's skills, each id rewritten to
    /// `{agent_name}/{skill_id}` so two agents can share a skill id without
    /// colliding.
    pub async fn aggregated_skills(&self) -> Vec<AgentSkill> {
        let mut skills = Vec::new();
        for (name, agent) in self.local.read().await.iter() {
            skills.extend(namespaced_skills(name, &agent.card.skills));
        }
        for (name, agent) in self.remote.read().await.iter() {
            skills.extend(namespaced_skills(name, &agent.card.skills));
        }
        skills
    }

    /// Snapshot of every registered agent: local agents first (insertion
    /// order is not guaranteed by a `HashMap`, so local entries are sorted
    /// by name too), then remote agents in lexicographic order.
    pub async fn status(&self) -> Vec<AgentStatus> {
        let local = self.local.read().await;
        let mut local_names: Vec<&String> = local.keys().collect();
        local_names.sort();
        let mut statuses: Vec<AgentStatus> = local_names
            .into_iter()
            .map(|name| {
                let agent = &local[name];
                AgentStatus {
                    name: name.clone(),
                    role: AgentRole::Local,
                    available: true,
                    skill_count: agent.card.skills.len(),
                    skill_names: agent.card.skills.iter().map(|s| s.name.clone()).collect(),
                }
            })
            .collect();
        drop(local);

        let remote = self.remote.read().await;
        let mut remote_names: Vec<&String> = remote.keys().collect();
        remote_names.sort();
        statuses.extend(remote_names.into_iter().map(|name| {
            let agent = &remote[name];
            AgentStatus {
                name: name.clone(),
                role: AgentRole::Remote,
                available: agent.client.is_available(),
                skill_count: agent.card.skills.len(),
                skill_names: agent.card.skills.iter().map(|s| s.name.clone()).collect(),
            }
        }));
        statuses
    }

    /// Spawn a background task that purges terminal tasks older than
    /// `max_age` from every local agent's task store every `interval`.
    /// Dropping the returned [`CleanupHandle`] (or calling
    /// [`CleanupHandle::stop`]) ends the loop.
    pub fn start_cleanup(self: &Arc<Self>, interval: Duration, max_age: Duration) -> CleanupHandle {
        let gateway = Arc::clone(self);
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let max_age = chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::seconds(0));
                        let local = gateway.local.read().await;
                        for (name, agent) in local.iter() {
                            let removed = agent.task_store.cleanup(max_age).await;
                            if removed > 0 {
                                debug!(agent = %name, removed, "cleaned up stale tasks");
                            }
                        }
                    }
                    _ = &mut stop_rx => {
                        warn!("task cleanup loop stopped");
                        break;
                    }
                }
            }
        });

        CleanupHandle {
            stop: Some(stop_tx),
            join: Some(join),
        }
    }
}

fn namespaced_skills(agent_name: &str, skills: &[AgentSkill]) -> Vec<AgentSkill> {
    skills
        .iter()
        .map(|s| AgentSkill {
            id: format!("{agent_name}/{}", s.id),
            name: s.name.clone(),
            description: s.description.clone(),
            tags: s.tags.clone(),
            examples: s.examples.clone(),
        })
        .collect()
}

/// Handle to a running [`Gateway::start_cleanup`] loop.
pub struct CleanupHandle {
    stop: Option<oneshot::Sender<()>>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl CleanupHandle {
    /// Signal the cleanup loop to stop and wait for it to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

impl Drop for CleanupHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::AgentCardBuilder;
    use crate::types::{Message, Part, Role};

    fn card(name: &str) -> AgentCard {
        AgentCardBuilder::new(name, "")
            .with_skill("greet", "Greet", "Say hello", vec![])
            .build()
    }

    #[tokio::test]
    async fn register_local_agent_fills_in_url_when_unset() {
        let gateway = Gateway::new("http://localhost:8080");
        gateway.register_local_agent("billing", card("billing"), None).await;
        let statuses = gateway.status().await;
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].name, "billing");
        assert_eq!(statuses[0].role, AgentRole::Local);
    }

    #[tokio::test]
    async fn send_message_to_unknown_agent_errors() {
        let gateway = Gateway::new("http://localhost:8080");
        let params = SendMessageParams {
            message: Message {
                message_id: "m1".to_string(),
                role: Role::User,
                parts: vec![Part::text("hi")],
                metadata: None,
            },
            context_id: None,
            metadata: None,
        };
        let result = gateway.send_message("nope", params).await;
        assert!(matches!(result, Err(A2AError::UnknownAgent { .. })));
    }

    #[tokio::test]
    async fn send_message_dispatches_to_local_handler() {
        let gateway = Gateway::new("http://localhost:8080");
        gateway.register_local_agent("billing", card("billing"), None).await;
        let params = SendMessageParams {
            message: Message {
                message_id: "m1".to_string(),
                role: Role::User,
                parts: vec![Part::text("hi")],
                metadata: None,
            },
            context_id: None,
            metadata: None,
        };
        let result = gateway.send_message("billing", params).await.unwrap();
        assert_eq!(result.task.status.state, crate::types::TaskState::Completed);
    }

    #[tokio::test]
    async fn aggregated_skills_are_namespaced_by_agent() {
        let gateway = Gateway::new("http://localhost:8080");
        gateway.register_local_agent("billing", card("billing"), None).await;
        let skills = gateway.aggregated_skills().await;
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].id, "billing/greet");
    }

    #[tokio::test]
    async fn status_orders_local_before_remote() {
        let gateway = Gateway::new("http://localhost:8080");
        gateway.register_local_agent("zeta", card("zeta"), None).await;
        gateway.register_local_agent("alpha", card("alpha"), None).await;
        let statuses = gateway.status().await;
        assert_eq!(statuses[0].name, "alpha");
        assert_eq!(statuses[1].name, "zeta");
    }
}
